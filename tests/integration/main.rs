//! End-to-end tests: the session driver against an in-memory exchange
//! and a console gate fed from a byte buffer.

mod mock_exchange;
