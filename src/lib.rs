//! Interactive market maker for a single BitX trading pair.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod exchange;
pub mod types;
