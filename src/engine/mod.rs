//! Core engine: snapshot → alternate → confirm, one round at a time.

pub mod snapshot;
pub mod alternator;
pub mod session;
