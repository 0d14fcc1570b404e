//! background workers.
pub mod runner;
