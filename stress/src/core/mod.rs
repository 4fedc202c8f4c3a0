//! Deterministic, pure logic shared by the harness.
//!
//! Core modules must be free of I/O side effects. They classify process
//! results, number cases, and map run verdicts to exit codes and cleanup
//! policies.

pub mod schedule;
pub mod types;
pub mod verdict;
