//! Stress-testing harness for competitive-programming solutions.
//!
//! Compiles a candidate solution, a reference solution and an input
//! generator, then repeatedly generates input, runs both solutions on it and
//! compares their output byte for byte, stopping at the first mismatch with
//! the offending input and outputs preserved on disk.
//!
//! - **[`core`]**: Pure, deterministic logic (case numbering, verdicts).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (configuration, process facade,
//!   console, diff record). Isolated behind [`io::facade::ProcessFacade`] so
//!   orchestration can be driven by scripted processes in tests.
//!
//! Orchestration modules ([`harness`], [`cleanup`], [`cli`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod cleanup;
pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod harness;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
