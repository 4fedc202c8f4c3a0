//! Stable exit codes for the stress CLI.

/// Every case passed (or `init`/`clean` succeeded).
pub const OK: i32 = 0;
/// Build, generation, execution, comparison or internal failure.
pub const FAILED: i32 = 1;
