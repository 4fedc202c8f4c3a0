//! Final classification of a run.

use std::fmt;

use crate::core::types::{CleanupPolicy, Role};
use crate::exit_codes;

/// Outcome of a whole run. Every variant other than `Passed` stops the run
/// at the point it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunVerdict {
    /// Every case passed.
    Passed { cases: u32 },
    /// The compiler exited non-zero (or could not be launched) for `source`.
    BuildFailed { source: String },
    /// The generator failed while producing input for `case`.
    GenerationFailed { case: u32 },
    /// The candidate or reference program failed to run on `case`.
    ExecutionFailed { role: Role, case: u32 },
    /// Candidate and reference output differ on `case`.
    Mismatch { case: u32 },
    /// Unexpected internal fault (I/O error while comparing, writing records, ...).
    Internal(String),
}

impl RunVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, RunVerdict::Passed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            exit_codes::OK
        } else {
            exit_codes::FAILED
        }
    }

    pub fn cleanup_policy(&self) -> CleanupPolicy {
        if self.is_success() {
            CleanupPolicy::Full
        } else {
            CleanupPolicy::Partial
        }
    }

    /// Case at which the run stopped, if it got as far as the loop.
    pub fn failed_case(&self) -> Option<u32> {
        match self {
            RunVerdict::GenerationFailed { case }
            | RunVerdict::ExecutionFailed { case, .. }
            | RunVerdict::Mismatch { case } => Some(*case),
            _ => None,
        }
    }
}

impl fmt::Display for RunVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunVerdict::Passed { cases } => write!(f, "all {cases} cases passed"),
            RunVerdict::BuildFailed { source } => write!(f, "build failed for {source}"),
            RunVerdict::GenerationFailed { case } => {
                write!(f, "input generation failed for case {case}")
            }
            RunVerdict::ExecutionFailed { role, case } => {
                write!(f, "{role} program failed on case {case}")
            }
            RunVerdict::Mismatch { case } => write!(f, "output mismatch on case {case}"),
            RunVerdict::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}
