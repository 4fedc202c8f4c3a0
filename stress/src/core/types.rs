//! Shared deterministic types for harness core logic.

use std::fmt;

/// The three programs a run builds and drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Trusted solution used as the oracle.
    Reference,
    /// Solution under test.
    Candidate,
    /// Program producing randomized input.
    Generator,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Reference => "reference",
            Role::Candidate => "candidate",
            Role::Generator => "generator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a finished child process ended.
///
/// `code` is `None` when the process was terminated by a signal or killed
/// after exceeding its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
    pub timed_out: bool,
}

impl RunStatus {
    pub const fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            timed_out: false,
        }
    }

    pub const fn signaled() -> Self {
        Self {
            code: None,
            timed_out: false,
        }
    }

    pub const fn timed_out() -> Self {
        Self {
            code: None,
            timed_out: true,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.timed_out, self.code) {
            (true, _) => f.write_str("timed out"),
            (false, Some(code)) => write!(f, "exit code {code}"),
            (false, None) => f.write_str("terminated by signal"),
        }
    }
}

/// Result of running both programs on the current input and comparing their output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Both programs ran and produced byte-identical output.
    Pass,
    /// A program could not be launched, exited non-zero, or timed out.
    ExecutionFailed { role: Role },
    /// Both programs ran but their outputs differ.
    Mismatch,
}

/// Which artifacts are removed once a run finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Remove compiled executables only; data and output files stay for debugging.
    Partial,
    /// Remove executables, data, output files and the diff record.
    Full,
}
