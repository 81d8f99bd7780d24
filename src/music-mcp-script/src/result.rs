//! Outcome of one interpreter invocation.

use std::time::Duration;

/// How the child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitKind {
    /// Exit status 0.
    Success,
    /// Non-zero exit status, or killed by a signal (`code` is then `None`).
    NonZeroExit {
        /// Exit code if the process exited normally.
        code: Option<i32>,
    },
    /// Still running when the deadline passed; the process was killed.
    Timeout {
        /// The deadline that was exceeded.
        after: Duration,
    },
    /// The process never started.
    SpawnFailure {
        /// Why spawning failed.
        reason: String,
    },
}

/// Captured result of a script run. Both streams are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit classification.
    pub exit_kind: ExitKind,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl ExecutionResult {
    /// A successful run with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_kind: ExitKind::Success,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A run that exited with `code` and printed `stderr`.
    pub fn non_zero(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            exit_kind: ExitKind::NonZeroExit { code },
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// A run killed at its deadline.
    pub fn timeout(after: Duration) -> Self {
        Self {
            exit_kind: ExitKind::Timeout { after },
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// A run that could not be started.
    pub fn spawn_failure(reason: impl Into<String>) -> Self {
        Self {
            exit_kind: ExitKind::SpawnFailure {
                reason: reason.into(),
            },
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Whether the process exited with status 0.
    pub fn is_success(&self) -> bool {
        matches!(self.exit_kind, ExitKind::Success)
    }
}
