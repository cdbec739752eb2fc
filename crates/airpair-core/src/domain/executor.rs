//! Outcome of a device executor invocation.

use std::fmt;

/// The three actions the orchestrator asks the executor to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorAction {
    Pair,
    Connect,
    SwitchMode,
}

impl fmt::Display for ExecutorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutorAction::Pair => "pairing",
            ExecutorAction::Connect => "connecting",
            ExecutorAction::SwitchMode => "mode switch",
        };
        f.write_str(name)
    }
}

/// Success flag plus captured output, kept for diagnostics.
///
/// Never retried automatically; a failed result only ends the current attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorResult {
    pub succeeded: bool,
    pub stderr: String,
    pub stdout: String,
}

impl ExecutorResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            ..Default::default()
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stderr: stderr.into(),
            stdout: String::new(),
        }
    }
}
