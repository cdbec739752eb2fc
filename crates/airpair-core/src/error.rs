//! Error taxonomy for discovery-driven orchestration.
//!
//! None of these errors end the process.  They describe why a single event
//! did not advance the session:
//!
//! - [`OrchestrationError::ResolutionFailure`] – the advertisement could not be
//!   resolved to an address and port.  Expected on busy networks; dropped.
//! - [`OrchestrationError::NoCandidatePort`] – the pairing advertisement raced
//!   ahead of the connect advertisement.  Benign; the event is ignored.
//! - [`OrchestrationError::ExecutorFailure`] – `adb` reported failure.  The
//!   state machine returns to discovering and waits for a re-announcement.

use thiserror::Error;

use crate::domain::executor::{ExecutorAction, ExecutorResult};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("could not resolve {instance_name} ({service_type})")]
    ResolutionFailure {
        service_type: String,
        instance_name: String,
    },

    #[error("pairing advertisement arrived before any connect advertisement")]
    NoCandidatePort,

    #[error("{action} failed")]
    ExecutorFailure {
        action: ExecutorAction,
        result: ExecutorResult,
    },
}

impl OrchestrationError {
    /// `true` for errors that are part of normal operation and only worth a
    /// debug log line.
    pub fn is_benign(&self) -> bool {
        !matches!(self, OrchestrationError::ExecutorFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_failure_is_not_benign() {
        let err = OrchestrationError::ExecutorFailure {
            action: ExecutorAction::Connect,
            result: ExecutorResult::failure("refused"),
        };
        assert!(!err.is_benign());
        assert_eq!(err.to_string(), "connecting failed");
    }

    #[test]
    fn test_race_and_resolution_are_benign() {
        assert!(OrchestrationError::NoCandidatePort.is_benign());
        assert!(OrchestrationError::ResolutionFailure {
            service_type: "_adb-tls-connect._tcp.local.".to_string(),
            instance_name: "adb-1".to_string(),
        }
        .is_benign());
    }
}
