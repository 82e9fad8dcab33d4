//! Generic action-dispatch harness.
//!
//! Actions are registered once on a [`RegistryBuilder`], frozen into an [`ActionRegistry`],
//! and run by label through a [`Dispatcher`]. Every invocation resolves to an [`Outcome`]
//! that is rendered into exactly one [`ActionLog`] entry.

pub mod dispatcher;
pub mod log;
pub mod registry;
pub mod render;
pub mod session;

pub use dispatcher::Dispatcher;
pub use log::{ActionLog, LogEntry, Severity};
pub use registry::{Action, ActionRegistry, RegistryBuilder};
pub use render::{render, render_entry};
pub use session::{ServiceHandle, ServiceKind, Services, Session, SessionState, SubscriptionInfo};

use thiserror::Error;

/// Failures surfaced by the harness. All of them end up as log entries, never as panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("action `{0}` is already registered")]
    DuplicateLabel(String),
    #[error("{0}")]
    UnknownAction(String),
    #[error("not initialized yet")]
    NotReady,
    #[error("service `{0}` requested before initialization")]
    NotInitialized(ServiceKind),
    #[error("{0}")]
    InitializationError(String),
    #[error("{0}")]
    RemoteOperationFailure(String),
    #[error("{0}")]
    Precondition(String),
    #[error("`{0}` is already running")]
    AlreadyRunning(String),
}

impl HarnessError {
    /// Variant name, used as the `kind` part of a rendered failure.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::DuplicateLabel(_) => "DuplicateLabel",
            HarnessError::UnknownAction(_) => "UnknownAction",
            HarnessError::NotReady => "NotReady",
            HarnessError::NotInitialized(_) => "NotInitialized",
            HarnessError::InitializationError(_) => "InitializationError",
            HarnessError::RemoteOperationFailure(_) => "RemoteOperationFailure",
            HarnessError::Precondition(_) => "Precondition",
            HarnessError::AlreadyRunning(_) => "AlreadyRunning",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            HarnessError::NotReady | HarnessError::AlreadyRunning(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        HarnessError::Precondition(message.into())
    }
}

impl From<crate::core::Error> for HarnessError {
    fn from(err: crate::core::Error) -> Self {
        HarnessError::RemoteOperationFailure(err.to_string())
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Vec<String>),
    Failure { kind: &'static str, message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<&HarnessError> for Outcome {
    fn from(err: &HarnessError) -> Self {
        Outcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcome_uses_variant_name() {
        let outcome = Outcome::from(&HarnessError::UnknownAction("Login".to_string()));
        assert_eq!(
            outcome,
            Outcome::Failure {
                kind: "UnknownAction",
                message: "Login".to_string()
            }
        );
    }

    #[test]
    fn test_client_errors_become_remote_failures() {
        let err: HarnessError = crate::core::Error::Api {
            context: "Get account".to_string(),
            code: 401,
            kind: "user_unauthorized".to_string(),
            message: "Unauthorized".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "RemoteOperationFailure");
        assert!(err.to_string().contains("401 user_unauthorized"));
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(HarnessError::NotReady.severity(), Severity::Warning);
    }
}
