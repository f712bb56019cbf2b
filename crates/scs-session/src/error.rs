//! Session error types.

use thiserror::Error;

/// Errors returned to callers of session operations.
///
/// Compiler diagnostics and backend failures are not errors at this level:
/// the former are session data, the latter is recorded as the worker error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// A build index outside the loaded build list.
    #[error("build index {index} is out of range ({len} builds loaded)")]
    InvalidIndex { index: usize, len: usize },

    /// No compiled contract with this name.
    #[error("no compiled contract named '{0}'")]
    UnknownContract(String),

    /// The configuration cannot be used.
    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    /// The session task has stopped.
    #[error("session has shut down")]
    Closed,
}

impl SessionError {
    /// Returns a user-friendly error message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidIndex { .. } => "That compiler version does not exist.".to_string(),
            Self::UnknownContract(name) => {
                format!("The contract '{name}' is not part of the last compile.")
            }
            Self::InvalidConfig(reason) => format!("The configuration is invalid: {reason}"),
            Self::Closed => "The session is no longer running.".to_string(),
        }
    }
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
