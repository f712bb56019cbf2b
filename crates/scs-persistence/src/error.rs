//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No saved contract with this id.
    #[error("Saved contract not found: {id}")]
    NotFound { id: String },

    /// A contract must be saved under a non-empty name.
    #[error("Contract name must not be empty")]
    EmptyName,

    /// No platform data directory and no explicit store root.
    #[error("Could not determine a storage directory")]
    NoStorageDirectory,

    /// Serialization error.
    #[error("Failed to serialize saved contracts")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to read saved contracts from {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::NotFound { id } => format!("There is no saved contract with id '{id}'."),
            Self::EmptyName => "Please give the contract a name before saving.".to_string(),
            Self::NoStorageDirectory => {
                "No folder is available for saved contracts on this system.".to_string()
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the contract library.".to_string()
            }
            Self::Deserialization { path, .. } => {
                format!(
                    "The contract library at {} could not be read. The file may be corrupted.",
                    path.display()
                )
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::Task { .. } => "A storage operation was interrupted.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::NotFound { .. } => Some("List saved contracts to see the available ids.".into()),
            Self::EmptyName => None,
            Self::NoStorageDirectory => {
                Some("Set `store.root` in the configuration file.".into())
            }
            Self::Serialization { .. } | Self::Task { .. } => None,
            Self::Deserialization { .. } => {
                Some("Move the damaged file aside to start with an empty library.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
