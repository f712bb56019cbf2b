//! Error types for compiler output and metadata parsing.

use thiserror::Error;

/// Errors raised while parsing data produced by or describing a compiler.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompilerError {
    /// The compiler output is valid JSON but has an unexpected shape.
    #[error("invalid compiler output: {0}")]
    InvalidOutput(String),

    /// A version string could not be parsed.
    #[error("invalid compiler version: {0}")]
    InvalidVersion(String),

    /// The build list document is malformed.
    #[error("invalid build list: {0}")]
    InvalidBuildList(String),

    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for compiler parsing operations.
pub type Result<T> = std::result::Result<T, CompilerError>;
