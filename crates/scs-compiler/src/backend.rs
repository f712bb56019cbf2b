//! The seam between the session and whatever actually compiles.

use std::future::Future;

use scs_model::CompilerBuild;
use thiserror::Error;

use crate::output::CompilerOutput;

/// Failures of the compiler backend itself.
///
/// These are never source diagnostics: they mean the backend could not
/// produce an answer at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    /// The requested build could not be loaded.
    #[error("compiler build {version} is unavailable: {reason}")]
    BuildUnavailable { version: String, reason: String },

    /// The backend could not be reached or started.
    #[error("compiler backend unavailable: {0}")]
    Unavailable(String),

    /// The backend died while compiling.
    #[error("compiler worker crashed: {0}")]
    Crashed(String),

    /// The backend did not answer in time.
    #[error("compiler did not respond within {0} ms")]
    Timeout(u64),

    /// The backend answered with something that is not compiler output.
    #[error("unreadable compiler output: {0}")]
    InvalidOutput(String),
}

impl BackendError {
    /// Returns a user-friendly error message suitable for display in the UI.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::BuildUnavailable { .. } => "The selected compiler version could not be loaded.",
            Self::Unavailable(_) => "The compiler could not be started.",
            Self::Crashed(_) => "The compiler stopped unexpectedly.",
            Self::Timeout(_) => "The compiler took too long to respond.",
            Self::InvalidOutput(_) => "The compiler returned output that could not be read.",
        }
    }
}

/// Everything a backend needs to run one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub source_text: String,
    pub build: CompilerBuild,
    pub optimize: bool,
}

/// A compiler that runs independently of the session.
///
/// Implementations may compile in-process or hand the job to another
/// process; either way the returned futures must not block the caller.
pub trait CompilerBackend: Send + Sync + 'static {
    /// Prepare `build` for use. Called once per build before it is marked
    /// ready.
    fn load(&self, build: &CompilerBuild) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Compile one job.
    fn compile(
        &self,
        job: CompileJob,
    ) -> impl Future<Output = Result<CompilerOutput, BackendError>> + Send;
}
