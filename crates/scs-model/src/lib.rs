//! Shared data model for Contract Studio.
//!
//! These types cross every crate boundary in the workspace: the compiler
//! crate produces them, the session owns them, persistence stores them and
//! the CLI prints them.

pub mod build;
pub mod contract;
pub mod diagnostic;
pub mod saved;

pub use build::CompilerBuild;
pub use contract::{CompiledContract, ContractSet, DeploymentPayload};
pub use diagnostic::{Diagnostic, DiagnosticCounts, Severity};
pub use saved::{SavePayload, SavedContract};
