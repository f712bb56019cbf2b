//! Compiler integration for Contract Studio.
//!
//! This crate knows everything about talking to a Solidity compiler and
//! nothing about sessions:
//!
//! - `output` - parsing of the legacy (solc-js `compile`) and standard-JSON
//!   output shapes into one [`CompilerOutput`]
//! - `diagnostics` - mapping raw diagnostics onto 1-based line/column
//!   positions
//! - `metadata` - swarm metadata hash extraction from bytecode
//! - `version` / `builds` - parsing of solc versions and the published
//!   build list
//! - `backend` - the [`CompilerBackend`] seam the session dispatches to
//! - `process` - a backend that runs a native `solc` binary out of process

pub mod backend;
pub mod builds;
pub mod diagnostics;
pub mod error;
pub mod metadata;
pub mod output;
pub mod process;
pub mod version;

pub use backend::{BackendError, CompileJob, CompilerBackend};
pub use builds::{DEFAULT_BUILD_BASE_URL, parse_build_list};
pub use diagnostics::{LineIndex, normalize};
pub use error::{CompilerError, Result};
pub use metadata::extract_metadata_hash;
pub use output::{CompilerOutput, OutputShape, RawDiagnostic, RawPosition, parse_output};
pub use process::{ProcessBackendConfig, SolcProcessBackend, parse_version_banner};
pub use version::SolcVersion;
