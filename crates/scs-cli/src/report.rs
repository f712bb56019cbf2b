//! What `contract-studio compile` prints, detached from the session.

use scs_compiler::extract_metadata_hash;
use scs_model::{Diagnostic, DiagnosticCounts};
use scs_session::SessionSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSummary {
    pub name: String,
    pub bytecode_bytes: usize,
    pub metadata_hash: Option<String>,
    pub selected: bool,
}

/// Outcome of one compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    /// Long version of the build that compiled.
    pub build: Option<String>,
    pub optimize: bool,
    pub contracts: Vec<ContractSummary>,
    pub diagnostics: Vec<Diagnostic>,
    pub counts: DiagnosticCounts,
    pub worker_error: Option<String>,
}

impl CompileReport {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let build = snapshot
            .selected_build
            .and_then(|index| snapshot.builds.get(index))
            .map(|build| build.long_version.clone());
        let contracts = snapshot
            .contracts
            .iter()
            .flat_map(|set| set.iter())
            .map(|contract| ContractSummary {
                name: contract.name.clone(),
                bytecode_bytes: contract.bytecode.len() / 2,
                // Builds without metadata output carry no swarm hash
                metadata_hash: contract
                    .metadata
                    .as_ref()
                    .and_then(|_| extract_metadata_hash(&contract.bytecode))
                    .map(str::to_string),
                selected: snapshot.selected_contract.as_deref() == Some(contract.name.as_str()),
            })
            .collect();
        Self {
            build,
            optimize: snapshot.optimize,
            contracts,
            diagnostics: snapshot.diagnostics.clone(),
            counts: snapshot.counts,
            worker_error: snapshot.worker_error.clone(),
        }
    }

    /// Whether the command should exit unsuccessfully.
    pub fn has_errors(&self) -> bool {
        self.counts.has_errors() || self.worker_error.is_some()
    }
}
