//! Compiled contract artifacts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single compiled contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    /// Contract name as declared in source.
    pub name: String,
    /// ABI as a JSON string.
    pub abi_interface: String,
    /// Creation bytecode as hex, without a `0x` prefix.
    pub bytecode: String,
    /// Compiler metadata JSON, when the build emits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl CompiledContract {
    /// Bytecode with the `0x` prefix expected by deployment tooling.
    #[must_use]
    pub fn bytecode_with_prefix(&self) -> String {
        format!("0x{}", self.bytecode)
    }
}

/// All contracts produced by one compile, keyed by name.
///
/// A set is only ever replaced wholesale; the session never patches
/// individual entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractSet {
    contracts: BTreeMap<String, CompiledContract>,
}

impl ContractSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contract: CompiledContract) {
        self.contracts.insert(contract.name.clone(), contract);
    }

    pub fn get(&self, name: &str) -> Option<&CompiledContract> {
        self.contracts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Contract names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.names().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledContract> {
        self.contracts.values()
    }
}

impl FromIterator<CompiledContract> for ContractSet {
    fn from_iter<I: IntoIterator<Item = CompiledContract>>(iter: I) -> Self {
        let mut set = Self::new();
        for contract in iter {
            set.insert(contract);
        }
        set
    }
}

/// What a deployment component needs from the selected contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPayload {
    pub abi: String,
    pub bytecode_with_prefix: String,
    pub sourcecode: String,
}
