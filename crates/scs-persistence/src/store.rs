//! The saved-contract library and the editor draft.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::ProjectDirs;
use scs_model::SavedContract;
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};
use crate::io::{read_optional, remove_optional, write_atomic};

/// Saved contracts, keyed by id.
pub const CONTRACTS_FILE: &str = "contracts.json";

/// Unsaved editor contents.
pub const DRAFT_FILE: &str = "draft.sol";

const APP_QUALIFIER: &str = "io";
const APP_ORG: &str = "contract-studio";
const APP_NAME: &str = "Contract Studio";

/// Where the store lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store directory. Defaults to the platform data directory.
    pub root: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured root, or the platform data directory.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(PersistenceError::NoStorageDirectory)
    }
}

/// A saved contract together with its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub id: String,
    #[serde(flatten)]
    pub contract: SavedContract,
}

/// Directory-backed contract library.
#[derive(Debug, Clone)]
pub struct ContractStore {
    root: PathBuf,
}

impl ContractStore {
    /// A store rooted at `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(config.resolve_root()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn contracts_path(&self) -> PathBuf {
        self.root.join(CONTRACTS_FILE)
    }

    fn draft_path(&self) -> PathBuf {
        self.root.join(DRAFT_FILE)
    }

    /// All saved contracts, most recently saved first.
    pub fn list(&self) -> Result<Vec<SavedEntry>> {
        let mut entries: Vec<SavedEntry> = self
            .read_contracts()?
            .into_iter()
            .map(|(id, contract)| SavedEntry { id, contract })
            .collect();
        entries.sort_by(|a, b| b.contract.timestamp.cmp(&a.contract.timestamp));
        Ok(entries)
    }

    pub fn get(&self, id: &str) -> Result<SavedContract> {
        self.read_contracts()?
            .remove(id)
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })
    }

    /// Save `sourcecode` under a fresh id.
    pub fn save_new(&self, name: &str, sourcecode: &str) -> Result<SavedEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PersistenceError::EmptyName);
        }

        let mut contracts = self.read_contracts()?;
        let id = uuid::Uuid::new_v4().to_string();
        let contract = SavedContract {
            name: name.to_string(),
            sourcecode: sourcecode.to_string(),
            timestamp: Utc::now(),
        };
        contracts.insert(id.clone(), contract.clone());
        self.write_contracts(&contracts)?;

        tracing::info!(%id, name, "saved contract");
        Ok(SavedEntry { id, contract })
    }

    /// Remove a saved contract, returning it.
    pub fn delete(&self, id: &str) -> Result<SavedContract> {
        let mut contracts = self.read_contracts()?;
        let removed = contracts
            .remove(id)
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })?;
        self.write_contracts(&contracts)?;
        tracing::info!(%id, name = %removed.name, "deleted saved contract");
        Ok(removed)
    }

    pub fn save_draft(&self, text: &str) -> Result<()> {
        write_atomic(&self.draft_path(), text.as_bytes())?;
        tracing::debug!(bytes = text.len(), "draft saved");
        Ok(())
    }

    /// The stored draft, if there is one.
    pub fn load_draft(&self) -> Result<Option<String>> {
        read_optional(&self.draft_path())
    }

    /// Remove the draft. Returns whether one existed.
    pub fn clear_draft(&self) -> Result<bool> {
        remove_optional(&self.draft_path())
    }

    /// [`list`](Self::list) on the blocking thread pool.
    pub async fn list_async(&self) -> Result<Vec<SavedEntry>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|source| PersistenceError::Task { source })?
    }

    /// [`save_draft`](Self::save_draft) on the blocking thread pool.
    pub async fn save_draft_async(&self, text: String) -> Result<()> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.save_draft(&text))
            .await
            .map_err(|source| PersistenceError::Task { source })?
    }

    /// [`load_draft`](Self::load_draft) on the blocking thread pool.
    pub async fn load_draft_async(&self) -> Result<Option<String>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_draft())
            .await
            .map_err(|source| PersistenceError::Task { source })?
    }

    fn read_contracts(&self) -> Result<BTreeMap<String, SavedContract>> {
        let path = self.contracts_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(BTreeMap::new());
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| PersistenceError::Deserialization {
            path,
            source: Box::new(e),
        })
    }

    fn write_contracts(&self, contracts: &BTreeMap<String, SavedContract>) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(contracts).map_err(|e| PersistenceError::Serialization {
                source: Box::new(e),
            })?;
        write_atomic(&self.contracts_path(), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_store() {
        let dir = tempdir().unwrap();
        let store = ContractStore::new(dir.path());
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.load_draft().unwrap(), None);
    }

    #[test]
    fn test_explicit_root_wins() {
        let config = StoreConfig {
            root: Some(PathBuf::from("/tmp/contracts")),
        };
        assert_eq!(config.resolve_root().unwrap(), PathBuf::from("/tmp/contracts"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempdir().unwrap();
        let store = ContractStore::new(dir.path());
        assert!(matches!(
            store.save_new("   ", "contract A {}"),
            Err(PersistenceError::EmptyName)
        ));
        assert!(!dir.path().join(CONTRACTS_FILE).exists());
    }

    #[test]
    fn test_corrupt_library() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONTRACTS_FILE), "{not json").unwrap();
        let store = ContractStore::new(dir.path());
        let err = store.list().unwrap_err();
        assert!(matches!(err, PersistenceError::Deserialization { .. }));
        assert!(err.suggestion().is_some());
    }
}
