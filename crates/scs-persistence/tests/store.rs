//! Contract library round trips through the file system.

use scs_persistence::{CONTRACTS_FILE, ContractStore, PersistenceError, snippets};
use tempfile::tempdir;

#[test]
fn test_save_list_get_delete() {
    let dir = tempdir().unwrap();
    let store = ContractStore::new(dir.path());

    let first = store.save_new("Token", "contract Token {}").unwrap();
    let second = store.save_new("  Wallet ", "contract Wallet {}").unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.contract.name, "Wallet");

    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].contract.timestamp >= listed[1].contract.timestamp);

    assert_eq!(store.get(&first.id).unwrap().sourcecode, "contract Token {}");

    let removed = store.delete(&first.id).unwrap();
    assert_eq!(removed.name, "Token");
    assert_eq!(store.list().unwrap().len(), 1);
    assert!(matches!(
        store.get(&first.id),
        Err(PersistenceError::NotFound { .. })
    ));
}

#[test]
fn test_library_is_plain_json() {
    let dir = tempdir().unwrap();
    let store = ContractStore::new(dir.path());
    let entry = store.save_new("Token", "contract Token {}").unwrap();

    let raw = std::fs::read_to_string(dir.path().join(CONTRACTS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[&entry.id]["name"], "Token");
    assert_eq!(value[&entry.id]["sourcecode"], "contract Token {}");
    assert!(value[&entry.id]["timestamp"].is_string());
}

#[test]
fn test_delete_unknown_id() {
    let dir = tempdir().unwrap();
    let store = ContractStore::new(dir.path());
    let err = store.delete("missing").unwrap_err();
    assert_eq!(err.to_string(), "Saved contract not found: missing");
    assert!(err.user_message().contains("missing"));
}

#[test]
fn test_draft_round_trip() {
    let dir = tempdir().unwrap();
    let store = ContractStore::new(dir.path().join("nested"));

    store.save_draft("contract Draft {}").unwrap();
    assert_eq!(store.load_draft().unwrap().as_deref(), Some("contract Draft {}"));
    store.save_draft("").unwrap();
    assert_eq!(store.load_draft().unwrap().as_deref(), Some(""));

    assert!(store.clear_draft().unwrap());
    assert!(!store.clear_draft().unwrap());
    assert_eq!(store.load_draft().unwrap(), None);
}

#[tokio::test]
async fn test_async_wrappers() {
    let dir = tempdir().unwrap();
    let store = ContractStore::new(dir.path());
    store.save_draft_async("contract A {}".to_string()).await.unwrap();
    assert_eq!(
        store.load_draft_async().await.unwrap().as_deref(),
        Some("contract A {}")
    );
    store.save_new("A", "contract A {}").unwrap();
    assert_eq!(store.list_async().await.unwrap().len(), 1);
}

#[test]
fn test_snippets_are_named_and_distinct() {
    let all = snippets();
    assert!(!all.is_empty());
    for snippet in &all {
        assert!(!snippet.name.is_empty());
        assert!(snippet.sourcecode.contains("pragma solidity"));
    }
    let mut ids: Vec<_> = all.iter().map(|s| s.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), all.len());
}
