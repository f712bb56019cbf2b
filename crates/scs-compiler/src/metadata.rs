//! Swarm metadata hash extraction.
//!
//! Solidity appends a CBOR-encoded trailer to creation bytecode that embeds
//! the swarm hash of the contract metadata:
//!
//! ```text
//! a1 65 "bzzr0" 58 20 <32 bytes> 00 29
//! ```
//!
//! Only that exact trailer, at the very end of the bytecode, is recognised.

use std::sync::LazyLock;

use regex::Regex;

static METADATA_HASH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"a165627a7a72305820([a-f0-9]{64})0029$").expect("Invalid metadata hash regex")
});

/// Extract the 64-hex-character metadata hash from `bytecode`.
///
/// Returns `None` when the bytecode does not end in the metadata trailer.
pub fn extract_metadata_hash(bytecode: &str) -> Option<&str> {
    METADATA_HASH_REGEX
        .captures(bytecode)
        .and_then(|captures| captures.get(1))
        .map(|hash| hash.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_trailing_hash() {
        let hash = "ab".repeat(32);
        let bytecode = format!("6060604052a165627a7a72305820{hash}0029");
        assert_eq!(extract_metadata_hash(&bytecode), Some(hash.as_str()));
    }

    #[test]
    fn test_no_trailer() {
        assert_eq!(extract_metadata_hash("6060604052600080fd"), None);
    }

    #[test]
    fn test_trailer_must_be_at_end() {
        let hash = "cd".repeat(32);
        let bytecode = format!("6060a165627a7a72305820{hash}002900");
        assert_eq!(extract_metadata_hash(&bytecode), None);
    }

    #[test]
    fn test_uppercase_hash_is_rejected() {
        let hash = "AB".repeat(32);
        let bytecode = format!("6060a165627a7a72305820{hash}0029");
        assert_eq!(extract_metadata_hash(&bytecode), None);
    }

    #[test]
    fn test_short_hash_is_rejected() {
        let hash = "ab".repeat(31);
        let bytecode = format!("6060a165627a7a72305820{hash}0029");
        assert_eq!(extract_metadata_hash(&bytecode), None);
    }
}
