//! On-disk storage for Contract Studio.
//!
//! # Layout
//!
//! A store is a directory holding:
//!
//! ```text
//! contracts.json   saved contracts, keyed by id
//! draft.sol        the last unsaved editor contents
//! ```
//!
//! All writes are atomic (temp file + rename), so a crash never leaves a
//! half-written library behind. Built-in [`snippets`] are offered next to
//! the saved contracts but never written to disk.

mod error;
mod io;
mod snippets;
mod store;

pub use error::{PersistenceError, Result};
pub use snippets::{Snippet, snippets};
pub use store::{CONTRACTS_FILE, ContractStore, DRAFT_FILE, SavedEntry, StoreConfig};
