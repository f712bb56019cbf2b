//! Saved contract records exchanged with persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contract previously persisted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedContract {
    pub name: String,
    pub sourcecode: String,
    pub timestamp: DateTime<Utc>,
}

impl SavedContract {
    pub fn new(name: impl Into<String>, sourcecode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sourcecode: sourcecode.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What a save dialog needs from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePayload {
    pub sourcecode: String,
    /// Name of the contract the source was loaded from, if any.
    pub name: Option<String>,
}
