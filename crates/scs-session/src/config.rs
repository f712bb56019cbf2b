//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Timing and default toggles for a contract session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last edit before an automatic compile.
    pub debounce_ms: u64,

    /// Minimum spacing between applied split-pane ratio updates.
    pub resize_interval_ms: u64,

    /// Whether edits trigger compiles.
    pub autocompile: bool,

    /// Whether compiles run the optimizer.
    pub optimize: bool,

    /// Capacity of the intent queue and of the event channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            resize_interval_ms: 100,
            autocompile: true,
            optimize: false,
            channel_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// A configuration where only explicit compiles run.
    pub fn manual() -> Self {
        Self {
            autocompile: false,
            ..Default::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resize_interval(&self) -> Duration {
        Duration::from_millis(self.resize_interval_ms)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(SessionError::InvalidConfig(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
