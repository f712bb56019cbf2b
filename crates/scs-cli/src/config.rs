//! The `contract-studio` configuration file.
//!
//! ```toml
//! [session]
//! debounce_ms = 100
//! optimize = false
//!
//! [compiler]
//! solc_dir = "/opt/solc"
//! fallback_binary = "solc"
//! timeout_ms = 30000
//!
//! [store]
//! root = "/home/me/.contracts"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use scs_compiler::ProcessBackendConfig;
use scs_persistence::StoreConfig;
use scs_session::SessionConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub compiler: ProcessBackendConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("parse configuration")?;
        config.session.validate()?;
        Ok(config)
    }

    /// Platform location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "contract-studio", "Contract Studio")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Load `explicit` if given (it must exist), otherwise the default
    /// file if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|path| path.is_file()) {
                Some(path) => path,
                None => {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("load configuration {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
