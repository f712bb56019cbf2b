//! Compiler build descriptors.

use serde::{Deserialize, Serialize};

/// One selectable compiler version.
///
/// Everything except `ready` is fixed at construction. `ready` flips from
/// `false` to `true` once the backend has loaded the build and never flips
/// back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerBuild {
    /// Short version, e.g. `0.4.11`.
    pub version: String,
    /// Full version including commit, e.g. `0.4.11+commit.68ef5810`.
    pub long_version: String,
    /// Whether this build is a tagged release (as opposed to a nightly).
    pub is_release: bool,
    /// Where the backend fetches the build from.
    pub download_url: String,
    #[serde(default)]
    ready: bool,
}

impl CompilerBuild {
    /// Create a build that has not been loaded yet.
    pub fn new(
        version: impl Into<String>,
        long_version: impl Into<String>,
        is_release: bool,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            long_version: long_version.into(),
            is_release,
            download_url: download_url.into(),
            ready: false,
        }
    }

    /// Whether the backend has finished loading this build.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Flag the build as loaded. Idempotent.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Label for version pickers: releases show the short version,
    /// nightlies the long one.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.is_release {
            &self.version
        } else {
            &self.long_version
        }
    }

    /// Whether `version` names this build, by short or long version.
    #[must_use]
    pub fn matches_version(&self, version: &str) -> bool {
        let version = version.strip_prefix('v').unwrap_or(version);
        self.version == version || self.long_version == version
    }
}
