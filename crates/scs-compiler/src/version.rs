//! Solidity compiler version parsing.
//!
//! Handles the version strings found in the published build list, e.g.
//! `0.4.11`, `0.4.11+commit.68ef5810` and
//! `0.4.12-nightly.2017.5.30+commit.254b5572`, and orders them so that the
//! newest build sorts last.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CompilerError, Result};

/// A parsed solc version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SolcVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Pre-release tag such as `nightly.2017.5.30`.
    pub pre_release: Option<String>,
    /// Commit hash from the `+commit.<hash>` suffix.
    pub commit: Option<String>,
}

impl SolcVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            commit: None,
        }
    }

    /// A tagged release rather than a nightly.
    #[must_use]
    pub fn is_release(&self) -> bool {
        self.pre_release.is_none()
    }

    /// The `major.minor.patch` part only.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Numeric fields of the pre-release tag, for date-aware ordering of
    /// nightlies (`nightly.2017.5.30` < `nightly.2017.10.2`).
    fn pre_release_key(&self) -> Vec<u64> {
        self.pre_release
            .as_deref()
            .map(|tag| {
                tag.split('.')
                    .filter_map(|part| part.parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromStr for SolcVersion {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);

        let (rest, commit) = match s.split_once('+') {
            Some((rest, build)) => (
                rest,
                Some(build.strip_prefix("commit.").unwrap_or(build).to_string()),
            ),
            None => (s, None),
        };

        let (version_part, pre_release) = match rest.split_once('-') {
            Some((version, pre)) => (version, Some(pre.to_string())),
            None => (rest, None),
        };

        let parts: Vec<&str> = version_part.split('.').collect();
        if parts.len() != 3 {
            return Err(CompilerError::InvalidVersion(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| CompilerError::InvalidVersion(s.to_string()))
        };

        Ok(Self {
            major: parse(parts[0])?,
            minor: parse(parts[1])?,
            patch: parse(parts[2])?,
            pre_release,
            commit,
        })
    }
}

impl fmt::Display for SolcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{pre}")?;
        }
        if let Some(ref commit) = self.commit {
            write!(f, "+commit.{commit}")?;
        }
        Ok(())
    }
}

impl PartialOrd for SolcVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SolcVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            // A nightly precedes the release it leads up to
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), Some(_)) => self.pre_release_key().cmp(&other.pre_release_key()),
            })
            .then_with(|| self.commit.cmp(&other.commit))
    }
}
