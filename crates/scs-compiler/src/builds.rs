//! Parsing of the published compiler build list.
//!
//! The list is fetched by the embedding application; this module only
//! turns the document into [`CompilerBuild`]s, newest first.

use std::collections::BTreeMap;
use std::str::FromStr;

use scs_model::CompilerBuild;
use serde::Deserialize;

use crate::error::{CompilerError, Result};
use crate::version::SolcVersion;

/// Where the published solc-js builds live.
pub const DEFAULT_BUILD_BASE_URL: &str = "https://ethereum.github.io/solc-bin/bin";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedBuild {
    path: String,
    version: String,
    long_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildList {
    builds: Vec<ListedBuild>,
    /// Release version -> build path.
    #[serde(default)]
    releases: BTreeMap<String, String>,
}

/// Parse a `list.json` document into builds ordered newest first.
///
/// A build is a release when the list's `releases` table maps its version
/// to exactly its path. Builds whose long version cannot be parsed are kept
/// after the parseable ones.
pub fn parse_build_list(json: &str, base_url: &str) -> Result<Vec<CompilerBuild>> {
    let list: BuildList = serde_json::from_str(json)
        .map_err(|e| CompilerError::InvalidBuildList(e.to_string()))?;
    let base_url = base_url.trim_end_matches('/');

    let mut entries: Vec<(Option<SolcVersion>, CompilerBuild)> = list
        .builds
        .into_iter()
        .map(|listed| {
            let is_release = list.releases.get(&listed.version) == Some(&listed.path);
            let version = SolcVersion::from_str(&listed.long_version).ok();
            if version.is_none() {
                tracing::debug!(long_version = %listed.long_version, "unparseable build version");
            }
            let build = CompilerBuild::new(
                listed.version,
                listed.long_version,
                is_release,
                format!("{base_url}/{}", listed.path),
            );
            (version, build)
        })
        .collect();

    // Lists are published oldest first
    entries.reverse();
    entries.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    Ok(entries.into_iter().map(|(_, build)| build).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"{
        "builds": [
            {"path": "soljson-v0.4.10+commit.f0d539ae.js", "version": "0.4.10", "longVersion": "0.4.10+commit.f0d539ae"},
            {"path": "soljson-v0.4.11+commit.68ef5810.js", "version": "0.4.11", "longVersion": "0.4.11+commit.68ef5810"},
            {"path": "soljson-v0.4.12-nightly.2017.5.30+commit.254b5572.js", "version": "0.4.12", "prerelease": "nightly.2017.5.30", "longVersion": "0.4.12-nightly.2017.5.30+commit.254b5572"}
        ],
        "releases": {
            "0.4.11": "soljson-v0.4.11+commit.68ef5810.js",
            "0.4.10": "soljson-v0.4.10+commit.f0d539ae.js"
        },
        "latestRelease": "0.4.11"
    }"#;

    #[test]
    fn test_newest_first() {
        let builds = parse_build_list(LIST, "https://example.invalid/bin/").unwrap();
        let versions: Vec<&str> = builds.iter().map(|b| b.long_version.as_str()).collect();
        assert_eq!(
            versions,
            vec![
                "0.4.12-nightly.2017.5.30+commit.254b5572",
                "0.4.11+commit.68ef5810",
                "0.4.10+commit.f0d539ae",
            ]
        );
    }

    #[test]
    fn test_release_flags_and_urls() {
        let builds = parse_build_list(LIST, "https://example.invalid/bin/").unwrap();
        assert!(!builds[0].is_release);
        assert!(builds[1].is_release);
        assert_eq!(
            builds[1].download_url,
            "https://example.invalid/bin/soljson-v0.4.11+commit.68ef5810.js"
        );
        assert!(builds.iter().all(|b| !b.is_ready()));
    }

    #[test]
    fn test_invalid_list() {
        assert!(matches!(
            parse_build_list("{}", DEFAULT_BUILD_BASE_URL),
            Err(CompilerError::InvalidBuildList(_))
        ));
    }
}
