//! Out-of-process backend driving a native `solc` binary.
//!
//! Each compile spawns `solc --combined-json abi,bin,metadata -`, feeds the
//! source on stdin and parses stdout as legacy-shaped output. Diagnostics
//! arrive on stderr in either the old single-line format
//! (`<stdin>:3:5: Warning: ...`) or the newer multi-line one
//! (`Warning: ...` followed by ` --> <stdin>:3:5:`).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scs_model::CompilerBuild;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::backend::{BackendError, CompileJob, CompilerBackend};
use crate::output::{CompilerOutput, RawDiagnostic, RawPosition, parse_output};
use crate::version::SolcVersion;

/// `file:line:col: Type: message`
static OLD_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s].*?:\d+:\d+:\s*[A-Za-z]+:").expect("Invalid diagnostic header regex")
});

/// `Type: message` or `Type (1234): message`
static NEW_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z]*)(?: \(\d+\))?: (.*)$").expect("Invalid diagnostic header regex")
});

/// ` --> file:line:col:`
static LOCATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*--> (.*?):(\d+):(\d+):").expect("Invalid diagnostic location regex")
});

/// Configuration for [`SolcProcessBackend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessBackendConfig {
    /// Directory holding per-version binaries named `solc-v<longVersion>`
    /// or `solc-<version>`.
    pub solc_dir: Option<PathBuf>,
    /// Binary used when no per-version binary exists.
    pub fallback_binary: PathBuf,
    /// How long a single compile may take.
    pub timeout_ms: u64,
}

impl Default for ProcessBackendConfig {
    fn default() -> Self {
        Self {
            solc_dir: None,
            fallback_binary: PathBuf::from("solc"),
            timeout_ms: 30_000,
        }
    }
}

/// A backend that shells out to `solc`.
#[derive(Debug, Clone, Default)]
pub struct SolcProcessBackend {
    config: ProcessBackendConfig,
}

impl SolcProcessBackend {
    pub fn new(config: ProcessBackendConfig) -> Self {
        Self { config }
    }

    /// Binary that compiles with `build`.
    pub fn binary_for(&self, build: &CompilerBuild) -> PathBuf {
        if let Some(dir) = &self.config.solc_dir {
            let candidates = [
                dir.join(format!("solc-v{}", build.long_version)),
                dir.join(format!("solc-{}", build.version)),
            ];
            if let Some(found) = candidates.into_iter().find(|path| path.is_file()) {
                return found;
            }
        }
        self.config.fallback_binary.clone()
    }

    /// Ask the fallback binary which version it is.
    ///
    /// Used when no build list is available: the result describes the one
    /// build this backend can load.
    pub async fn detect_build(&self) -> Result<CompilerBuild, BackendError> {
        let binary = &self.config.fallback_binary;
        let output = self.run(binary, &["--version"], None).await?;
        let banner = String::from_utf8_lossy(&output.stdout);
        let version = parse_version_banner(&banner).ok_or_else(|| {
            BackendError::Unavailable(format!(
                "{} did not report a version",
                binary.display()
            ))
        })?;
        Ok(CompilerBuild::new(
            version.short(),
            version.to_string(),
            version.is_release(),
            binary.display().to_string(),
        ))
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    async fn run(
        &self,
        binary: &Path,
        args: &[&str],
        stdin: Option<&str>,
    ) -> Result<std::process::Output, BackendError> {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BackendError::Unavailable(format!("{}: {e}", binary.display())))?;

        if let (Some(text), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(text.as_bytes())
                .await
                .map_err(|e| BackendError::Crashed(format!("writing source: {e}")))?;
            // Dropping the pipe closes stdin so solc starts compiling
        }

        tokio::time::timeout(self.timeout(), child.wait_with_output())
            .await
            .map_err(|_| BackendError::Timeout(self.config.timeout_ms))?
            .map_err(|e| BackendError::Crashed(e.to_string()))
    }
}

impl CompilerBackend for SolcProcessBackend {
    async fn load(&self, build: &CompilerBuild) -> Result<(), BackendError> {
        let binary = self.binary_for(build);
        let output = self.run(&binary, &["--version"], None).await?;
        let reported = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || !banner_matches(&reported, build) {
            return Err(BackendError::BuildUnavailable {
                version: build.long_version.clone(),
                reason: format!(
                    "{} reports {:?}",
                    binary.display(),
                    reported.lines().last().unwrap_or_default()
                ),
            });
        }
        tracing::info!(version = %build.long_version, binary = %binary.display(), "compiler build loaded");
        Ok(())
    }

    async fn compile(&self, job: CompileJob) -> Result<CompilerOutput, BackendError> {
        let binary = self.binary_for(&job.build);
        let mut args = vec!["--combined-json", "abi,bin,metadata"];
        if job.optimize {
            args.push("--optimize");
        }
        args.push("-");

        let output = self.run(&binary, &args, Some(&job.source_text)).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = parse_stderr(&stderr);

        if stdout.trim().is_empty() {
            if diagnostics.is_empty() && !output.status.success() {
                return Err(BackendError::Crashed(stderr.trim().to_string()));
            }
            return Ok(CompilerOutput {
                contracts: Default::default(),
                diagnostics,
            });
        }

        let mut parsed =
            parse_output(&stdout).map_err(|e| BackendError::InvalidOutput(e.to_string()))?;
        parsed.diagnostics.extend(diagnostics);
        Ok(parsed)
    }
}

/// Extract the version from `solc --version` output.
///
/// The banner's last line reads `Version: 0.4.11+commit.68ef5810.Linux.g++`;
/// the platform suffix after the commit hash is dropped.
pub fn parse_version_banner(banner: &str) -> Option<SolcVersion> {
    let raw = banner
        .lines()
        .find_map(|line| line.split_once("Version:"))
        .map(|(_, version)| version.trim())?;
    let version = match raw.split_once("+commit.") {
        Some((base, rest)) => {
            let hash: String = rest.chars().take_while(char::is_ascii_hexdigit).collect();
            format!("{base}+commit.{hash}")
        }
        None => raw.split_whitespace().next()?.to_string(),
    };
    version.parse().ok()
}

/// Whether a `--version` banner names `build`.
fn banner_matches(banner: &str, build: &CompilerBuild) -> bool {
    parse_version_banner(banner).is_some_and(|version| {
        version.short() == build.version || version.to_string() == build.long_version
    })
}

/// Split solc's stderr into raw diagnostics.
pub fn parse_stderr(stderr: &str) -> Vec<RawDiagnostic> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in stderr.lines() {
        let starts_block = OLD_HEADER_REGEX.is_match(line) || NEW_HEADER_REGEX.is_match(line);
        if starts_block || blocks.is_empty() {
            if !line.trim().is_empty() {
                blocks.push(vec![line]);
            }
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    blocks
        .into_iter()
        .map(|block| parse_block(&block))
        .collect()
}

fn parse_block(block: &[&str]) -> RawDiagnostic {
    let header = block[0];
    if OLD_HEADER_REGEX.is_match(header) {
        return RawDiagnostic::from_formatted(&block.join("\n"), false);
    }

    let Some(captures) = NEW_HEADER_REGEX.captures(header) else {
        return RawDiagnostic::from_formatted(&block.join("\n"), false);
    };
    let location = block[1..]
        .iter()
        .find_map(|line| LOCATION_REGEX.captures(line));
    let (source, position) = match location {
        Some(location) => (
            Some(location[1].to_string()),
            RawPosition::LineColumn {
                line: location[2].parse().unwrap_or(1),
                column: location[3].parse().unwrap_or(1),
            },
        ),
        None => (None, RawPosition::Unknown),
    };

    RawDiagnostic {
        category: captures[1].to_string(),
        message: captures[2].trim_end().to_string(),
        source,
        position,
        formal: false,
    }
}
