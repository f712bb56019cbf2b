use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use scs_compiler::{SolcProcessBackend, extract_metadata_hash, parse_build_list};
use scs_model::CompilerBuild;
use scs_persistence::{ContractStore, SavedEntry, Snippet, snippets};
use scs_session::{Intent, SessionConfig, SessionEvent, spawn_session};
use scs_cli::config::AppConfig;
use scs_cli::report::CompileReport;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::cli::{BuildsArgs, CompileArgs, DraftCommand, SavedCommand};

/// Extra time allowed on top of the compiler timeout for session bookkeeping.
const WAIT_SLACK: Duration = Duration::from_secs(5);

pub async fn run_compile(args: &CompileArgs, config: &AppConfig) -> Result<CompileReport> {
    let source = match &args.file {
        Some(path) => read_source(path)?,
        None => ContractStore::open(&config.store)?
            .load_draft_async()
            .await?
            .context("no source file given and no draft stored")?,
    };

    let backend = SolcProcessBackend::new(config.compiler.clone());
    let builds = match &args.builds {
        Some(list) => {
            let json = fs::read_to_string(list)
                .with_context(|| format!("read build list {}", list.display()))?;
            parse_build_list(&json, &args.base_url)
                .with_context(|| format!("parse build list {}", list.display()))?
        }
        None => vec![
            backend
                .detect_build()
                .await
                .context("detect the local solc")?,
        ],
    };
    if builds.is_empty() {
        bail!("the build list is empty");
    }
    let selection = match &args.build {
        Some(version) => Some(
            builds
                .iter()
                .position(|build| build.matches_version(version))
                .with_context(|| format!("build {version} is not in the build list"))?,
        ),
        None => None,
    };

    let session_config = SessionConfig {
        autocompile: false,
        optimize: args.optimize || config.session.optimize,
        ..config.session.clone()
    };
    let limit = Duration::from_millis(config.compiler.timeout_ms) + WAIT_SLACK;
    let (handle, task) = spawn_session(session_config, backend)?;
    let mut events = handle.subscribe();

    handle.send(Intent::LoadBuilds(builds)).await?;
    match selection {
        Some(index) => handle.send(Intent::SelectBuild(index)).await?,
        None => handle.send(Intent::SelectLatestRelease).await?,
    }
    let loaded = wait_for(&mut events, limit, |event| match event {
        SessionEvent::BuildReady { .. } => Some(true),
        SessionEvent::WorkerFailed { .. } => Some(false),
        _ => None,
    })
    .await?;
    debug!(loaded, "compiler build settled");

    handle.send(Intent::Edit(source)).await?;
    handle.send(Intent::CompileNow).await?;
    let outcome = wait_for(&mut events, limit, |event| match event {
        SessionEvent::CompileFinished { .. }
        | SessionEvent::CompileFailed { .. }
        | SessionEvent::CompileSkipped { .. } => Some(event.clone()),
        _ => None,
    })
    .await?;
    info!(?outcome, "compile settled");

    if let Some(name) = &args.contract {
        handle
            .send(Intent::SelectContract(name.clone()))
            .await
            .with_context(|| format!("select contract {name}"))?;
    }
    let snapshot = handle.snapshot().await?;
    handle.shutdown().await;
    if let Err(error) = task.await {
        warn!(%error, "session task ended abnormally");
    }
    Ok(CompileReport::from_snapshot(&snapshot))
}

async fn wait_for<T>(
    events: &mut broadcast::Receiver<SessionEvent>,
    limit: Duration,
    mut pick: impl FnMut(&SessionEvent) -> Option<T>,
) -> Result<T> {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(value) = pick(&event) {
                        return Ok(value);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed session events");
                }
                Err(RecvError::Closed) => bail!("the session stopped unexpectedly"),
            }
        }
    };
    tokio::time::timeout(limit, wait)
        .await
        .context("timed out waiting for the compiler")?
}

/// Metadata hash of `bytecode`, if it carries one.
pub fn run_hash(bytecode: &str) -> Option<String> {
    extract_metadata_hash(bytecode.trim()).map(str::to_string)
}

pub fn run_builds(args: &BuildsArgs) -> Result<Vec<CompilerBuild>> {
    let json = fs::read_to_string(&args.list)
        .with_context(|| format!("read build list {}", args.list.display()))?;
    let mut builds = parse_build_list(&json, &args.base_url)?;
    if args.releases_only {
        builds.retain(|build| build.is_release);
    }
    Ok(builds)
}

/// What a `saved` subcommand produced, for printing.
pub enum SavedOutcome {
    Listed(Vec<SavedEntry>),
    Saved(SavedEntry),
    Loaded { source: String, written_to: Option<String> },
    Deleted { id: String, name: String },
}

pub async fn run_saved(command: &SavedCommand, config: &AppConfig) -> Result<SavedOutcome> {
    let store = ContractStore::open(&config.store)?;
    match command {
        SavedCommand::List => Ok(SavedOutcome::Listed(store.list_async().await?)),
        SavedCommand::Save { name, file } => {
            let source = read_source(file)?;
            Ok(SavedOutcome::Saved(store.save_new(name, &source)?))
        }
        SavedCommand::Load { id, output } => {
            let contract = store.get(id)?;
            let written_to = match output {
                Some(path) => {
                    fs::write(path, &contract.sourcecode)
                        .with_context(|| format!("write {}", path.display()))?;
                    Some(path.display().to_string())
                }
                None => None,
            };
            Ok(SavedOutcome::Loaded {
                source: contract.sourcecode,
                written_to,
            })
        }
        SavedCommand::Delete { id } => {
            let removed = store.delete(id)?;
            Ok(SavedOutcome::Deleted {
                id: id.clone(),
                name: removed.name,
            })
        }
    }
}

pub fn run_snippets() -> Vec<Snippet> {
    snippets()
}

pub async fn run_draft(command: &DraftCommand, config: &AppConfig) -> Result<Option<String>> {
    let store = ContractStore::open(&config.store)?;
    match command {
        DraftCommand::Show => Ok(store.load_draft_async().await?),
        DraftCommand::Set { file } => {
            let source = read_source(file)?;
            store.save_draft_async(source).await?;
            Ok(None)
        }
        DraftCommand::Clear => {
            if !store.clear_draft()? {
                info!("no draft to clear");
            }
            Ok(None)
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scs_persistence::StoreConfig;
    use std::path::PathBuf;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            store: StoreConfig {
                root: Some(dir.to_path_buf()),
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_draft_set_show_clear() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let file = dir.path().join("token.sol");
        fs::write(&file, "contract Token {}").unwrap();

        run_draft(&DraftCommand::Set { file }, &config).await.unwrap();
        let shown = run_draft(&DraftCommand::Show, &config).await.unwrap();
        assert_eq!(shown.as_deref(), Some("contract Token {}"));

        run_draft(&DraftCommand::Clear, &config).await.unwrap();
        assert_eq!(run_draft(&DraftCommand::Show, &config).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_saved_save_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let file = dir.path().join("wallet.sol");
        fs::write(&file, "contract Wallet {}").unwrap();

        let command = SavedCommand::Save {
            name: "Wallet".to_string(),
            file,
        };
        let SavedOutcome::Saved(entry) = run_saved(&command, &config).await.unwrap() else {
            panic!("expected a saved entry");
        };
        let SavedOutcome::Listed(entries) = run_saved(&SavedCommand::List, &config).await.unwrap()
        else {
            panic!("expected a listing");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry.id);

        let load = SavedCommand::Load {
            id: entry.id.clone(),
            output: None::<PathBuf>,
        };
        let SavedOutcome::Loaded { source, written_to } = run_saved(&load, &config).await.unwrap()
        else {
            panic!("expected loaded source");
        };
        assert_eq!(source, "contract Wallet {}");
        assert_eq!(written_to, None);
    }
}
