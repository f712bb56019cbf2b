//! The contract session: one document, its compiled artifacts and the
//! selection state around them.
//!
//! [`ContractSession`] is the single mutator of all of this state. It is
//! synchronous; operations that can start timed work take `now` and report
//! the deadline or [`CompileRequest`] the caller must act on.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use scs_compiler::{BackendError, CompileJob, CompilerOutput, normalize};
use scs_model::{
    CompilerBuild, ContractSet, DeploymentPayload, Diagnostic, DiagnosticCounts, SavePayload,
    SavedContract,
};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::dispatcher::{CompileRequest, DispatchPhase, Dispatcher, NoDispatch, RequestId};
use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::registry::BuildRegistry;

static FILENAME_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-z0-9]+").expect("Invalid filename separator regex"));

const DEFAULT_EXPORT_FILENAME: &str = "contract.sol";

#[derive(Debug, Clone, Default)]
struct SourceDocument {
    text: String,
    dirty: bool,
}

#[derive(Debug, Clone)]
struct SavedInfo {
    name: String,
    timestamp: DateTime<Utc>,
}

/// What the editor widget shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorView {
    pub text: String,
    /// Diagnostics not attributed to a named source.
    pub annotations: Vec<Diagnostic>,
}

/// A read-only copy of everything observers render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub sourcecode: String,
    pub dirty: bool,
    pub builds: Vec<CompilerBuild>,
    pub selected_build: Option<usize>,
    /// The selected build is still being loaded.
    pub loading: bool,
    pub phase: DispatchPhase,
    pub compiling: bool,
    pub autocompile: bool,
    pub optimize: bool,
    pub contracts: Option<ContractSet>,
    pub selected_contract: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub counts: DiagnosticCounts,
    pub saved_name: Option<String>,
    pub saved_timestamp: Option<DateTime<Utc>>,
    pub worker_error: Option<String>,
    pub latest_request: Option<RequestId>,
}

#[derive(Debug)]
pub struct ContractSession {
    document: SourceDocument,
    registry: BuildRegistry,
    dispatcher: Dispatcher,
    contracts: Option<ContractSet>,
    selected_contract: Option<String>,
    diagnostics: Vec<Diagnostic>,
    autocompile: bool,
    optimize: bool,
    saved: Option<SavedInfo>,
    worker_error: Option<BackendError>,
    events: EventBus,
}

impl ContractSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_event_bus(config, EventBus::new(config.channel_capacity))
    }

    /// Create a session publishing on an existing bus.
    pub fn with_event_bus(config: &SessionConfig, events: EventBus) -> Self {
        Self {
            document: SourceDocument::default(),
            registry: BuildRegistry::new(),
            dispatcher: Dispatcher::new(config.debounce()),
            contracts: None,
            selected_contract: None,
            diagnostics: Vec::new(),
            autocompile: config.autocompile,
            optimize: config.optimize,
            saved: None,
            worker_error: None,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ---- document ----

    /// Replace the document text after an edit.
    ///
    /// With autocompile on, returns the restarted debounce deadline.
    pub fn edit_source(&mut self, text: impl Into<String>, now: Instant) -> Option<Instant> {
        self.document.text = text.into();
        self.document.dirty = true;
        self.events
            .publish(SessionEvent::SourceChanged { dirty: true });
        self.schedule_autocompile(now)
    }

    /// Replace the document text with imported source. Behaves like an edit.
    pub fn import_source(&mut self, text: impl Into<String>, now: Instant) -> Option<Instant> {
        let text = text.into();
        tracing::info!(bytes = text.len(), "source imported");
        self.edit_source(text, now)
    }

    pub fn text(&self) -> &str {
        &self.document.text
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.document.dirty
    }

    // ---- builds ----

    pub fn load_builds(&mut self, builds: Vec<CompilerBuild>) {
        let count = builds.len();
        self.registry.load(builds);
        tracing::debug!(count, "compiler builds loaded");
        self.events.publish(SessionEvent::BuildsLoaded { count });
    }

    pub fn registry(&self) -> &BuildRegistry {
        &self.registry
    }

    /// Select a build. Never compiles by itself.
    pub fn select_build(&mut self, index: usize) -> Result<()> {
        self.registry.select(index)?;
        if let Some(build) = self.registry.selected_build() {
            tracing::info!(index, version = %build.long_version, "compiler build selected");
        }
        self.events.publish(SessionEvent::BuildSelected { index });
        Ok(())
    }

    /// Select the newest release build, if any build is loaded.
    pub fn select_latest_release(&mut self) -> Option<usize> {
        let index = self.registry.select_latest_release()?;
        self.events.publish(SessionEvent::BuildSelected { index });
        Some(index)
    }

    /// Record that the backend has loaded the build at `index`.
    ///
    /// When that build is the selected one and there is source to compile,
    /// an automatic compile is scheduled.
    pub fn mark_build_ready(&mut self, index: usize, now: Instant) -> Result<Option<Instant>> {
        if !self.registry.mark_ready(index)? {
            return Ok(None);
        }
        self.events.publish(SessionEvent::BuildReady { index });
        if self.registry.selected_index() == Some(index) && !self.document.text.is_empty() {
            return Ok(self.schedule_autocompile(now));
        }
        Ok(None)
    }

    /// Whether the selected build is still loading.
    pub fn is_loading(&self) -> bool {
        self.registry
            .selected_build()
            .is_some_and(|build| !build.is_ready())
    }

    // ---- options ----

    pub fn toggle_optimize(&mut self) -> bool {
        self.optimize = !self.optimize;
        self.publish_options();
        self.optimize
    }

    /// Flip autocompile. Turning it off drops a pending automatic compile.
    pub fn toggle_autocompile(&mut self) -> bool {
        self.autocompile = !self.autocompile;
        if !self.autocompile {
            self.dispatcher.cancel_debounce();
        }
        self.publish_options();
        self.autocompile
    }

    #[inline]
    pub fn optimize(&self) -> bool {
        self.optimize
    }

    #[inline]
    pub fn autocompile(&self) -> bool {
        self.autocompile
    }

    // ---- compiling ----

    /// Compile the current text now, bypassing the debounce.
    pub fn compile_now(&mut self) -> std::result::Result<CompileRequest, NoDispatch> {
        self.dispatch()
    }

    /// Dispatch the debounced compile if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<CompileRequest> {
        if self.dispatcher.debounce_due(now) {
            self.dispatch().ok()
        } else {
            None
        }
    }

    /// The next instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dispatcher.debounce_deadline()
    }

    /// The backend job for `request`.
    pub fn compile_job(&self, request: &CompileRequest) -> Option<CompileJob> {
        let build = self.registry.get(request.build_index)?;
        Some(CompileJob {
            source_text: request.source_text.clone(),
            build: build.clone(),
            optimize: request.optimize,
        })
    }

    /// Apply a backend answer. Returns `false` when the answer was stale.
    pub fn apply_output(&mut self, request_id: RequestId, output: CompilerOutput) -> bool {
        let Some(request) = self.dispatcher.accept(request_id) else {
            return false;
        };

        let has_errors = output.has_errors();
        let diagnostics = normalize(&output.diagnostics, &request.source_text);
        let counts = DiagnosticCounts::from_diagnostics(&diagnostics);
        let contracts = if output.contracts.is_empty() && has_errors {
            None
        } else {
            Some(output.contracts)
        };

        let previous = self.selected_contract.take();
        self.selected_contract = contracts.as_ref().and_then(|set| {
            previous
                .as_deref()
                .filter(|name| set.contains(name))
                .or_else(|| set.first_name())
                .map(str::to_string)
        });
        let contract_count = contracts.as_ref().map_or(0, ContractSet::len);
        self.contracts = contracts;
        self.diagnostics = diagnostics;

        tracing::info!(
            %request_id,
            contracts = contract_count,
            errors = counts.errors,
            warnings = counts.warnings,
            "compile finished"
        );
        self.events.publish(SessionEvent::CompileFinished {
            request_id,
            contracts: contract_count,
            errors: counts.errors,
            warnings: counts.warnings,
        });
        if self.selected_contract != previous {
            self.events.publish(SessionEvent::ContractSelected {
                name: self.selected_contract.clone(),
            });
        }
        true
    }

    /// Apply a backend failure. Returns `false` when the answer was stale.
    ///
    /// Compiled artifacts are kept; diagnostics are cleared and compiles
    /// stay blocked until [`reset_worker`](Self::reset_worker).
    pub fn apply_failure(&mut self, request_id: RequestId, error: BackendError) -> bool {
        if self.dispatcher.fail(request_id).is_none() {
            return false;
        }
        tracing::warn!(%request_id, error = %error, "compile failed");
        self.diagnostics.clear();
        self.worker_error = Some(error.clone());
        self.events
            .publish(SessionEvent::CompileFailed { request_id, error });
        true
    }

    /// Record a backend failure outside of a compile, e.g. a build that
    /// could not be loaded.
    pub fn set_worker_error(&mut self, error: BackendError) {
        tracing::warn!(error = %error, "compiler worker failed");
        self.worker_error = Some(error.clone());
        self.events.publish(SessionEvent::WorkerFailed { error });
    }

    /// Clear the worker error so compiles can run again.
    pub fn reset_worker(&mut self) {
        if self.worker_error.take().is_some() {
            tracing::info!("compiler worker reset");
        }
        self.events.publish(SessionEvent::WorkerReset);
    }

    pub fn worker_error(&self) -> Option<&BackendError> {
        self.worker_error.as_ref()
    }

    #[inline]
    pub fn is_compiling(&self) -> bool {
        self.dispatcher.is_compiling()
    }

    #[inline]
    pub fn phase(&self) -> DispatchPhase {
        self.dispatcher.phase()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ---- artifacts ----

    pub fn contracts(&self) -> Option<&ContractSet> {
        self.contracts.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn selected_contract(&self) -> Option<&str> {
        self.selected_contract.as_deref()
    }

    pub fn select_contract(&mut self, name: &str) -> Result<()> {
        let known = self
            .contracts
            .as_ref()
            .is_some_and(|set| set.contains(name));
        if !known {
            return Err(SessionError::UnknownContract(name.to_string()));
        }
        self.selected_contract = Some(name.to_string());
        self.events.publish(SessionEvent::ContractSelected {
            name: Some(name.to_string()),
        });
        Ok(())
    }

    /// What the deploy dialog needs, when a contract is selected.
    pub fn deployment_payload(&self) -> Option<DeploymentPayload> {
        let name = self.selected_contract.as_deref()?;
        let contract = self.contracts.as_ref()?.get(name)?;
        Some(DeploymentPayload {
            abi: contract.abi_interface.clone(),
            bytecode_with_prefix: contract.bytecode_with_prefix(),
            sourcecode: self.document.text.clone(),
        })
    }

    // ---- persistence ----

    /// Replace the session with a saved contract.
    ///
    /// The outstanding compile is abandoned so its answer cannot populate
    /// the cleared state. With autocompile on, returns the deadline of the
    /// compile scheduled for the loaded source.
    pub fn load_contract(&mut self, saved: &SavedContract, now: Instant) -> Option<Instant> {
        self.dispatcher.invalidate();
        self.document = SourceDocument {
            text: saved.sourcecode.clone(),
            dirty: false,
        };
        self.saved = Some(SavedInfo {
            name: saved.name.clone(),
            timestamp: saved.timestamp,
        });
        self.clear_compiled();
        tracing::info!(name = %saved.name, "contract loaded");
        self.events.publish(SessionEvent::ContractLoaded {
            name: saved.name.clone(),
        });
        self.schedule_autocompile(now)
    }

    /// Start over with an empty document.
    pub fn new_contract(&mut self) {
        self.dispatcher.invalidate();
        self.document = SourceDocument::default();
        self.saved = None;
        self.clear_compiled();
        self.events.publish(SessionEvent::ContractCleared);
    }

    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            sourcecode: self.document.text.clone(),
            name: self.saved.as_ref().map(|saved| saved.name.clone()),
        }
    }

    /// Record a completed save of the current document.
    pub fn mark_saved(&mut self, name: impl Into<String>, timestamp: DateTime<Utc>) {
        let name = name.into();
        self.document.dirty = false;
        self.saved = Some(SavedInfo {
            name: name.clone(),
            timestamp,
        });
        self.events.publish(SessionEvent::Saved { name });
    }

    pub fn saved_name(&self) -> Option<&str> {
        self.saved.as_ref().map(|saved| saved.name.as_str())
    }

    pub fn saved_timestamp(&self) -> Option<DateTime<Utc>> {
        self.saved.as_ref().map(|saved| saved.timestamp)
    }

    /// File name for exporting the source, derived from the saved name.
    pub fn export_filename(&self) -> String {
        let Some(name) = self.saved_name().filter(|name| !name.is_empty()) else {
            return DEFAULT_EXPORT_FILENAME.to_string();
        };
        let replaced = FILENAME_SEPARATOR_REGEX.replace_all(name, "-");
        let slug = replaced.strip_suffix('-').unwrap_or(&replaced).to_lowercase();
        if slug.is_empty() {
            DEFAULT_EXPORT_FILENAME.to_string()
        } else if slug.ends_with(".sol") {
            slug
        } else {
            format!("{slug}.sol")
        }
    }

    // ---- views ----

    pub fn editor_view(&self) -> EditorView {
        EditorView {
            text: self.document.text.clone(),
            annotations: self
                .diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.is_annotation())
                .cloned()
                .collect(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            sourcecode: self.document.text.clone(),
            dirty: self.document.dirty,
            builds: self.registry.builds().to_vec(),
            selected_build: self.registry.selected_index(),
            loading: self.is_loading(),
            phase: self.dispatcher.phase(),
            compiling: self.dispatcher.is_compiling(),
            autocompile: self.autocompile,
            optimize: self.optimize,
            contracts: self.contracts.clone(),
            selected_contract: self.selected_contract.clone(),
            diagnostics: self.diagnostics.clone(),
            counts: DiagnosticCounts::from_diagnostics(&self.diagnostics),
            saved_name: self.saved_name().map(str::to_string),
            saved_timestamp: self.saved_timestamp(),
            worker_error: self.worker_error.as_ref().map(ToString::to_string),
            latest_request: self.dispatcher.latest_issued(),
        }
    }

    // ---- internals ----

    fn schedule_autocompile(&mut self, now: Instant) -> Option<Instant> {
        if !self.autocompile {
            return None;
        }
        let deadline = self.dispatcher.schedule(now);
        self.events.publish(SessionEvent::CompileScheduled);
        Some(deadline)
    }

    fn dispatch(&mut self) -> std::result::Result<CompileRequest, NoDispatch> {
        let result = self.dispatcher.dispatch(
            &self.registry,
            self.worker_error.is_some(),
            &self.document.text,
            self.optimize,
        );
        match &result {
            Ok(request) => self.events.publish(SessionEvent::CompileStarted {
                request_id: request.request_id,
                build_index: request.build_index,
            }),
            Err(reason) => self
                .events
                .publish(SessionEvent::CompileSkipped { reason: *reason }),
        }
        result
    }

    fn clear_compiled(&mut self) {
        self.contracts = None;
        self.selected_contract = None;
        self.diagnostics.clear();
    }

    fn publish_options(&self) {
        self.events.publish(SessionEvent::OptionsChanged {
            optimize: self.optimize,
            autocompile: self.autocompile,
        });
    }
}
