//! Compile dispatch: debouncing, request correlation and stale-response
//! rejection.
//!
//! The dispatcher owns one debounce deadline and the id of the one request
//! whose answer it will still accept. Every dispatch mints a strictly
//! larger [`RequestId`]; an answer carrying any other id is discarded, so
//! out-of-order answers can never overwrite newer state.
//!
//! [`DispatchPhase::Succeeded`] and [`DispatchPhase::Failed`] are resting
//! phases: they record how the last compile ended and otherwise behave
//! exactly like [`DispatchPhase::Idle`]. The next edit moves on to
//! `Debouncing`, an explicit compile to `Compiling`.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::debounce::Debouncer;
use crate::registry::BuildRegistry;

/// Monotonic correlation id of a compile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One compile, as handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub request_id: RequestId,
    pub source_text: String,
    pub build_index: usize,
    pub optimize: bool,
}

/// Where the dispatcher is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPhase {
    #[default]
    Idle,
    Debouncing,
    Compiling,
    Succeeded,
    Failed,
}

/// Why a compile intent did not produce a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoDispatch {
    #[error("no compiler build is selected")]
    NoBuildSelected,

    #[error("compiler build {index} is still loading")]
    BuildNotReady { index: usize },

    #[error("the compiler worker has failed")]
    WorkerError,
}

/// Debounce plus latest-request-wins bookkeeping.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    phase: DispatchPhase,
    debouncer: Debouncer,
    last_issued: u64,
    outstanding: Option<CompileRequest>,
}

impl Dispatcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            phase: DispatchPhase::Idle,
            debouncer: Debouncer::new(debounce),
            last_issued: 0,
            outstanding: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Whether a request is awaiting its answer.
    #[inline]
    pub fn is_compiling(&self) -> bool {
        self.outstanding.is_some()
    }

    /// The request whose answer will be accepted, if any.
    pub fn outstanding(&self) -> Option<&CompileRequest> {
        self.outstanding.as_ref()
    }

    /// The most recently minted id, even if its answer already arrived.
    pub fn latest_issued(&self) -> Option<RequestId> {
        (self.last_issued > 0).then_some(RequestId(self.last_issued))
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Restart the debounce window from `now`.
    pub fn schedule(&mut self, now: Instant) -> Instant {
        self.phase = DispatchPhase::Debouncing;
        self.debouncer.schedule(now)
    }

    /// Drop a pending debounce. Returns whether one was pending.
    pub fn cancel_debounce(&mut self) -> bool {
        let cancelled = self.debouncer.cancel();
        if cancelled && self.phase == DispatchPhase::Debouncing {
            self.phase = self.resting_phase();
        }
        cancelled
    }

    /// Consume the debounce deadline if it has elapsed.
    pub fn debounce_due(&mut self, now: Instant) -> bool {
        self.debouncer.fire_if_due(now)
    }

    /// Mint a request for `source_text` against the selected build.
    ///
    /// Any pending debounce is consumed either way. When the registry or a
    /// worker failure rules the compile out, nothing is minted and the
    /// reason is returned.
    pub fn dispatch(
        &mut self,
        registry: &BuildRegistry,
        worker_failed: bool,
        source_text: &str,
        optimize: bool,
    ) -> Result<CompileRequest, NoDispatch> {
        self.debouncer.cancel();

        let check = match registry.selected_index() {
            _ if worker_failed => Err(NoDispatch::WorkerError),
            None => Err(NoDispatch::NoBuildSelected),
            Some(index) if !registry.is_selected_ready() => Err(NoDispatch::BuildNotReady { index }),
            Some(index) => Ok(index),
        };
        let build_index = match check {
            Ok(index) => index,
            Err(reason) => {
                self.phase = self.resting_phase();
                tracing::debug!(%reason, "compile not dispatched");
                return Err(reason);
            }
        };

        self.last_issued += 1;
        let request = CompileRequest {
            request_id: RequestId(self.last_issued),
            source_text: source_text.to_string(),
            build_index,
            optimize,
        };
        tracing::debug!(request_id = %request.request_id, build_index, "compile dispatched");
        self.outstanding = Some(request.clone());
        self.phase = DispatchPhase::Compiling;
        Ok(request)
    }

    /// Accept a successful answer for `request_id`.
    ///
    /// Returns the originating request, or `None` when the answer is stale.
    pub fn accept(&mut self, request_id: RequestId) -> Option<CompileRequest> {
        let request = self.take_outstanding(request_id)?;
        self.phase = self.settled_phase(DispatchPhase::Succeeded);
        Some(request)
    }

    /// Accept a failed answer for `request_id`.
    pub fn fail(&mut self, request_id: RequestId) -> Option<CompileRequest> {
        let request = self.take_outstanding(request_id)?;
        self.phase = self.settled_phase(DispatchPhase::Failed);
        Some(request)
    }

    /// Stop waiting for the outstanding request and any pending debounce.
    ///
    /// Ids keep increasing, so an answer to the abandoned request stays
    /// stale forever.
    pub fn invalidate(&mut self) {
        if let Some(request) = self.outstanding.take() {
            tracing::debug!(request_id = %request.request_id, "outstanding compile invalidated");
        }
        self.debouncer.cancel();
        self.phase = DispatchPhase::Idle;
    }

    fn take_outstanding(&mut self, request_id: RequestId) -> Option<CompileRequest> {
        match &self.outstanding {
            Some(request) if request.request_id == request_id => self.outstanding.take(),
            _ => {
                tracing::trace!(%request_id, latest = ?self.latest_issued(), "stale compile answer discarded");
                None
            }
        }
    }

    fn settled_phase(&self, settled: DispatchPhase) -> DispatchPhase {
        if self.debouncer.is_pending() {
            DispatchPhase::Debouncing
        } else {
            settled
        }
    }

    fn resting_phase(&self) -> DispatchPhase {
        if self.outstanding.is_some() {
            DispatchPhase::Compiling
        } else {
            DispatchPhase::Idle
        }
    }
}
