//! Typed change notifications.
//!
//! Every session mutation publishes one [`SessionEvent`]. Observers
//! subscribe to an [`EventBus`] and re-read whatever state they render;
//! the session itself never renders.

use scs_compiler::BackendError;
use tokio::sync::broadcast;

use crate::dispatcher::{NoDispatch, RequestId};

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionEvent {
    /// The document text changed.
    SourceChanged { dirty: bool },

    /// A new build list replaced the old one.
    BuildsLoaded { count: usize },

    BuildSelected { index: usize },

    /// The backend finished loading a build.
    BuildReady { index: usize },

    OptionsChanged { optimize: bool, autocompile: bool },

    /// An automatic compile is waiting for the editor to go quiet.
    CompileScheduled,

    CompileStarted { request_id: RequestId, build_index: usize },

    /// A compile intent was ignored.
    CompileSkipped { reason: NoDispatch },

    CompileFinished {
        request_id: RequestId,
        contracts: usize,
        errors: usize,
        warnings: usize,
    },

    CompileFailed { request_id: RequestId, error: BackendError },

    ContractSelected { name: Option<String> },

    /// A saved contract replaced the document.
    ContractLoaded { name: String },

    /// The document and compiled state were reset.
    ContractCleared,

    Saved { name: String },

    WorkerFailed { error: BackendError },

    WorkerReset,

    /// The split-pane ratio or drag state changed.
    Resized { ratio: f64, resizing: bool },
}

/// Broadcast channel for [`SessionEvent`]s.
///
/// Cloning yields another handle to the same channel. Publishing never
/// blocks; slow subscribers observe `Lagged` and should resynchronise from
/// a snapshot.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::trace!(?event, "session event");
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
