//! Drives a [`ContractSession`] on a tokio task.
//!
//! The task is the only owner of the session. UI intents and backend
//! replies arrive on one mpsc queue, timers are the session's and split
//! pane's deadlines, and backend work runs on spawned tasks that report
//! back through the same queue. A compile superseded by a newer request is
//! aborted; its answer would be discarded anyway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scs_compiler::{BackendError, CompilerBackend, CompilerOutput};
use scs_model::{CompilerBuild, SavedContract};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::config::SessionConfig;
use crate::dispatcher::{CompileRequest, RequestId};
use crate::error::{Result, SessionError};
use crate::events::{EventBus, SessionEvent};
use crate::resize::{Bounds, SplitPane};
use crate::session::ContractSession;

/// Something a user (or the embedding UI) asks the session to do.
#[derive(Debug, Clone)]
pub enum Intent {
    LoadBuilds(Vec<CompilerBuild>),
    SelectBuild(usize),
    SelectLatestRelease,
    Edit(String),
    Import(String),
    CompileNow,
    ToggleOptimize,
    ToggleAutocompile,
    SelectContract(String),
    LoadContract(SavedContract),
    NewContract,
    MarkSaved {
        name: String,
        timestamp: DateTime<Utc>,
    },
    ResetWorker,
    ResizeStart,
    ResizeMove {
        x: f64,
        bounds: Bounds,
    },
    ResizeStop,
}

type Query = Box<dyn FnOnce(&ContractSession, &SplitPane) + Send>;

enum Message {
    Intent {
        intent: Intent,
        reply: oneshot::Sender<Result<()>>,
    },
    Query(Query),
    BuildLoaded {
        long_version: String,
        result: std::result::Result<(), BackendError>,
    },
    Compiled {
        request_id: RequestId,
        result: std::result::Result<CompilerOutput, BackendError>,
    },
    Shutdown,
}

/// Cloneable handle to a running session.
///
/// The session task stops when every handle is dropped or on
/// [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Message>,
    events: EventBus,
}

impl SessionHandle {
    /// Apply an intent and wait until the session has processed it.
    pub async fn send(&self, intent: Intent) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Message::Intent { intent, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?
    }

    /// Read session state on the session task.
    pub async fn query<T, F>(&self, read: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ContractSession, &SplitPane) -> T + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let query: Query = Box::new(move |session, pane| {
            let _ = reply.send(read(session, pane));
        });
        self.sender
            .send(Message::Query(query))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<crate::session::SessionSnapshot> {
        self.query(|session, _| session.snapshot()).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stop the session task. Pending backend work is aborted.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(Message::Shutdown).await;
    }
}

/// Start a session task compiling with `backend`.
pub fn spawn_session<B: CompilerBackend>(
    config: SessionConfig,
    backend: B,
) -> Result<(SessionHandle, JoinHandle<()>)> {
    config.validate()?;
    let (sender, receiver) = mpsc::channel(config.channel_capacity);
    let events = EventBus::new(config.channel_capacity);
    let runtime = SessionRuntime {
        session: ContractSession::with_event_bus(&config, events.clone()),
        pane: SplitPane::new(config.resize_interval()),
        backend: Arc::new(backend),
        receiver,
        replies: sender.downgrade(),
        compile_task: None,
        loading: Vec::new(),
    };
    let task = tokio::spawn(runtime.run());
    tracing::debug!("session task started");
    Ok((SessionHandle { sender, events }, task))
}

struct SessionRuntime<B> {
    session: ContractSession,
    pane: SplitPane,
    backend: Arc<B>,
    receiver: mpsc::Receiver<Message>,
    replies: mpsc::WeakSender<Message>,
    compile_task: Option<(RequestId, JoinHandle<()>)>,
    /// Long versions of builds currently being loaded.
    loading: Vec<String>,
}

impl<B: CompilerBackend> SessionRuntime<B> {
    async fn run(mut self) {
        loop {
            let deadline = earliest(self.session.next_deadline(), self.pane.deadline());
            let message = tokio::select! {
                message = self.receiver.recv() => message,
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.on_timer(Instant::now());
                    continue;
                }
            };
            match message {
                Some(Message::Shutdown) | None => break,
                Some(message) => self.handle(message),
            }
        }
        self.abort_compile();
        tracing::debug!("session task stopped");
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::Intent { intent, reply } => {
                let result = self.apply(intent);
                let _ = reply.send(result);
            }
            Message::Query(query) => query(&self.session, &self.pane),
            Message::BuildLoaded {
                long_version,
                result,
            } => self.on_build_loaded(&long_version, result),
            Message::Compiled { request_id, result } => {
                if self
                    .compile_task
                    .as_ref()
                    .is_some_and(|(id, _)| *id == request_id)
                {
                    self.compile_task = None;
                }
                match result {
                    Ok(output) => self.session.apply_output(request_id, output),
                    Err(error) => self.session.apply_failure(request_id, error),
                };
            }
            Message::Shutdown => {}
        }
    }

    fn apply(&mut self, intent: Intent) -> Result<()> {
        let now = Instant::now();
        match intent {
            Intent::LoadBuilds(builds) => self.session.load_builds(builds),
            Intent::SelectBuild(index) => {
                self.session.select_build(index)?;
                self.ensure_loaded(index);
            }
            Intent::SelectLatestRelease => {
                if let Some(index) = self.session.select_latest_release() {
                    self.ensure_loaded(index);
                }
            }
            Intent::Edit(text) => {
                self.session.edit_source(text, now);
            }
            Intent::Import(text) => {
                self.session.import_source(text, now);
            }
            Intent::CompileNow => {
                if let Ok(request) = self.session.compile_now() {
                    self.start_compile(request);
                }
            }
            Intent::ToggleOptimize => {
                self.session.toggle_optimize();
            }
            Intent::ToggleAutocompile => {
                self.session.toggle_autocompile();
            }
            Intent::SelectContract(name) => self.session.select_contract(&name)?,
            Intent::LoadContract(saved) => {
                self.abort_compile();
                self.session.load_contract(&saved, now);
            }
            Intent::NewContract => {
                self.abort_compile();
                self.session.new_contract();
            }
            Intent::MarkSaved { name, timestamp } => self.session.mark_saved(name, timestamp),
            Intent::ResetWorker => {
                self.session.reset_worker();
                if let Some(index) = self.session.registry().selected_index() {
                    self.ensure_loaded(index);
                }
            }
            Intent::ResizeStart => {
                self.pane.start_resize();
                self.publish_resize();
            }
            Intent::ResizeMove { x, bounds } => {
                if self.pane.pointer_move(x, bounds, now).is_some() {
                    self.publish_resize();
                }
            }
            Intent::ResizeStop => {
                self.pane.stop_resize();
                self.publish_resize();
            }
        }
        Ok(())
    }

    fn on_timer(&mut self, now: Instant) {
        if let Some(request) = self.session.poll(now) {
            self.start_compile(request);
        }
        if self.pane.poll(now).is_some() {
            self.publish_resize();
        }
    }

    fn start_compile(&mut self, request: CompileRequest) {
        self.abort_compile();
        let (Some(job), Some(replies)) = (self.session.compile_job(&request), self.replies.upgrade())
        else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let request_id = request.request_id;
        let task = tokio::spawn(async move {
            let result = backend.compile(job).await;
            let _ = replies.send(Message::Compiled { request_id, result }).await;
        });
        self.compile_task = Some((request_id, task));
    }

    fn abort_compile(&mut self) {
        if let Some((request_id, task)) = self.compile_task.take() {
            tracing::debug!(%request_id, "superseded compile aborted");
            task.abort();
        }
    }

    /// Ask the backend to load the build at `index` unless it is ready or
    /// already loading.
    fn ensure_loaded(&mut self, index: usize) {
        let Some(build) = self.session.registry().get(index) else {
            return;
        };
        if build.is_ready() || self.loading.contains(&build.long_version) {
            return;
        }
        let Some(replies) = self.replies.upgrade() else {
            return;
        };
        let build = build.clone();
        self.loading.push(build.long_version.clone());
        tracing::info!(version = %build.long_version, "loading compiler build");

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let result = backend.load(&build).await;
            let _ = replies
                .send(Message::BuildLoaded {
                    long_version: build.long_version,
                    result,
                })
                .await;
        });
    }

    fn on_build_loaded(
        &mut self,
        long_version: &str,
        result: std::result::Result<(), BackendError>,
    ) {
        self.loading.retain(|version| version != long_version);
        // The build list may have been replaced while loading, moving the
        // build to another index or dropping it
        let Some(index) = self
            .session
            .registry()
            .builds()
            .iter()
            .position(|build| build.long_version == long_version)
        else {
            tracing::debug!(version = long_version, "loaded build no longer listed");
            return;
        };
        match result {
            Ok(()) => {
                if let Err(error) = self.session.mark_build_ready(index, Instant::now()) {
                    tracing::warn!(%error, "could not mark build ready");
                }
            }
            Err(error) => self.session.set_worker_error(error),
        }
    }

    fn publish_resize(&self) {
        self.session.events().publish(SessionEvent::Resized {
            ratio: self.pane.ratio(),
            resizing: self.pane.is_resizing(),
        });
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
