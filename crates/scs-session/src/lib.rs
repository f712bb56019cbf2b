//! Contract session state and compile orchestration.
//!
//! The [`ContractSession`] is a synchronous state machine: every operation
//! takes the current time explicitly and returns what the caller has to do
//! next (a [`CompileRequest`] to hand to a backend, a deadline to wake up
//! at). The [`runtime`] module drives it on a tokio task against a
//! [`CompilerBackend`](scs_compiler::CompilerBackend).

pub mod config;
pub mod debounce;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod registry;
pub mod resize;
pub mod runtime;
pub mod session;

pub use config::SessionConfig;
pub use debounce::{Debouncer, Throttle};
pub use dispatcher::{CompileRequest, DispatchPhase, Dispatcher, NoDispatch, RequestId};
pub use error::{Result, SessionError};
pub use events::{EventBus, SessionEvent};
pub use registry::BuildRegistry;
pub use resize::{Bounds, SplitPane};
pub use runtime::{Intent, SessionHandle, spawn_session};
pub use session::{ContractSession, EditorView, SessionSnapshot};
