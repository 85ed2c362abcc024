//! Session state tracking
//!
//! Every open calculator surface has a [`Session`] recording its live content
//! and the two baselines (last save, last import) that decide whether the
//! content is unsaved. The [`PanelManager`] owns the sessions, indexes them by
//! surface handle through the [`SessionRegistry`], and commits unsaved
//! content to the recovery log when a surface is disposed.

pub mod manager;
pub mod registry;
pub mod session;
pub mod transitions;
pub mod types;

pub use manager::PanelManager;
pub use registry::SessionRegistry;
pub use session::Session;
pub use transitions::{DirtyState, DisposeAction, SessionPhase, StateTransition, TransitionError};
pub use types::{PanelEvent, SessionId, SessionView, SurfaceHandle};
