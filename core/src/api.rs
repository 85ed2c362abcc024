//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `calcpanel_core::api` instead of reaching into internal modules.

pub use crate::commands::{CloseOutcome, CommandOutcome, Commands};
pub use crate::config::{
    load_default, AppConfig, LoggingConfig, PanelConfig, RecoveryConfig, VariantConfig,
};
pub use crate::content::{Content, VariantId};
pub use crate::error::{CliError, PanelError};
pub use crate::recovery::{DurableStore, MemoryStore, RecoveryEntry, RecoveryStore};
pub use crate::recovery::store::RecoveryListing;
pub use crate::state::{
    DirtyState, PanelEvent, PanelManager, SessionId, SessionView, SurfaceHandle,
};
pub use crate::surface::{EditingSurface, Interaction, SaveRequest, SurfaceLauncher};
