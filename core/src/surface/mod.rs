//! Collaborators the panel manager talks to: the calculator surfaces
//! themselves and the user-facing dialogs.

pub mod interaction;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::VariantConfig;
use crate::content::Content;
use crate::state::types::SurfaceHandle;

pub use interaction::{Interaction, SaveRequest};

/// A live calculator instance embedded in the host.
#[async_trait]
pub trait EditingSurface: Send + Sync {
    fn handle(&self) -> SurfaceHandle;
    /// Current exportable state of the calculator.
    async fn get_state(&self) -> anyhow::Result<Content>;
    /// Replace the calculator state. Surfaces report the result back through
    /// a regular change notification.
    async fn set_state(&self, content: &Content) -> anyhow::Result<()>;
}

/// Opens new surfaces for a variant (fresh panels, recovered panels). The
/// variant's title and script say what to show and what to load.
#[async_trait]
pub trait SurfaceLauncher: Send + Sync {
    async fn launch(&self, variant: &VariantConfig) -> anyhow::Result<Arc<dyn EditingSurface>>;
}
