//! In-process calculator surfaces for hosts without a real webview.
//!
//! A headless surface keeps its state in memory and, like the real
//! calculator, reports every state it is given back to the host as a change
//! notification.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use calcpanel_core::api::{
    Content, EditingSurface, SurfaceHandle, SurfaceLauncher, VariantConfig, VariantId,
};

/// Change notification sent from a surface to its host.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceNotification {
    pub handle: SurfaceHandle,
    pub content: Content,
}

pub struct HeadlessSurface {
    handle: SurfaceHandle,
    variant: VariantId,
    title: String,
    state: Mutex<Content>,
    notify: mpsc::UnboundedSender<SurfaceNotification>,
}

impl HeadlessSurface {
    pub fn new(
        handle: SurfaceHandle,
        variant: &VariantConfig,
        notify: mpsc::UnboundedSender<SurfaceNotification>,
    ) -> Self {
        Self {
            handle,
            variant: variant.id.clone(),
            title: variant.title.clone(),
            state: Mutex::new(Content::new(serde_json::json!({}))),
            notify,
        }
    }

    pub fn variant(&self) -> &VariantId {
        &self.variant
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the state as if the user edited it, notifying the host.
    pub fn edit(&self, content: Content) {
        self.store(content.clone());
        self.emit(content);
    }

    fn store(&self, content: Content) {
        match self.state.lock() {
            Ok(mut state) => *state = content,
            Err(poisoned) => *poisoned.into_inner() = content,
        }
    }

    fn emit(&self, content: Content) {
        let notification = SurfaceNotification {
            handle: self.handle.clone(),
            content,
        };
        if self.notify.send(notification).is_err() {
            tracing::debug!(handle = %self.handle, "host stopped listening");
        }
    }
}

#[async_trait]
impl EditingSurface for HeadlessSurface {
    fn handle(&self) -> SurfaceHandle {
        self.handle.clone()
    }

    async fn get_state(&self) -> Result<Content> {
        let state = match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Ok(state)
    }

    async fn set_state(&self, content: &Content) -> Result<()> {
        self.store(content.clone());
        self.emit(content.clone());
        Ok(())
    }
}

/// Launches headless surfaces whose notifications all go to one channel.
pub struct HeadlessLauncher {
    notify: mpsc::UnboundedSender<SurfaceNotification>,
    surfaces: Mutex<Vec<Arc<HeadlessSurface>>>,
}

impl HeadlessLauncher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceNotification>) {
        let (notify, rx) = mpsc::unbounded_channel();
        let launcher = Self {
            notify,
            surfaces: Mutex::new(Vec::new()),
        };
        (launcher, rx)
    }

    /// A surface this launcher created, if it is still known.
    pub fn surface(&self, handle: &SurfaceHandle) -> Option<Arc<HeadlessSurface>> {
        let surfaces = match self.surfaces.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.iter().find(|s| &s.handle == handle).cloned()
    }

    /// Drop a closed surface from the launcher's bookkeeping.
    pub fn forget(&self, handle: &SurfaceHandle) {
        let mut surfaces = match self.surfaces.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.retain(|s| &s.handle != handle);
    }
}

#[async_trait]
impl SurfaceLauncher for HeadlessLauncher {
    async fn launch(&self, variant: &VariantConfig) -> Result<Arc<dyn EditingSurface>> {
        let surface = Arc::new(HeadlessSurface::new(
            SurfaceHandle::generate(),
            variant,
            self.notify.clone(),
        ));
        // Nothing runs the script headlessly; it is only reported.
        tracing::debug!(
            handle = %surface.handle,
            variant = %variant.id,
            script = %variant.script,
            "headless surface launched"
        );
        let mut surfaces = match self.surfaces.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        surfaces.push(Arc::clone(&surface));
        Ok(surface)
    }
}
