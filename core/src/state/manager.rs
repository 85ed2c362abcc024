//! Lifecycle controller: owns every open session and decides when unsaved
//! content goes to the recovery log.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::registry::{RegistryEntry, SessionRegistry};
use super::session::Session;
use super::transitions::{DirtyState, DisposeAction, StateTransition};
use super::types::{PanelEvent, SessionId, SessionView, SurfaceHandle};
use crate::config::PanelConfig;
use crate::content::{Content, VariantId};
use crate::error::PanelError;
use crate::recovery::{RecoveryEntry, RecoveryStore};
use crate::surface::{EditingSurface, SurfaceLauncher};

#[derive(Clone)]
pub struct PanelManager {
    inner: Arc<PanelManagerInner>,
}

/// Lock order is registry, then sessions. Neither lock is held across a
/// surface or store call.
struct PanelManagerInner {
    registry: RwLock<SessionRegistry>,
    sessions: RwLock<HashMap<SessionId, Session>>,
    recovery: Arc<RecoveryStore>,
    launcher: Arc<dyn SurfaceLauncher>,
    panel: PanelConfig,
    event_tx: broadcast::Sender<PanelEvent>,
}

impl PanelManager {
    pub fn new(
        recovery: Arc<RecoveryStore>,
        launcher: Arc<dyn SurfaceLauncher>,
        panel: PanelConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(1000);

        let inner = PanelManagerInner {
            registry: RwLock::new(SessionRegistry::new()),
            sessions: RwLock::new(HashMap::new()),
            recovery,
            launcher,
            panel,
            event_tx,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit(&self, event: PanelEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    pub fn recovery(&self) -> &RecoveryStore {
        &self.inner.recovery
    }

    pub fn panel_config(&self) -> &PanelConfig {
        &self.inner.panel
    }

    /// Launch a fresh surface of `variant` and start tracking it.
    #[tracing::instrument(name = "panel.open", skip(self))]
    pub async fn open(&self, variant: &VariantId) -> Result<SurfaceHandle, PanelError> {
        let config = self
            .inner
            .panel
            .variant(variant)
            .ok_or_else(|| PanelError::UnknownVariant(variant.clone()))?;
        let surface = self
            .inner
            .launcher
            .launch(config)
            .await
            .map_err(PanelError::Surface)?;
        self.attach(surface, variant.clone()).await
    }

    /// Track a surface the host created itself.
    pub async fn attach(
        &self,
        surface: Arc<dyn EditingSurface>,
        variant: VariantId,
    ) -> Result<SurfaceHandle, PanelError> {
        self.insert_session(surface, Session::new(variant), false)
            .await
    }

    async fn insert_session(
        &self,
        surface: Arc<dyn EditingSurface>,
        session: Session,
        restored: bool,
    ) -> Result<SurfaceHandle, PanelError> {
        let handle = surface.handle();
        let variant = session.variant().clone();
        {
            let mut registry = self.inner.registry.write().await;
            registry.register(handle.clone(), session.id(), surface)?;
            let mut sessions = self.inner.sessions.write().await;
            sessions.insert(session.id(), session);
        }
        tracing::debug!(handle = %handle, variant = %variant, restored, "session opened");
        self.emit(PanelEvent::SessionOpened {
            handle: handle.clone(),
            variant,
            restored,
            timestamp: Utc::now(),
        });
        Ok(handle)
    }

    /// Apply `f` to the session behind `handle` and report the state change.
    async fn update_session<F>(&self, handle: &SurfaceHandle, f: F) -> Result<DirtyState, PanelError>
    where
        F: FnOnce(&mut Session),
    {
        let (old, new) = {
            let registry = self.inner.registry.read().await;
            let id = registry
                .session_id(handle)
                .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
            let mut sessions = self.inner.sessions.write().await;
            let session = sessions
                .get_mut(&id)
                .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
            let old = session.dirty_state();
            f(session);
            (old, session.dirty_state())
        };
        if old != new {
            tracing::debug!(
                handle = %handle,
                "{} -> {}",
                StateTransition::describe(old),
                StateTransition::describe(new)
            );
            self.emit(PanelEvent::DirtyStateChanged {
                handle: handle.clone(),
                old,
                new,
                timestamp: Utc::now(),
            });
        }
        Ok(new)
    }

    /// Change notification from the surface.
    pub async fn change(
        &self,
        handle: &SurfaceHandle,
        content: Content,
    ) -> Result<DirtyState, PanelError> {
        self.update_session(handle, |s| s.on_change(content)).await
    }

    /// Explicit save: `content` becomes the saved baseline.
    #[tracing::instrument(name = "panel.save", skip(self, content))]
    pub async fn save(
        &self,
        handle: &SurfaceHandle,
        content: Content,
    ) -> Result<DirtyState, PanelError> {
        let state = self.update_session(handle, |s| s.on_save(content)).await?;
        self.emit(PanelEvent::Saved {
            handle: handle.clone(),
            timestamp: Utc::now(),
        });
        Ok(state)
    }

    /// Explicit import: `content` becomes the imported baseline and is pushed
    /// into the surface.
    #[tracing::instrument(name = "panel.import", skip(self, content))]
    pub async fn import(&self, handle: &SurfaceHandle, content: Content) -> Result<(), PanelError> {
        let surface = self.surface(handle).await?;
        self.update_session(handle, |s| s.on_import(content.clone()))
            .await?;
        self.emit(PanelEvent::Imported {
            handle: handle.clone(),
            timestamp: Utc::now(),
        });
        surface
            .set_state(&content)
            .await
            .map_err(PanelError::Surface)
    }

    pub async fn set_visible(&self, handle: &SurfaceHandle, visible: bool) -> Result<(), PanelError> {
        self.inner
            .registry
            .write()
            .await
            .set_visible(handle, visible)
    }

    pub async fn focus(&self, handle: &SurfaceHandle) -> Result<(), PanelError> {
        self.inner.registry.write().await.focus(handle)
    }

    pub async fn surface(
        &self,
        handle: &SurfaceHandle,
    ) -> Result<Arc<dyn EditingSurface>, PanelError> {
        self.inner
            .registry
            .read()
            .await
            .surface(handle)
            .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))
    }

    pub async fn session(&self, handle: &SurfaceHandle) -> Result<SessionView, PanelError> {
        let registry = self.inner.registry.read().await;
        let id = registry
            .session_id(handle)
            .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| view(handle.clone(), s))
            .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))
    }

    /// Open sessions in the order their surfaces were registered.
    pub async fn sessions(&self) -> Vec<SessionView> {
        let registry = self.inner.registry.read().await;
        let sessions = self.inner.sessions.read().await;
        registry
            .handles()
            .into_iter()
            .filter_map(|h| {
                let id = registry.session_id(&h)?;
                sessions.get(&id).map(|s| view(h, s))
            })
            .collect()
    }

    /// The session whose surface the user is looking at.
    pub async fn active_session(&self) -> Option<SessionView> {
        let registry = self.inner.registry.read().await;
        let (handle, id) = registry.active()?;
        let sessions = self.inner.sessions.read().await;
        sessions.get(&id).map(|s| view(handle, s))
    }

    /// Release the session behind `handle`. Dirty sessions leave a recovery
    /// entry, which is returned.
    ///
    /// If the entry cannot be stored the session stays open and the error is
    /// returned, so the dispose can be retried.
    #[tracing::instrument(name = "panel.dispose", skip(self))]
    pub async fn dispose(
        &self,
        handle: &SurfaceHandle,
    ) -> Result<Option<RecoveryEntry>, PanelError> {
        let (slot, session) = {
            let mut registry = self.inner.registry.write().await;
            let slot = registry
                .take(handle)
                .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
            let mut sessions = self.inner.sessions.write().await;
            let session = sessions
                .remove(&slot.session_id())
                .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
            (slot, session)
        };

        let entry = match self.record_unsaved(handle, &session).await {
            Ok(entry) => entry,
            Err(e) => {
                self.reinstate(handle, slot, session).await;
                return Err(e);
            }
        };

        self.emit(PanelEvent::SessionClosed {
            handle: handle.clone(),
            recorded: entry.is_some(),
            timestamp: Utc::now(),
        });
        Ok(entry)
    }

    /// Store the session's unsaved content, if any.
    async fn record_unsaved(
        &self,
        handle: &SurfaceHandle,
        session: &Session,
    ) -> Result<Option<RecoveryEntry>, PanelError> {
        let action = StateTransition::on_dispose(session.dirty_state());
        let mut closing = session.clone();
        let unsaved = closing.close()?;

        let (DisposeAction::Record, Some(content)) = (action, unsaved) else {
            return Ok(None);
        };
        let entry = RecoveryEntry::new(session.variant().clone(), content);
        let len = self.inner.recovery.append(&entry).await?;
        tracing::info!(
            handle = %handle,
            variant = %entry.variant,
            stored = len,
            "unsaved work kept for recovery"
        );
        self.emit(PanelEvent::SnapshotRecorded {
            handle: handle.clone(),
            variant: entry.variant.clone(),
            timestamp: entry.timestamp,
        });
        Ok(Some(entry))
    }

    async fn reinstate(&self, handle: &SurfaceHandle, slot: RegistryEntry, session: Session) {
        let mut registry = self.inner.registry.write().await;
        match registry.restore(handle.clone(), slot) {
            Ok(()) => {
                let mut sessions = self.inner.sessions.write().await;
                sessions.insert(session.id(), session);
                tracing::warn!(handle = %handle, "dispose failed, session kept open");
            }
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "session could not be reinstated");
            }
        }
    }

    /// Drop a session without recording anything.
    async fn withdraw(&self, handle: &SurfaceHandle) {
        let removed = {
            let mut registry = self.inner.registry.write().await;
            let id = registry.unregister(handle);
            let mut sessions = self.inner.sessions.write().await;
            id.and_then(|id| sessions.remove(&id))
        };
        if removed.is_some() {
            self.emit(PanelEvent::SessionClosed {
                handle: handle.clone(),
                recorded: false,
                timestamp: Utc::now(),
            });
        }
    }

    /// Dispose every open session, e.g. on host shutdown.
    pub async fn dispose_all(&self) -> Result<Vec<RecoveryEntry>, PanelError> {
        let handles = self.inner.registry.read().await.handles();
        let mut recorded = Vec::new();
        for handle in handles {
            match self.dispose(&handle).await {
                Ok(Some(entry)) => recorded.push(entry),
                Ok(None) => {}
                // Disposed concurrently.
                Err(PanelError::UnknownHandle(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(recorded)
    }

    /// Reopen a stored entry in a new surface. The entry leaves the store;
    /// the new session starts clean with the entry's content as its
    /// imported baseline. On failure the entry goes back to the store and
    /// no session is left open.
    #[tracing::instrument(name = "panel.recover", skip(self, entry), fields(variant = %entry.variant))]
    pub async fn recover(&self, entry: &RecoveryEntry) -> Result<SurfaceHandle, PanelError> {
        let config = self
            .inner
            .panel
            .variant(&entry.variant)
            .ok_or_else(|| PanelError::UnknownVariant(entry.variant.clone()))?;
        if !self.inner.recovery.remove(entry).await? {
            return Err(PanelError::EntryNotFound {
                variant: entry.variant.clone(),
            });
        }

        let surface = match self.inner.launcher.launch(config).await {
            Ok(surface) => surface,
            Err(e) => {
                self.put_back(entry).await;
                return Err(PanelError::Surface(e));
            }
        };

        let session = Session::seeded(entry.variant.clone(), entry.content.clone());
        let handle = match self
            .insert_session(Arc::clone(&surface), session, true)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.put_back(entry).await;
                return Err(e);
            }
        };

        if let Err(e) = surface.set_state(&entry.content).await {
            self.withdraw(&handle).await;
            self.put_back(entry).await;
            return Err(PanelError::Surface(e));
        }

        tracing::info!(handle = %handle, "recovered unsaved work");
        self.emit(PanelEvent::EntryRecovered {
            handle: handle.clone(),
            variant: entry.variant.clone(),
            timestamp: Utc::now(),
        });
        Ok(handle)
    }

    /// Return an entry taken by a failed [`recover`](Self::recover). It
    /// lands at the head of the log.
    async fn put_back(&self, entry: &RecoveryEntry) {
        if let Err(e) = self.inner.recovery.append(entry).await {
            tracing::error!(variant = %entry.variant, error = %e, "recovery entry lost");
        }
    }

    pub async fn list_recovery(
        &self,
        variant: Option<&VariantId>,
    ) -> Result<Vec<RecoveryEntry>, PanelError> {
        self.inner.recovery.list_entries(variant).await
    }

    pub async fn clear_recovery(&self) -> Result<usize, PanelError> {
        let removed = self.inner.recovery.clear().await?;
        tracing::info!(removed, "recovery log cleared");
        self.emit(PanelEvent::RecoveryCleared {
            removed,
            timestamp: Utc::now(),
        });
        Ok(removed)
    }
}

fn view(handle: SurfaceHandle, session: &Session) -> SessionView {
    SessionView {
        session_id: session.id(),
        handle,
        variant: session.variant().clone(),
        state: session.dirty_state(),
        has_unsaved_work: session.has_unsaved_work(),
        opened_at: session.created_at(),
        updated_at: session.updated_at(),
    }
}
