//! Handle-keyed index of open sessions and their surfaces.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::{SessionId, SurfaceHandle};
use crate::error::PanelError;
use crate::surface::EditingSurface;

/// Registry bookkeeping for one surface, detached by
/// [`SessionRegistry::take`].
pub struct RegistryEntry {
    session_id: SessionId,
    surface: Arc<dyn EditingSurface>,
    visible: bool,
    registered_seq: u64,
    /// Sequence number of the last focus report (or of registration)
    focus_seq: u64,
}

impl RegistryEntry {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

/// Maps live surface handles to the sessions the panel manager owns.
#[derive(Default)]
pub struct SessionRegistry {
    entries: HashMap<SurfaceHandle, RegistryEntry>,
    seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New surfaces start visible and focused, the way a freshly opened
    /// panel is revealed in the host.
    pub fn register(
        &mut self,
        handle: SurfaceHandle,
        session_id: SessionId,
        surface: Arc<dyn EditingSurface>,
    ) -> Result<(), PanelError> {
        if self.entries.contains_key(&handle) {
            return Err(PanelError::DuplicateHandle(handle));
        }
        self.seq += 1;
        self.entries.insert(
            handle,
            RegistryEntry {
                session_id,
                surface,
                visible: true,
                registered_seq: self.seq,
                focus_seq: self.seq,
            },
        );
        Ok(())
    }

    /// Returns the session that was registered under `handle`, if any.
    pub fn unregister(&mut self, handle: &SurfaceHandle) -> Option<SessionId> {
        self.entries.remove(handle).map(|e| e.session_id)
    }

    /// Detach `handle` with its visibility and focus order intact.
    pub fn take(&mut self, handle: &SurfaceHandle) -> Option<RegistryEntry> {
        self.entries.remove(handle)
    }

    /// Reattach an entry detached by [`take`](Self::take).
    pub fn restore(&mut self, handle: SurfaceHandle, entry: RegistryEntry) -> Result<(), PanelError> {
        if self.entries.contains_key(&handle) {
            return Err(PanelError::DuplicateHandle(handle));
        }
        self.entries.insert(handle, entry);
        Ok(())
    }

    pub fn session_id(&self, handle: &SurfaceHandle) -> Option<SessionId> {
        self.entries.get(handle).map(|e| e.session_id)
    }

    pub fn surface(&self, handle: &SurfaceHandle) -> Option<Arc<dyn EditingSurface>> {
        self.entries.get(handle).map(|e| Arc::clone(&e.surface))
    }

    pub fn set_visible(&mut self, handle: &SurfaceHandle, visible: bool) -> Result<(), PanelError> {
        let entry = self
            .entries
            .get_mut(handle)
            .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
        entry.visible = visible;
        Ok(())
    }

    /// Focus implies visibility.
    pub fn focus(&mut self, handle: &SurfaceHandle) -> Result<(), PanelError> {
        self.seq += 1;
        let seq = self.seq;
        let entry = self
            .entries
            .get_mut(handle)
            .ok_or_else(|| PanelError::UnknownHandle(handle.clone()))?;
        entry.visible = true;
        entry.focus_seq = seq;
        Ok(())
    }

    /// The visible surface that was focused last, if any surface is visible.
    pub fn active(&self) -> Option<(SurfaceHandle, SessionId)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.visible)
            .max_by_key(|(_, e)| e.focus_seq)
            .map(|(h, e)| (h.clone(), e.session_id))
    }

    /// Handles in registration order.
    pub fn handles(&self) -> Vec<SurfaceHandle> {
        let mut handles: Vec<_> = self
            .entries
            .iter()
            .map(|(h, e)| (e.registered_seq, h.clone()))
            .collect();
        handles.sort_by_key(|(seq, _)| *seq);
        handles.into_iter().map(|(_, h)| h).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
