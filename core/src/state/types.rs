//! Identifiers and events shared by the session state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::transitions::DirtyState;
use crate::content::VariantId;

/// Opaque identifier of a live editing surface, scoped to the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceHandle(String);

impl SurfaceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh handle for a surface launched by this process.
    pub fn generate() -> Self {
        Self(format!("surface-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity of a session owned by the panel manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of a session handed out to commands and the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub handle: SurfaceHandle,
    pub variant: VariantId,
    pub state: DirtyState,
    pub has_unsaved_work: bool,
    pub opened_at: DateTime<Utc>,
    /// Last change, save or import
    pub updated_at: DateTime<Utc>,
}

/// Panel manager events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PanelEvent {
    /// A surface was opened and its session registered
    SessionOpened {
        handle: SurfaceHandle,
        variant: VariantId,
        restored: bool,
        timestamp: DateTime<Utc>,
    },
    /// The session moved between clean, dirty and just-imported
    DirtyStateChanged {
        handle: SurfaceHandle,
        old: DirtyState,
        new: DirtyState,
        timestamp: DateTime<Utc>,
    },
    /// Saved baseline updated by an export
    Saved {
        handle: SurfaceHandle,
        timestamp: DateTime<Utc>,
    },
    /// Imported baseline updated
    Imported {
        handle: SurfaceHandle,
        timestamp: DateTime<Utc>,
    },
    /// Unsaved content committed to the recovery store
    SnapshotRecorded {
        handle: SurfaceHandle,
        variant: VariantId,
        timestamp: DateTime<Utc>,
    },
    /// Session disposed
    SessionClosed {
        handle: SurfaceHandle,
        recorded: bool,
        timestamp: DateTime<Utc>,
    },
    /// A stored entry was reopened into a new session
    EntryRecovered {
        handle: SurfaceHandle,
        variant: VariantId,
        timestamp: DateTime<Utc>,
    },
    /// The recovery store was emptied
    RecoveryCleared {
        removed: usize,
        timestamp: DateTime<Utc>,
    },
}

impl PanelEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionOpened { timestamp, .. } => *timestamp,
            Self::DirtyStateChanged { timestamp, .. } => *timestamp,
            Self::Saved { timestamp, .. } => *timestamp,
            Self::Imported { timestamp, .. } => *timestamp,
            Self::SnapshotRecorded { timestamp, .. } => *timestamp,
            Self::SessionClosed { timestamp, .. } => *timestamp,
            Self::EntryRecovered { timestamp, .. } => *timestamp,
            Self::RecoveryCleared { timestamp, .. } => *timestamp,
        }
    }

    pub fn handle(&self) -> Option<&SurfaceHandle> {
        match self {
            Self::SessionOpened { handle, .. }
            | Self::DirtyStateChanged { handle, .. }
            | Self::Saved { handle, .. }
            | Self::Imported { handle, .. }
            | Self::SnapshotRecorded { handle, .. }
            | Self::SessionClosed { handle, .. }
            | Self::EntryRecovered { handle, .. } => Some(handle),
            Self::RecoveryCleared { .. } => None,
        }
    }
}
