//! Per-surface unsaved-work tracking.

use chrono::{DateTime, Utc};

use super::transitions::{DirtyState, SessionPhase, StateTransition, TransitionError};
use super::types::SessionId;
use crate::content::{Content, VariantId};

/// One open calculator surface and the baselines its content is judged
/// against.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    variant: VariantId,
    phase: SessionPhase,
    /// Most recent content reported by the surface
    live: Option<Content>,
    /// Content as of the last explicit save
    saved: Option<Content>,
    /// Content as of the last explicit import
    imported: Option<Content>,
    /// Set by an import; the next change notification is its echo
    just_imported: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(variant: VariantId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            variant,
            phase: SessionPhase::Open,
            live: None,
            saved: None,
            imported: None,
            just_imported: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Session pre-seeded with recovered content. The content counts as
    /// imported, so the session starts clean.
    pub fn seeded(variant: VariantId, content: Content) -> Self {
        let mut session = Self::new(variant);
        session.on_import(content);
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> &VariantId {
        &self.variant
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn live_content(&self) -> Option<&Content> {
        self.live.as_ref()
    }

    pub fn saved_content(&self) -> Option<&Content> {
        self.saved.as_ref()
    }

    pub fn imported_content(&self) -> Option<&Content> {
        self.imported.as_ref()
    }

    pub fn is_just_imported(&self) -> bool {
        self.just_imported
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a change notification from the surface.
    ///
    /// The first notification after an import is the surface echoing the
    /// imported state back. It consumes the import flag whether or not the
    /// reported content matches the imported baseline.
    pub fn on_change(&mut self, content: Content) {
        if self.just_imported {
            self.just_imported = false;
            tracing::trace!(session_id = %self.id, "import echo consumed");
        }
        self.live = Some(content);
        self.updated_at = Utc::now();
    }

    pub fn on_save(&mut self, content: Content) {
        self.saved = Some(content);
        self.updated_at = Utc::now();
    }

    pub fn on_import(&mut self, content: Content) {
        self.imported = Some(content.clone());
        self.live = Some(content);
        self.just_imported = true;
        self.updated_at = Utc::now();
    }

    /// Live content exists and matches neither baseline.
    pub fn has_unsaved_work(&self) -> bool {
        match &self.live {
            None => false,
            Some(live) => {
                self.saved.as_ref() != Some(live) && self.imported.as_ref() != Some(live)
            }
        }
    }

    pub fn dirty_state(&self) -> DirtyState {
        if self.just_imported {
            DirtyState::JustImported
        } else if self.has_unsaved_work() {
            DirtyState::Dirty
        } else {
            DirtyState::Clean
        }
    }

    /// Mark the session closed, handing back the content worth recovering.
    pub fn close(&mut self) -> Result<Option<Content>, TransitionError> {
        StateTransition::validate(self.phase, SessionPhase::Closed)?;
        let unsaved = self.has_unsaved_work();
        self.phase = SessionPhase::Closed;
        self.updated_at = Utc::now();
        Ok(if unsaved { self.live.clone() } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(v: serde_json::Value) -> Content {
        Content::new(v)
    }

    fn session() -> Session {
        Session::new(VariantId::from("stable"))
    }

    #[test]
    fn test_new_session_is_clean() {
        let s = session();
        assert!(!s.has_unsaved_work());
        assert_eq!(s.dirty_state(), DirtyState::Clean);
        assert_eq!(s.phase(), SessionPhase::Open);
    }

    #[test]
    fn test_change_without_baseline_is_dirty() {
        let mut s = session();
        s.on_change(content(json!({"x": 2})));
        assert!(s.has_unsaved_work());
        assert_eq!(s.dirty_state(), DirtyState::Dirty);
    }

    #[test]
    fn test_import_echo_is_not_dirty() {
        let mut s = session();
        s.on_import(content(json!({"x": 1})));
        assert_eq!(s.dirty_state(), DirtyState::JustImported);
        s.on_change(content(json!({"x": 1})));
        assert!(!s.has_unsaved_work());
        assert_eq!(s.dirty_state(), DirtyState::Clean);
        assert!(!s.is_just_imported());
    }

    #[test]
    fn test_change_after_import_is_dirty() {
        let mut s = session();
        s.on_import(content(json!({"x": 1})));
        s.on_change(content(json!({"x": 2})));
        assert!(s.has_unsaved_work());
        assert_eq!(s.dirty_state(), DirtyState::Dirty);
    }

    #[test]
    fn test_import_flag_cleared_even_when_echo_differs() {
        let mut s = session();
        s.on_import(content(json!({"x": 1})));
        s.on_change(content(json!({"x": 1, "y": 0})));
        assert!(!s.is_just_imported());
        s.on_change(content(json!({"x": 1})));
        assert_eq!(s.dirty_state(), DirtyState::Clean);
    }

    #[test]
    fn test_save_of_live_content_is_clean() {
        let mut s = session();
        s.on_change(content(json!({"x": 2})));
        s.on_save(content(json!({"x": 2})));
        assert!(!s.has_unsaved_work());
        assert_eq!(s.live_content(), Some(&content(json!({"x": 2}))));
    }

    #[test]
    fn test_save_does_not_touch_live_content() {
        let mut s = session();
        s.on_change(content(json!({"x": 3})));
        s.on_save(content(json!({"x": 2})));
        assert_eq!(s.live_content(), Some(&content(json!({"x": 3}))));
        assert!(s.has_unsaved_work());
    }

    #[test]
    fn test_returning_to_a_baseline_is_clean() {
        let mut s = session();
        s.on_change(content(json!({"x": 1})));
        s.on_save(content(json!({"x": 1})));
        s.on_change(content(json!({"x": 2})));
        assert!(s.has_unsaved_work());
        s.on_change(content(json!({"x": 1})));
        assert!(!s.has_unsaved_work());
    }

    #[test]
    fn test_seeded_session_starts_clean() {
        let s = Session::seeded(VariantId::from("stable"), content(json!({"x": 5})));
        assert!(!s.has_unsaved_work());
        assert_eq!(s.imported_content(), Some(&content(json!({"x": 5}))));
        assert_eq!(s.live_content(), Some(&content(json!({"x": 5}))));
    }

    #[test]
    fn test_close_hands_back_unsaved_content_once() {
        let mut s = session();
        s.on_change(content(json!({"x": 2})));
        assert_eq!(s.close().unwrap(), Some(content(json!({"x": 2}))));
        assert_eq!(s.phase(), SessionPhase::Closed);
        assert!(s.close().is_err());
    }

    #[test]
    fn test_close_clean_session_has_nothing_to_recover() {
        let mut s = session();
        s.on_import(content(json!({"x": 1})));
        s.on_change(content(json!({"x": 1})));
        assert_eq!(s.close().unwrap(), None);
    }
}
