use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{Content, VariantId};

/// Snapshot of unsaved content captured when its session was disposed.
///
/// Serialized as `{ "variant": ..., "content": ..., "timestamp": <RFC 3339> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub variant: VariantId,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl RecoveryEntry {
    pub fn new(variant: VariantId, content: Content) -> Self {
        Self {
            variant,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Short human label, e.g. `offline · 2026-10-17 09:14:02`.
    pub fn label(&self) -> String {
        format!(
            "{} · {}",
            self.variant,
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let entry = RecoveryEntry {
            variant: VariantId::from("stable"),
            content: Content::new(json!({"x": 2})),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 17, 9, 14, 2).unwrap(),
        };
        assert_eq!(
            entry.to_value().unwrap(),
            json!({
                "variant": "stable",
                "content": {"x": 2},
                "timestamp": "2026-10-17T09:14:02Z"
            })
        );
        assert_eq!(entry.label(), "stable · 2026-10-17 09:14:02");
    }

    #[test]
    fn test_accepts_offset_timestamps() {
        let entry = RecoveryEntry::from_value(json!({
            "variant": "online",
            "content": [],
            "timestamp": "2026-10-17T11:14:02.250+02:00"
        }))
        .unwrap();
        assert_eq!(entry.timestamp.to_rfc3339(), "2026-10-17T09:14:02.250+00:00");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        assert!(RecoveryEntry::from_value(json!({"variant": "online"})).is_err());
        assert!(RecoveryEntry::from_value(json!("not an entry")).is_err());
    }
}
