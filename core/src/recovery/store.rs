//! Bounded, most-recent-first recovery log on top of a [`DurableStore`].

use std::sync::Arc;
use tokio::sync::Mutex;

use super::durable::DurableStore;
use super::entry::RecoveryEntry;
use crate::config::RecoveryConfig;
use crate::content::VariantId;
use crate::error::PanelError;

/// Result of reading the log, including how many stored items were unreadable.
#[derive(Debug, Clone, Default)]
pub struct RecoveryListing {
    pub entries: Vec<RecoveryEntry>,
    pub skipped: usize,
}

pub struct RecoveryStore {
    backend: Arc<dyn DurableStore>,
    key: String,
    hard_cap: usize,
    retain: usize,
    /// Serializes read-modify-write cycles against the backend.
    write_lock: Mutex<()>,
}

impl RecoveryStore {
    pub fn new(backend: Arc<dyn DurableStore>, cfg: &RecoveryConfig) -> Self {
        Self::with_limits(backend, cfg.storage_key.clone(), cfg.hard_cap, cfg.retain)
    }

    pub fn with_limits(
        backend: Arc<dyn DurableStore>,
        key: impl Into<String>,
        hard_cap: usize,
        retain: usize,
    ) -> Self {
        Self {
            backend,
            key: key.into(),
            hard_cap,
            retain: retain.min(hard_cap),
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    async fn load_raw(&self) -> Result<Vec<serde_json::Value>, PanelError> {
        Ok(self
            .backend
            .get(&self.key)
            .await
            .map_err(PanelError::Store)?
            .unwrap_or_default())
    }

    async fn store_raw(&self, raw: Vec<serde_json::Value>) -> Result<(), PanelError> {
        self.backend
            .set(&self.key, raw)
            .await
            .map_err(PanelError::Store)
    }

    /// Insert at the head. Overflowing the hard cap prunes the log down to
    /// the retained size in one step. Returns the stored length.
    pub async fn append(&self, entry: &RecoveryEntry) -> Result<usize, PanelError> {
        let value = entry
            .to_value()
            .map_err(|e| PanelError::Store(anyhow::Error::new(e)))?;

        let _guard = self.write_lock.lock().await;
        let mut raw = self.load_raw().await?;
        raw.insert(0, value);
        if raw.len() > self.hard_cap {
            tracing::info!(
                key = %self.key,
                len = raw.len(),
                retain = self.retain,
                "recovery log over capacity, pruning"
            );
            raw.truncate(self.retain);
        }
        let len = raw.len();
        self.store_raw(raw).await?;
        Ok(len)
    }

    /// Entries most-recent-first, optionally only those of one variant.
    pub async fn list_entries(
        &self,
        variant: Option<&VariantId>,
    ) -> Result<Vec<RecoveryEntry>, PanelError> {
        Ok(self.scan(variant).await?.entries)
    }

    /// Like [`list_entries`](Self::list_entries) but also reports how many
    /// stored items could not be parsed.
    pub async fn scan(&self, variant: Option<&VariantId>) -> Result<RecoveryListing, PanelError> {
        let raw = self.load_raw().await?;
        let mut listing = RecoveryListing::default();
        for (index, value) in raw.into_iter().enumerate() {
            match RecoveryEntry::from_value(value) {
                Ok(entry) => {
                    if variant.map_or(true, |v| &entry.variant == v) {
                        listing.entries.push(entry);
                    }
                }
                Err(source) => {
                    let err = PanelError::CorruptRecoveryEntry { index, source };
                    tracing::warn!(key = %self.key, error = %err, "skipping recovery entry");
                    listing.skipped += 1;
                }
            }
        }
        Ok(listing)
    }

    /// Remove the first stored entry equal to `entry`. Returns whether one
    /// was found.
    pub async fn remove(&self, entry: &RecoveryEntry) -> Result<bool, PanelError> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.load_raw().await?;
        let position = raw.iter().position(|value| {
            RecoveryEntry::from_value(value.clone())
                .map(|stored| &stored == entry)
                .unwrap_or(false)
        });
        match position {
            Some(index) => {
                raw.remove(index);
                self.store_raw(raw).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop everything, corrupt items included. Returns how many were dropped.
    pub async fn clear(&self) -> Result<usize, PanelError> {
        let _guard = self.write_lock.lock().await;
        let removed = self.load_raw().await?.len();
        self.store_raw(Vec::new()).await?;
        Ok(removed)
    }

    /// Number of stored items, readable or not.
    pub async fn len(&self) -> Result<usize, PanelError> {
        Ok(self.load_raw().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, PanelError> {
        Ok(self.len().await? == 0)
    }
}
