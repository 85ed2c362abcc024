use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use calcpanel_core::api::{AppConfig, DurableStore, MemoryStore, RecoveryStore};

use crate::store::FileStore;

/// Path value that keeps the recovery log in memory only.
pub const MEMORY_STORE_PATH: &str = ":memory:";

pub fn build_store(cfg: &AppConfig) -> Result<Arc<dyn DurableStore>> {
    match cfg.recovery.path.as_deref().map(str::trim) {
        Some(MEMORY_STORE_PATH) => Ok(Arc::new(MemoryStore::new())),
        Some(path) if !path.is_empty() => Ok(Arc::new(FileStore::new(PathBuf::from(path)))),
        _ => Err(anyhow::anyhow!("recovery.path is not set")),
    }
}

pub fn build_recovery(cfg: &AppConfig) -> Result<Arc<RecoveryStore>> {
    let backend = build_store(cfg)?;
    tracing::debug!(backend = backend.name(), key = %cfg.recovery.storage_key, "recovery store ready");
    Ok(Arc::new(RecoveryStore::new(backend, &cfg.recovery)))
}
