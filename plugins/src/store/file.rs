//! JSON-file backed durable store.
//!
//! The file holds one JSON object mapping each key to its stored array.
//! Writes go to a sibling temp file that is renamed over the original, so a
//! crash mid-write leaves the previous contents intact.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use calcpanel_core::api::DurableStore;

pub struct FileStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                let backup = self.backup_path();
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "store file is unreadable, moving it aside"
                );
                tokio::fs::rename(&self.path, &backup)
                    .await
                    .with_context(|| format!("Failed to move corrupt store to {:?}", backup))?;
                Ok(Map::new())
            }
        }
    }

    async fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create store directory: {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(map).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {:?}", tmp))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {:?}", self.path))
    }

    fn backup_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        self.path.with_extension(format!("corrupt-{stamp}.json"))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<Value>>> {
        let _guard = self.io_lock.lock().await;
        let mut map = self.read_all().await?;
        Ok(map.remove(key).map(|value| match value {
            Value::Array(items) => items,
            // Surface a mistyped key as a single unreadable item.
            other => vec![other],
        }))
    }

    async fn set(&self, key: &str, values: Vec<Value>) -> Result<()> {
        let _guard = self.io_lock.lock().await;
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), Value::Array(values));
        self.write_all(&map).await
    }
}
