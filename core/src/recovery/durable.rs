use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value persistence that survives process restarts.
///
/// Values are raw JSON so callers can tolerate individually corrupt items.
#[async_trait]
pub trait DurableStore: Send + Sync {
    fn name(&self) -> &str;
    /// Stored sequence under `key`, or `None` when the key was never written.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<serde_json::Value>>>;
    async fn set(&self, key: &str, values: Vec<serde_json::Value>) -> anyhow::Result<()>;
}

/// Process-local store, used when persistence is disabled and in tests.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<serde_json::Value>>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, values: Vec<serde_json::Value>) -> anyhow::Result<()> {
        self.data.write().await.insert(key.to_string(), values);
        Ok(())
    }
}
