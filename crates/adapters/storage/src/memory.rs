//! 内存键值存储

use std::collections::HashMap;

use async_trait::async_trait;
use bodyback_errors::ApiResult;
use bodyback_ports::KeyValueStore;
use tokio::sync::RwLock;

/// 进程内键值存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ApiResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn multi_set(&self, entries: Vec<(String, String)>) -> ApiResult<()> {
        let mut guard = self.entries.write().await;
        guard.extend(entries);
        Ok(())
    }

    async fn multi_remove(&self, keys: Vec<String>) -> ApiResult<()> {
        let mut guard = self.entries.write().await;
        for key in keys {
            guard.remove(&key);
        }
        Ok(())
    }
}
