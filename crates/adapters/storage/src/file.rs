//! JSON 文件键值存储

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::KeyValueStore;
use tokio::sync::Mutex;
use tracing::debug;

/// 以单个 JSON 对象保存所有条目的存储
///
/// 每次写入先写临时文件再重命名，批量操作因此整体生效。
/// 写操作串行化；读取总是读磁盘上的最新内容。
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ApiResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                ApiError::storage(format!("Corrupt store file {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(ApiError::storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> ApiResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| ApiError::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            ApiError::storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), entries = entries.len(), "Store persisted");
        Ok(())
    }

    async fn update<F>(&self, mutate: F) -> ApiResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        mutate(&mut entries);
        self.persist(&entries).await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> ApiResult<()> {
        let key = key.to_string();
        self.update(move |entries| {
            entries.remove(&key);
        })
        .await
    }

    async fn multi_set(&self, pairs: Vec<(String, String)>) -> ApiResult<()> {
        self.update(move |entries| entries.extend(pairs)).await
    }

    async fn multi_remove(&self, keys: Vec<String>) -> ApiResult<()> {
        self.update(move |entries| {
            for key in keys {
                entries.remove(&key);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store
            .multi_set(vec![
                ("@bodyback:access_token".into(), "a1".into()),
                ("@bodyback:refresh_token".into(), "r1".into()),
            ])
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("@bodyback:refresh_token").await.unwrap().as_deref(),
            Some("r1")
        );

        reopened
            .multi_remove(vec!["@bodyback:access_token".into()])
            .await
            .unwrap();
        assert_eq!(store.get("@bodyback:access_token").await.unwrap(), None);
        assert_eq!(store.get("@bodyback:refresh_token").await.unwrap().as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = FileStore::new(&path).get("k").await.unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }
}
