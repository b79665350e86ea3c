//! 键值存储 trait 定义

use async_trait::async_trait;
use bodyback_errors::ApiResult;

/// 本地持久化键值存储
///
/// 批量写入与批量删除必须整体生效，令牌对依赖这一点保持一致。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取
    async fn get(&self, key: &str) -> ApiResult<Option<String>>;

    /// 写入
    async fn set(&self, key: &str, value: &str) -> ApiResult<()>;

    /// 删除
    async fn remove(&self, key: &str) -> ApiResult<()>;

    /// 批量写入
    async fn multi_set(&self, entries: Vec<(String, String)>) -> ApiResult<()>;

    /// 批量删除
    async fn multi_remove(&self, keys: Vec<String>) -> ApiResult<()>;
}
