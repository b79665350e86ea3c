//! 本地令牌与身份存储
//!
//! 三个独立条目：访问令牌、刷新令牌、序列化的身份快照。令牌对总是一起写入、一起清除。

use std::sync::Arc;

use bodyback_auth_core::{CredentialPair, SessionIdentity};
use bodyback_errors::ApiResult;
use bodyback_ports::KeyValueStore;
use tracing::warn;

pub const ACCESS_TOKEN_KEY: &str = "@bodyback:access_token";
pub const REFRESH_TOKEN_KEY: &str = "@bodyback:refresh_token";
pub const USER_DATA_KEY: &str = "@bodyback:user_data";

/// 基于 [`KeyValueStore`] 的令牌存储
#[derive(Clone)]
pub struct TokenStorage {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn access_token(&self) -> ApiResult<Option<String>> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> ApiResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// 两个令牌都存在时返回令牌对
    pub async fn credentials(&self) -> ApiResult<Option<CredentialPair>> {
        let access = self.access_token().await?;
        let refresh = self.refresh_token().await?;
        Ok(match (access, refresh) {
            (Some(access), Some(refresh)) => Some(CredentialPair::new(access, refresh)),
            _ => None,
        })
    }

    /// 整体替换令牌对
    pub async fn set_tokens(&self, pair: &CredentialPair) -> ApiResult<()> {
        self.store
            .multi_set(vec![
                (ACCESS_TOKEN_KEY.to_string(), pair.access_token().to_string()),
                (REFRESH_TOKEN_KEY.to_string(), pair.refresh_token().to_string()),
            ])
            .await
    }

    pub async fn set_identity(&self, identity: &SessionIdentity) -> ApiResult<()> {
        let raw = serde_json::to_string(identity)?;
        self.store.set(USER_DATA_KEY, &raw).await
    }

    /// 读取身份快照；内容损坏时视为不存在
    pub async fn identity(&self) -> ApiResult<Option<SessionIdentity>> {
        let Some(raw) = self.store.get(USER_DATA_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable identity snapshot");
                Ok(None)
            }
        }
    }

    /// 清除令牌对与身份快照
    pub async fn clear_all(&self) -> ApiResult<()> {
        self.store
            .multi_remove(vec![
                ACCESS_TOKEN_KEY.to_string(),
                REFRESH_TOKEN_KEY.to_string(),
                USER_DATA_KEY.to_string(),
            ])
            .await
    }
}
