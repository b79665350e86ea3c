use std::sync::Arc;

use bodyback_common::UserId;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::ApiRequest;
use serde::{Deserialize, Serialize};

use crate::gateway::RequestGateway;
use crate::paths;

/// 用户基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
}

/// 用户信息更新，None 字段不发送
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    gateway: Arc<RequestGateway>,
}

impl UserService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn me(&self) -> ApiResult<UserData> {
        self.gateway.send_json(ApiRequest::get(paths::USERS_ME)).await
    }

    /// 更新当前用户；用户 ID 取自缓存的身份快照
    pub async fn update_me(&self, update: &UserUpdate) -> ApiResult<UserData> {
        let identity = self
            .gateway
            .tokens()
            .identity()
            .await?
            .ok_or_else(|| ApiError::unauthenticated("User not authenticated"))?;

        let request = ApiRequest::put(paths::user(identity.user_id)).json(update)?;
        self.gateway.send_json(request).await
    }
}
