//! 用户档案

use std::sync::Arc;

use bodyback_common::UserId;
use bodyback_errors::ApiResult;
use bodyback_ports::ApiRequest;
use serde::{Deserialize, Serialize};

use super::UserData;
use crate::gateway::RequestGateway;
use crate::paths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub user_id: UserId,
    pub profile_picture_url: Option<String>,
    pub bio: Option<String>,
    pub emergency_contact: Option<String>,
    /// 自由格式的偏好设置
    #[serde(default)]
    pub preferences: serde_json::Map<String, serde_json::Value>,
    pub user: UserData,
}

/// 档案更新；`Some(None)` 表示清空字段
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Clone)]
pub struct ProfileService {
    gateway: Arc<RequestGateway>,
}

impl ProfileService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn my_profile(&self) -> ApiResult<ProfileData> {
        self.gateway.send_json(ApiRequest::get(paths::PROFILES_ME)).await
    }

    pub async fn update_my_profile(&self, update: &ProfileUpdate) -> ApiResult<ProfileData> {
        let request = ApiRequest::put(paths::PROFILES_ME).json(update)?;
        self.gateway.send_json(request).await
    }

    pub async fn user_profile(&self, user_id: UserId) -> ApiResult<ProfileData> {
        self.gateway.send_json(ApiRequest::get(paths::profile(user_id))).await
    }
}
