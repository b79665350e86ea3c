//! 教练视角的客户列表与统计

use std::sync::Arc;

use bodyback_common::{Pagination, UserId};
use bodyback_errors::ApiResult;
use bodyback_ports::ApiRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::RequestGateway;
use crate::paths;

/// 客户列表中附带的用户信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub user_id: UserId,
    pub trainer_id: Option<UserId>,
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub profile_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub user: UserInfo,
    pub trainer: Option<UserInfo>,
}

impl Customer {
    pub fn display_name(&self) -> String {
        match (self.user.first_name.as_deref(), self.user.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerStats {
    pub trainer_id: UserId,
    pub total_customers: u32,
    pub active_customers: u32,
    pub total_sessions: u32,
    pub sessions_this_month: u32,
}

#[derive(Clone)]
pub struct TrainerService {
    gateway: Arc<RequestGateway>,
}

impl TrainerService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn customers(
        &self,
        trainer_id: UserId,
        pagination: Pagination,
    ) -> ApiResult<Vec<Customer>> {
        let request =
            ApiRequest::get(paths::trainer_customers(trainer_id)).query_pairs(pagination.query_pairs());
        self.gateway.send_json(request).await
    }

    /// 当前登录教练的统计
    pub async fn my_stats(&self) -> ApiResult<TrainerStats> {
        self.gateway.send_json(ApiRequest::get(paths::TRAINER_STATS_ME)).await
    }
}
