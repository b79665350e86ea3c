//! 课时量记录

use bodyback_common::{Pagination, SessionVolumeId, Timestamps, UserId};
use bodyback_errors::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{validate_submission, Actor, Period, SessionVolumeStatus};

/// 记录上附带的用户信息（用于展示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

impl UserSummary {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

/// 教练为客户填写的月度课时量记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionVolume {
    pub id: SessionVolumeId,
    pub trainer_id: UserId,
    pub customer_id: UserId,
    pub period: Period,
    pub session_count: u32,
    pub plans: Option<String>,
    pub notes: Option<String>,
    pub status: SessionVolumeStatus,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    #[serde(default)]
    pub customer: Option<UserSummary>,
    #[serde(default)]
    pub trainer: Option<UserSummary>,
}

impl SessionVolume {
    pub fn is_deleted(&self) -> bool {
        self.timestamps.is_deleted()
    }

    pub fn is_editable_by_trainer(&self) -> bool {
        !self.is_deleted() && self.status.is_trainer_editable()
    }

    /// 客户当前能否通过或驳回
    pub fn is_awaiting_decision(&self) -> bool {
        !self.is_deleted() && self.status.is_awaiting_decision()
    }

    /// 教练修改前的客户端检查
    ///
    /// `acting_trainer` 为当前登录用户；未知时跳过归属检查，交给后端判断。
    pub fn check_trainer_update(
        &self,
        acting_trainer: Option<UserId>,
        update: &SessionVolumeUpdate,
    ) -> ApiResult<()> {
        if self.is_deleted() {
            return Err(ApiError::not_found(format!("session volume {} was deleted", self.id)));
        }
        if let Some(trainer) = acting_trainer {
            if trainer != self.trainer_id {
                return Err(ApiError::forbidden(
                    "only the trainer who created a session volume may change it",
                ));
            }
        }
        if !self.status.is_trainer_editable() {
            return Err(ApiError::forbidden_transition(format!(
                "session volume is {} and can no longer be edited",
                self.status
            )));
        }

        let target = match update.status {
            Some(to) => self.status.transition(to, Actor::Trainer)?,
            None => self.status,
        };

        if target == SessionVolumeStatus::Submitted {
            let merged = self.merged_with(update);
            validate_submission(
                merged.session_count,
                merged.notes.as_deref(),
                merged.plans.as_deref(),
            )?;
        }
        Ok(())
    }

    /// 客户审批前的客户端检查
    pub fn check_decision(&self, decision: SessionVolumeStatus) -> ApiResult<()> {
        if self.is_deleted() {
            return Err(ApiError::not_found(format!("session volume {} was deleted", self.id)));
        }
        self.status.transition(decision, Actor::Customer).map(|_| ())
    }

    /// 将更新字段覆盖到当前值上（不修改自身）
    pub fn merged_with(&self, update: &SessionVolumeUpdate) -> SessionVolume {
        let mut merged = self.clone();
        if let Some(period) = update.period {
            merged.period = period;
        }
        if let Some(count) = update.session_count {
            merged.session_count = count;
        }
        if let Some(plans) = &update.plans {
            merged.plans = Some(plans.clone());
        }
        if let Some(notes) = &update.notes {
            merged.notes = Some(notes.clone());
        }
        if let Some(status) = update.status {
            merged.status = status;
        }
        merged
    }
}

/// 创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionVolumeCreate {
    pub trainer_id: UserId,
    pub customer_id: UserId,
    pub period: Period,
    pub session_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionVolumeStatus>,
}

impl SessionVolumeCreate {
    pub fn new(trainer_id: UserId, customer_id: UserId, period: Period, session_count: u32) -> Self {
        Self {
            trainer_id,
            customer_id,
            period,
            session_count,
            plans: None,
            notes: None,
            status: None,
        }
    }

    pub fn with_plans(mut self, plans: impl Into<String>) -> Self {
        self.plans = Some(plans.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_status(mut self, status: SessionVolumeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// 未指定状态时后端按草稿创建
    pub fn effective_status(&self) -> SessionVolumeStatus {
        self.status.unwrap_or(SessionVolumeStatus::Draft)
    }

    /// 创建前的客户端检查
    pub fn validate(&self) -> ApiResult<()> {
        match self.effective_status() {
            SessionVolumeStatus::Draft => Ok(()),
            SessionVolumeStatus::Submitted => validate_submission(
                self.session_count,
                self.notes.as_deref(),
                self.plans.as_deref(),
            ),
            other => Err(ApiError::forbidden_transition(format!(
                "a new session volume cannot start as {other}"
            ))),
        }
    }
}

/// 更新请求，None 表示不修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionVolumeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionVolumeStatus>,
}

impl SessionVolumeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn submit() -> Self {
        Self {
            status: Some(SessionVolumeStatus::Submitted),
            ..Default::default()
        }
    }
}

/// 列表过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionVolumeFilter {
    pub trainer_id: Option<UserId>,
    pub customer_id: Option<UserId>,
    pub status: Option<SessionVolumeStatus>,
    pub start_period: Option<Period>,
    pub end_period: Option<Period>,
    pub pagination: Option<Pagination>,
}

impl SessionVolumeFilter {
    pub fn for_customer(customer_id: UserId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn for_trainer(trainer_id: UserId) -> Self {
        Self {
            trainer_id: Some(trainer_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: SessionVolumeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn between(mut self, start: Period, end: Period) -> Self {
        self.start_period = Some(start);
        self.end_period = Some(end);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        if let (Some(start), Some(end)) = (self.start_period, self.end_period) {
            if start > end {
                return Err(ApiError::validation(format!(
                    "start period {start} is after end period {end}"
                )));
            }
        }
        Ok(())
    }

    /// 查询参数，未设置的条件不出现
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.pagination.map(|p| p.query_pairs()).unwrap_or_default();
        let optional = [
            ("trainer_id", self.trainer_id.map(|id| id.to_string())),
            ("customer_id", self.customer_id.map(|id| id.to_string())),
            ("status", self.status.map(|s| s.to_string())),
            ("start_period", self.start_period.map(|p| p.to_string())),
            ("end_period", self.end_period.map(|p| p.to_string())),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), v))),
        );
        pairs
    }
}

/// 审批请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub status: SessionVolumeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// 审批结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub message: String,
    pub new_status: SessionVolumeStatus,
    pub updated_at: DateTime<Utc>,
}
