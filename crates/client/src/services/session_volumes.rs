//! 课时量生命周期
//!
//! 客户端先做状态与提交前检查给出即时反馈；后端是最终裁决者，
//! 它的拒绝会被归类为 [`ApiError::DuplicatePeriod`] 或 [`ApiError::ForbiddenTransition`]。

use std::sync::Arc;

use bodyback_common::{Pagination, SessionVolumeId, UserId};
use bodyback_domain_core::{
    validate_rejection_notes, DecisionRequest, DecisionResponse, SessionVolume,
    SessionVolumeCreate, SessionVolumeFilter, SessionVolumeStatus, SessionVolumeUpdate,
};
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::ApiRequest;
use tracing::{debug, info};

use super::MessageResponse;
use crate::gateway::RequestGateway;
use crate::paths;

const DUPLICATE_MARKERS: [&str; 2] = ["already exists", "duplicate"];

fn mentions(detail: &str, markers: &[&str]) -> bool {
    let detail = detail.to_lowercase();
    markers.iter().any(|m| detail.contains(m))
}

fn is_status_word(word: &str) -> bool {
    SessionVolumeStatus::ALL.iter().any(|s| s.as_str() == word)
}

/// 错误信息是否指明了记录状态，如 "in status draft"、"from approved to draft"、"approved status"
fn names_status_refusal(detail: &str) -> bool {
    let detail = detail.to_lowercase();
    let words: Vec<&str> = detail
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    words.windows(2).any(|pair| match pair {
        ["status" | "from", next] => is_status_word(next),
        [word, "status"] => is_status_word(word),
        _ => false,
    })
}

/// 创建被拒：同一教练、客户、周期已有记录
fn classify_create_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Conflict(detail) => ApiError::DuplicatePeriod(detail),
        ApiError::Validation(detail) if mentions(&detail, &DUPLICATE_MARKERS) => {
            ApiError::DuplicatePeriod(detail)
        }
        other => other,
    }
}

/// 修改或审批被拒：只有后端指明当前状态时才归为状态流转错误，字段校验原样返回
fn classify_transition_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Validation(detail) | ApiError::Conflict(detail)
            if names_status_refusal(&detail) =>
        {
            ApiError::ForbiddenTransition(detail)
        }
        other => other,
    }
}

#[derive(Clone)]
pub struct SessionVolumeService {
    gateway: Arc<RequestGateway>,
}

impl SessionVolumeService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// 新建记录，默认草稿
    pub async fn create(&self, create: &SessionVolumeCreate) -> ApiResult<SessionVolume> {
        create.validate()?;
        let request = ApiRequest::post(paths::SESSION_VOLUMES).json(create)?;
        let volume: SessionVolume = self
            .gateway
            .send_json(request)
            .await
            .map_err(classify_create_error)?;

        info!(
            id = %volume.id,
            customer_id = %volume.customer_id,
            period = %volume.period,
            status = %volume.status,
            "Session volume created"
        );
        Ok(volume)
    }

    pub async fn list(&self, filter: &SessionVolumeFilter) -> ApiResult<Vec<SessionVolume>> {
        filter.validate()?;
        let request = ApiRequest::get(paths::SESSION_VOLUMES).query_pairs(filter.query_pairs());
        self.gateway.send_json(request).await
    }

    pub async fn get(&self, id: SessionVolumeId) -> ApiResult<SessionVolume> {
        self.gateway.send_json(ApiRequest::get(paths::session_volume(id))).await
    }

    /// 教练修改记录
    ///
    /// 先读取当前记录：非草稿或驳回状态直接拒绝，不发送修改请求。
    pub async fn update(
        &self,
        id: SessionVolumeId,
        update: &SessionVolumeUpdate,
    ) -> ApiResult<SessionVolume> {
        let current = self.get(id).await?;
        let acting_trainer = self
            .gateway
            .tokens()
            .identity()
            .await?
            .filter(|identity| identity.is_trainer())
            .map(|identity| identity.user_id);

        if let Err(e) = current.check_trainer_update(acting_trainer, update) {
            debug!(id = %id, status = %current.status, error = %e, "Update refused locally");
            return Err(e);
        }

        let request = ApiRequest::put(paths::session_volume(id)).json(update)?;
        let updated: SessionVolume = self
            .gateway
            .send_json(request)
            .await
            .map_err(classify_transition_error)?;

        info!(id = %id, from = %current.status, to = %updated.status, "Session volume updated");
        Ok(updated)
    }

    /// 软删除，由后端设置 `deleted_at`
    pub async fn delete(&self, id: SessionVolumeId) -> ApiResult<MessageResponse> {
        let response = self
            .gateway
            .send_json(ApiRequest::delete(paths::session_volume(id)))
            .await?;
        info!(id = %id, "Session volume deleted");
        Ok(response)
    }

    pub async fn list_by_customer(
        &self,
        customer_id: UserId,
        pagination: Pagination,
    ) -> ApiResult<Vec<SessionVolume>> {
        let filter = SessionVolumeFilter::for_customer(customer_id).paginate(pagination);
        self.list(&filter).await
    }

    pub async fn list_by_period(
        &self,
        year: i32,
        month: u32,
        trainer_id: Option<UserId>,
        customer_id: Option<UserId>,
    ) -> ApiResult<Vec<SessionVolume>> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        let request = ApiRequest::get(paths::session_volumes_for_period(year, month))
            .query_opt("trainer_id", trainer_id)
            .query_opt("customer_id", customer_id);
        self.gateway.send_json(request).await
    }

    /// 客户通过
    ///
    /// 不预先读取记录；只有 submitted 或 read 状态可以审批，这一前提由后端检查，
    /// 拒绝时返回 [`ApiError::ForbiddenTransition`]。
    pub async fn approve(
        &self,
        id: SessionVolumeId,
        notes: Option<&str>,
    ) -> ApiResult<DecisionResponse> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let decision = DecisionRequest {
            status: SessionVolumeStatus::Approved,
            notes: notes.map(str::to_string),
        };
        self.decide(paths::approve_session_volume(id), &decision).await
    }

    /// 客户驳回，必须附带理由；状态前提同 [`Self::approve`]
    pub async fn reject(&self, id: SessionVolumeId, notes: &str) -> ApiResult<DecisionResponse> {
        let notes = validate_rejection_notes(notes)?;
        let decision = DecisionRequest {
            status: SessionVolumeStatus::Rejected,
            notes: Some(notes.to_string()),
        };
        self.decide(paths::reject_session_volume(id), &decision).await
    }

    async fn decide(&self, path: String, decision: &DecisionRequest) -> ApiResult<DecisionResponse> {
        let request = ApiRequest::post(path.as_str()).json(decision)?;
        let response: DecisionResponse = self
            .gateway
            .send_json(request)
            .await
            .map_err(classify_transition_error)?;
        info!(path = %path, new_status = %response.new_status, "Session volume decision recorded");
        Ok(response)
    }
}
