//! 客户端预校验
//!
//! 只用于即时反馈，后端仍会再次校验并可能拒绝。

use bodyback_errors::{ApiError, ApiResult};

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// 提交（submitted）前的检查：课时数大于 0，备注与计划非空
pub fn validate_submission(
    session_count: u32,
    notes: Option<&str>,
    plans: Option<&str>,
) -> ApiResult<()> {
    let mut problems = Vec::new();
    if session_count == 0 {
        problems.push("session count must be greater than zero");
    }
    if is_blank(notes) {
        problems.push("notes are required before submitting");
    }
    if is_blank(plans) {
        problems.push("plans are required before submitting");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(problems.join("; ")))
    }
}

/// 驳回必须附带理由，返回去掉首尾空白后的内容
pub fn validate_rejection_notes(notes: &str) -> ApiResult<&str> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        Err(ApiError::validation("a reason is required to reject a session volume"))
    } else {
        Ok(trimmed)
    }
}
