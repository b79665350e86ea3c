//! bodyback-errors - 统一错误处理
//!
//! 客户端错误分类：连接失败、认证失败、授权失败、校验失败
//! （含重复周期与非法状态流转）、资源不存在以及未分类的后端错误。

use serde::Deserialize;
use thiserror::Error;

/// 客户端错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// 请求未到达后端（网络不可达、DNS、TLS、超时）
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// 同一 (trainer, customer, period) 已存在未删除的记录
    #[error("Duplicate period: {0}")]
    DuplicatePeriod(String),

    /// 记录当前状态不允许该操作
    #[error("Forbidden transition: {0}")]
    ForbiddenTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error ({status}): {detail}")]
    Backend { status: u16, detail: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate_period(msg: impl Into<String>) -> Self {
        Self::DuplicatePeriod(msg.into())
    }

    pub fn forbidden_transition(msg: impl Into<String>) -> Self {
        Self::ForbiddenTransition(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(status: u16, detail: impl Into<String>) -> Self {
        Self::Backend {
            status,
            detail: detail.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// 根据 HTTP 状态码和后端返回的 detail 归类错误
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            400 | 422 => Self::Validation(detail),
            401 => Self::Unauthenticated(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            _ => Self::Backend { status, detail },
        }
    }

    /// 根据 HTTP 状态码和原始响应体归类错误
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::from_status(status, detail_from_body(body))
    }

    /// 对应的 HTTP 状态码；纯客户端错误返回 None
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Validation(_) => Some(400),
            Self::DuplicatePeriod(_) => Some(409),
            Self::ForbiddenTransition(_) => Some(400),
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::Backend { status, .. } => Some(*status),
            Self::Connectivity(_) | Self::Storage(_) | Self::Decode(_) => None,
        }
    }

    /// 后端或客户端给出的原始说明
    pub fn detail(&self) -> &str {
        match self {
            Self::Connectivity(d)
            | Self::Unauthenticated(d)
            | Self::Forbidden(d)
            | Self::Validation(d)
            | Self::DuplicatePeriod(d)
            | Self::ForbiddenTransition(d)
            | Self::NotFound(d)
            | Self::Conflict(d)
            | Self::Storage(d)
            | Self::Decode(d) => d,
            Self::Backend { detail, .. } => detail,
        }
    }

    /// 面向用户的可读提示
    pub fn user_message(&self) -> String {
        match self {
            Self::Connectivity(_) => {
                "Cannot reach the server. Check your network connection and try again.".to_string()
            }
            Self::Unauthenticated(_) => "Your session has ended. Please log in again.".to_string(),
            Self::Forbidden(_) => "You do not have permission to perform this action.".to_string(),
            Self::Validation(detail) => detail.clone(),
            Self::DuplicatePeriod(_) => {
                "A session volume already exists for this customer and month.".to_string()
            }
            Self::ForbiddenTransition(detail) => {
                format!("This session volume cannot be changed in its current status ({detail}).")
            }
            Self::NotFound(_) => "The requested record was not found.".to_string(),
            Self::Conflict(detail) => detail.clone(),
            Self::Backend { status, detail } => {
                format!("The server reported an error ({status}): {detail}")
            }
            Self::Storage(_) => "Local storage is unavailable.".to_string(),
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    pub fn is_duplicate_period(&self) -> bool {
        matches!(self, Self::DuplicatePeriod(_))
    }

    pub fn is_forbidden_transition(&self) -> bool {
        matches!(self, Self::ForbiddenTransition(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// 后端错误响应体
///
/// `detail` 可能是字符串，也可能是字段校验错误列表。
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_detail(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| {
                        item.get("msg")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                            .or_else(|| item.as_str().map(str::to_string))
                    })
                    .collect();
                if messages.is_empty() {
                    self.message
                } else {
                    Some(messages.join("; "))
                }
            }
            Some(serde_json::Value::Null) | None => self.message,
            Some(other) => Some(other.to_string()),
        }
    }
}

/// 从原始响应体中提取错误说明
pub fn detail_from_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    serde_json::from_str::<ErrorBody>(trimmed)
        .ok()
        .and_then(ErrorBody::into_detail)
        .unwrap_or_else(|| trimmed.to_string())
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(ApiError::from_status(400, "x"), ApiError::Validation(_)));
        assert!(matches!(ApiError::from_status(422, "x"), ApiError::Validation(_)));
        assert!(ApiError::from_status(401, "x").is_unauthenticated());
        assert!(matches!(ApiError::from_status(403, "x"), ApiError::Forbidden(_)));
        assert!(matches!(ApiError::from_status(404, "x"), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(409, "x"), ApiError::Conflict(_)));
        assert_eq!(
            ApiError::from_status(502, "bad gateway"),
            ApiError::backend(502, "bad gateway")
        );
    }

    #[test]
    fn test_detail_string() {
        let body = r#"{"detail": "Session volume already exists for this period"}"#;
        assert_eq!(
            detail_from_body(body),
            "Session volume already exists for this period"
        );
    }

    #[test]
    fn test_detail_validation_list() {
        let body = r#"{"detail": [{"loc": ["body", "notes"], "msg": "field required"},
                                  {"loc": ["body", "plans"], "msg": "field required"}]}"#;
        assert_eq!(detail_from_body(body), "field required; field required");
    }

    #[test]
    fn test_detail_message_fallback() {
        assert_eq!(detail_from_body(r#"{"message": "nope"}"#), "nope");
        assert_eq!(detail_from_body("plain text"), "plain text");
        assert_eq!(detail_from_body("   "), "<empty body>");
    }

    #[test]
    fn test_user_messages_distinguish_lifecycle_errors() {
        let duplicate = ApiError::duplicate_period("exists");
        let transition = ApiError::forbidden_transition("approved");
        let generic = ApiError::backend(500, "boom");

        assert_ne!(duplicate.user_message(), generic.user_message());
        assert_ne!(transition.user_message(), generic.user_message());
        assert!(transition.user_message().contains("approved"));
        assert!(duplicate.is_duplicate_period());
        assert!(transition.is_forbidden_transition());
    }

    #[test]
    fn test_client_side_errors_have_no_status() {
        assert_eq!(ApiError::connectivity("timeout").status_code(), None);
        assert_eq!(ApiError::storage("disk").status_code(), None);
        assert_eq!(ApiError::not_found("x").status_code(), Some(404));
    }
}
