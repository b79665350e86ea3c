//! 二维码签到

use std::sync::Arc;

use bodyback_common::UserId;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::ApiRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::RequestGateway;
use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeDisplay {
    pub token: String,
    pub qr_url: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub instructions: String,
}

/// 扫码结果；只做校验，不产生课时记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanQrCodeResponse {
    pub valid: bool,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub message: String,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    token: &'a str,
}

#[derive(Clone)]
pub struct QrCodeService {
    gateway: Arc<RequestGateway>,
    base_url: String,
}

impl QrCodeService {
    pub fn new(gateway: Arc<RequestGateway>, base_url: impl Into<String>) -> Self {
        Self {
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 当前用户的二维码，不存在时由后端创建
    pub async fn my_code(&self) -> ApiResult<QrCodeDisplay> {
        self.gateway.send_json(ApiRequest::get(paths::QR_CODES_ME)).await
    }

    /// 二维码图片的完整地址
    pub fn image_url(&self, token: &str) -> String {
        format!("{}{}", self.base_url, paths::qr_code_image(token))
    }

    /// 教练扫描客户二维码
    pub async fn scan(&self, token: &str) -> ApiResult<ScanQrCodeResponse> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::validation("QR code token is required"));
        }
        let request = ApiRequest::post(paths::QR_CODES_SCAN).json(&ScanRequest { token })?;
        self.gateway.send_json(request).await
    }
}
