//! 认证请求网关
//!
//! 每个发往后端的请求都经过这里：附加当前访问令牌；收到 401 且尚未重试时，
//! 经 [`RefreshCoordinator`] 取得新令牌后重放一次；重放仍 401 则返回认证失败。

use std::sync::Arc;

use bodyback_auth_core::CredentialPair;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::{ApiRequest, ApiResponse, HttpTransport};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::paths;
use crate::refresh::RefreshCoordinator;
use crate::token_store::TokenStorage;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: Secret<String>,
    refresh_token: Secret<String>,
}

/// 认证请求网关
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStorage,
    coordinator: RefreshCoordinator,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStorage) -> Self {
        Self {
            transport,
            tokens,
            coordinator: RefreshCoordinator::new(),
        }
    }

    pub fn tokens(&self) -> &TokenStorage {
        &self.tokens
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// 发送需要认证的请求
    ///
    /// 成功（2xx）时返回响应，其余状态归类为 [`ApiError`]。
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        if let Some(token) = self.tokens.access_token().await? {
            request.set_bearer(&token);
        }

        let response = self.transport.execute(request.clone()).await?;
        if !response.is_unauthorized() {
            return Self::finish(response);
        }

        debug!(method = %request.method, path = %request.path, "Access token rejected");
        let token = self.renewed_token(request.bearer_token()).await?;
        request.set_bearer(&token);

        let retried = self.transport.execute(request.clone()).await?;
        if retried.is_unauthorized() {
            warn!(method = %request.method, path = %request.path, "Request rejected after token refresh");
            return Err(ApiError::unauthenticated(bodyback_errors::detail_from_body(
                &retried.body,
            )));
        }
        Self::finish(retried)
    }

    /// 发送认证请求并解析 JSON 响应
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        self.send(request).await?.parse()
    }

    /// 发送不需要凭据的请求（登录、找回密码等），不做 401 恢复
    pub async fn send_public(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let response = self.transport.execute(request).await?;
        Self::finish(response)
    }

    /// 立即刷新令牌，与正在进行的刷新合并
    pub async fn refresh_now(&self) -> ApiResult<String> {
        self.coordinator.run(|| self.exchange_refresh_token()).await
    }

    /// 为被拒绝的请求取得可用的访问令牌
    ///
    /// 请求发出后令牌已被其他调用者换新时直接使用新令牌，不再发起刷新。
    async fn renewed_token(&self, rejected: Option<&str>) -> ApiResult<String> {
        if let Some(current) = self.tokens.access_token().await? {
            if Some(current.as_str()) != rejected {
                debug!("Access token already renewed, replaying");
                return Ok(current);
            }
        }
        self.coordinator.run(|| self.exchange_refresh_token()).await
    }

    /// 用刷新令牌换取新的令牌对；任何失败都会清除本地凭据
    async fn exchange_refresh_token(&self) -> ApiResult<String> {
        let Some(refresh_token) = self.tokens.refresh_token().await? else {
            info!("No refresh token stored, ending session");
            self.clear_session().await;
            return Err(ApiError::unauthenticated("no refresh token available"));
        };

        let result = self.request_token_pair(&refresh_token).await;
        match result {
            Ok(pair) => {
                self.tokens.set_tokens(&pair).await?;
                info!("Access token refreshed");
                Ok(pair.access_token().to_string())
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.clear_session().await;
                Err(e)
            }
        }
    }

    async fn request_token_pair(&self, refresh_token: &str) -> ApiResult<CredentialPair> {
        let request = ApiRequest::post(paths::AUTH_REFRESH).json(&RefreshRequest { refresh_token })?;
        let response = self.transport.execute(request).await?;
        let tokens: RefreshResponse = response.into_result()?;
        Ok(CredentialPair::new(
            tokens.access_token.expose_secret().as_str(),
            tokens.refresh_token.expose_secret().as_str(),
        ))
    }

    async fn clear_session(&self) {
        if let Err(e) = self.tokens.clear_all().await {
            warn!(error = %e, "Failed to clear stored credentials");
        }
    }

    fn finish(response: ApiResponse) -> ApiResult<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(response.into_error())
        }
    }
}
