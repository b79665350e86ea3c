//! 认证服务

use std::sync::Arc;

use bodyback_auth_core::{CredentialPair, SessionIdentity};
use bodyback_common::UserId;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::ApiRequest;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::MessageResponse;
use crate::gateway::RequestGateway;
use crate::paths;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// 登录响应
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    pub token_type: String,
    pub user_id: UserId,
    pub email: String,
    pub role: Option<String>,
    pub status: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl LoginResponse {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair::new(
            self.access_token.expose_secret().as_str(),
            self.refresh_token.expose_secret().as_str(),
        )
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role.clone(),
            status: self.status,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

fn require(value: &str, what: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        Err(ApiError::validation(format!("{what} is required")))
    } else {
        Ok(())
    }
}

/// 认证服务
#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<RequestGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// 邮箱密码登录，成功后保存令牌对与身份快照
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<SessionIdentity> {
        require(email, "email")?;
        require(password, "password")?;
        let email = email.trim().to_lowercase();

        let request = ApiRequest::post(paths::AUTH_LOGIN).json(&LoginRequest {
            email: &email,
            password,
        })?;

        let response = self.gateway.send_public(request).await.map_err(|e| match e {
            ApiError::Unauthenticated(_) => ApiError::unauthenticated("Incorrect email or password"),
            ApiError::Forbidden(_) => ApiError::forbidden("Account is inactive or suspended"),
            other => other,
        })?;
        let login: LoginResponse = response.parse()?;

        let identity = login.identity();
        let tokens = self.gateway.tokens();
        tokens.set_tokens(&login.credentials()).await?;
        tokens.set_identity(&identity).await?;

        info!(user_id = %identity.user_id, role = ?identity.role, "Logged in");
        Ok(identity)
    }

    /// 退出登录；后端调用失败时仍会清除本地数据
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(e) = self.gateway.send(ApiRequest::post(paths::AUTH_LOGOUT)).await {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        self.gateway.tokens().clear_all().await?;
        info!("Logged out");
        Ok(())
    }

    /// 主动刷新令牌
    pub async fn refresh(&self) -> ApiResult<()> {
        self.gateway.refresh_now().await.map(|_| ())
    }

    /// 两个令牌都存在即视为已登录
    pub async fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.gateway.tokens().credentials().await?.is_some())
    }

    /// 缓存的身份快照
    pub async fn current_user(&self) -> ApiResult<Option<SessionIdentity>> {
        self.gateway.tokens().identity().await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        require(current_password, "current password")?;
        require(new_password, "new password")?;
        let request = ApiRequest::post(paths::AUTH_CHANGE_PASSWORD).json(&ChangePasswordRequest {
            current_password,
            new_password,
        })?;
        self.gateway.send_json(request).await
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<MessageResponse> {
        require(email, "email")?;
        let email = email.trim().to_lowercase();
        let request = ApiRequest::post(paths::AUTH_FORGOT_PASSWORD)
            .json(&ForgotPasswordRequest { email: &email })?;
        self.gateway.send_public(request).await?.parse()
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResult<MessageResponse> {
        require(token, "reset token")?;
        require(new_password, "new password")?;
        let request = ApiRequest::post(paths::AUTH_RESET_PASSWORD)
            .json(&ResetPasswordRequest { token, new_password })?;
        self.gateway.send_public(request).await?.parse()
    }
}
