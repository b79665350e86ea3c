//! HTTP 传输 trait 定义

use async_trait::async_trait;
use bodyback_errors::{ApiError, ApiResult};
use http::Method;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 发往后端的请求（路径相对于 base URL）
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    bearer: Option<Secret<String>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// 设置 JSON 请求体
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// 值为 None 时不附加
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// 附加 Bearer 凭据（覆盖已有值）
    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(Secret::new(token.to_string()));
        self
    }

    pub fn set_bearer(&mut self, token: &str) {
        self.bearer = Some(Secret::new(token.to_string()));
    }

    /// `Authorization` 头的值
    pub fn authorization(&self) -> Option<String> {
        self.bearer
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret()))
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_ref().map(|t| t.expose_secret().as_str())
    }
}

/// 后端响应；非 2xx 也是正常返回，由调用方归类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 以 JSON 值构造（测试与假后端使用）
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// 解析响应体
    pub fn parse<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::decode(format!("invalid response body (status {}): {}", self.status, e))
        })
    }

    /// 转为归类后的错误
    pub fn into_error(self) -> ApiError {
        ApiError::from_response(self.status, &self.body)
    }

    /// 成功时解析，否则返回归类后的错误
    pub fn into_result<T: DeserializeOwned>(self) -> ApiResult<T> {
        if self.is_success() {
            self.parse()
        } else {
            Err(self.into_error())
        }
    }
}

/// HTTP 传输
///
/// 只有请求没有到达后端时才返回错误（[`ApiError::Connectivity`]），
/// 任何 HTTP 状态码都以 [`ApiResponse`] 返回。
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}
