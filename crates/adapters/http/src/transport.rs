//! reqwest transport implementation

use std::time::Duration;

use async_trait::async_trait;
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::{ApiRequest, ApiResponse, HttpTransport};
use tracing::debug;
use url::Url;

use crate::error::map_reqwest_error;

/// HTTP transport backed by a pooled [`reqwest::Client`]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport with its own client and a fixed request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| map_reqwest_error(e, "Failed to build HTTP client"))?;
        Self::with_client(client, base_url)
    }

    /// Reuse an existing client (shares its connection pool and timeout)
    pub fn with_client(client: reqwest::Client, base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::validation(format!("Invalid base URL '{}': {}", base_url, e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a backend path against the base URL, keeping any base path prefix
    pub fn url_for(&self, path: &str) -> ApiResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| ApiError::validation(format!("Invalid request path '{}': {}", path, e)))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = self.url_for(&request.path)?;
        let context = format!("{} {}", request.method, request.path);

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(authorization) = request.authorization() {
            builder = builder.header(http::header::AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &context))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, &context))?;

        debug!(method = %request.method, path = %request.path, status, "Backend responded");
        Ok(ApiResponse::new(status, body))
    }
}
