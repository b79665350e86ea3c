//! 令牌对

use secrecy::{ExposeSecret, Secret};

/// 访问令牌 + 刷新令牌
///
/// 两者总是一起替换，不会只更新其中一个。
#[derive(Debug, Clone)]
pub struct CredentialPair {
    access_token: Secret<String>,
    refresh_token: Secret<String>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token.into()),
            refresh_token: Secret::new(refresh_token.into()),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}
