//! 会话身份快照

use bodyback_common::UserId;
use serde::{Deserialize, Serialize};

/// 已知角色
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Trainer,
    Customer,
    Other(String),
}

impl Role {
    /// 大小写不敏感解析
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "trainer" => Self::Trainer,
            "customer" => Self::Customer,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Trainer => "trainer",
            Self::Customer => "customer",
            Self::Other(name) => name,
        }
    }
}

/// 登录用户的反规范化快照，与令牌一同持久化
///
/// 应用启动时读取它来决定路由，不需要访问网络。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub email: String,
    pub role: Option<String>,
    pub status: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl SessionIdentity {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().map(Role::parse)
    }

    pub fn is_trainer(&self) -> bool {
        self.role() == Some(Role::Trainer)
    }

    pub fn is_customer(&self) -> bool {
        self.role() == Some(Role::Customer)
    }

    /// 姓名，缺失时退回邮箱
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}
