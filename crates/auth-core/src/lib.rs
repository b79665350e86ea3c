//! bodyback-auth-core - 认证核心库
//!
//! 令牌对、缓存的会话身份、角色以及页面访问守卫

mod credentials;
mod guard;
mod identity;

pub use credentials::*;
pub use guard::*;
pub use identity::*;
