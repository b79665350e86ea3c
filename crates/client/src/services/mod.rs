//! 业务服务，全部通过 [`crate::RequestGateway`] 访问后端

mod auth;
mod profiles;
mod qr_codes;
mod session_volumes;
mod trainers;
mod users;

pub use auth::*;
pub use profiles::*;
pub use qr_codes::*;
pub use session_volumes::*;
pub use trainers::*;
pub use users::*;

use serde::Deserialize;

/// 后端返回的简单消息
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
