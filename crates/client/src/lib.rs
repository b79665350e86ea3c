//! bodyback-client - 健身训练服务的 API 客户端
//!
//! 所有请求都经过 [`RequestGateway`]：附加 Bearer 凭据，遇到 401 时
//! 通过 [`RefreshCoordinator`] 单飞刷新令牌并重放一次。各业务服务
//! （认证、用户、档案、课时量、教练、二维码）都建立在网关之上。

pub mod client;
pub mod gateway;
pub mod paths;
pub mod refresh;
pub mod services;
pub mod token_store;

pub use client::BodybackClient;
pub use gateway::RequestGateway;
pub use refresh::RefreshCoordinator;
pub use services::*;
pub use token_store::TokenStorage;

pub use bodyback_errors::{ApiError, ApiResult};
