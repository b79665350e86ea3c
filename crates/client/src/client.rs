//! 客户端入口

use std::sync::Arc;

use bodyback_ports::{HttpTransport, KeyValueStore};

use crate::gateway::RequestGateway;
use crate::services::{
    AuthService, ProfileService, QrCodeService, SessionVolumeService, TrainerService, UserService,
};
use crate::token_store::TokenStorage;

/// 组装网关与各业务服务
///
/// 所有服务共享同一个 [`RequestGateway`]，因此共享同一个刷新协调器：
/// 不同服务同时遇到 401 时也只会刷新一次。
#[derive(Clone)]
pub struct BodybackClient {
    gateway: Arc<RequestGateway>,
    base_url: String,
}

impl BodybackClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        base_url: impl Into<String>,
    ) -> Self {
        let gateway = RequestGateway::new(transport, TokenStorage::new(store));
        Self {
            gateway: Arc::new(gateway),
            base_url: base_url.into(),
        }
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    pub fn tokens(&self) -> &TokenStorage {
        self.gateway.tokens()
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.gateway.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.gateway.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.gateway.clone())
    }

    pub fn session_volumes(&self) -> SessionVolumeService {
        SessionVolumeService::new(self.gateway.clone())
    }

    pub fn trainers(&self) -> TrainerService {
        TrainerService::new(self.gateway.clone())
    }

    pub fn qr_codes(&self) -> QrCodeService {
        QrCodeService::new(self.gateway.clone(), self.base_url.clone())
    }
}
