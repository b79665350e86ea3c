//! 测试用内存后端
//!
//! 模拟令牌签发与轮换、课时量记录及其状态机。可以让访问令牌失效、
//! 让刷新失败，或者把刷新挂起直到累计若干次 401。

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bodyback_adapter_storage::MemoryStore;
use bodyback_client::{paths, BodybackClient};
use bodyback_common::{SessionVolumeId, Timestamps, UserId};
use bodyback_domain_core::{
    Actor, DecisionRequest, Period, SessionVolume, SessionVolumeCreate, SessionVolumeStatus,
    SessionVolumeUpdate,
};
use bodyback_errors::{ApiError, ApiResult};
use bodyback_ports::{ApiRequest, ApiResponse, HttpTransport};
use chrono::Utc;
use http::Method;
use serde_json::{json, Value};
use tokio::sync::watch;
use uuid::Uuid;

pub const BASE_URL: &str = "http://backend.test";
pub const TRAINER_EMAIL: &str = "coach@example.com";
pub const CUSTOMER_EMAIL: &str = "client@example.com";
pub const PASSWORD: &str = "correct-horse";

pub fn trainer_id() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0x7a1))
}

pub fn customer_id() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0xc05))
}

struct FakeUser {
    id: UserId,
    email: &'static str,
    role: &'static str,
    first_name: &'static str,
}

fn users() -> [FakeUser; 2] {
    [
        FakeUser {
            id: trainer_id(),
            email: TRAINER_EMAIL,
            role: "trainer",
            first_name: "Alex",
        },
        FakeUser {
            id: customer_id(),
            email: CUSTOMER_EMAIL,
            role: "customer",
            first_name: "Sam",
        },
    ]
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
}

struct Session {
    user: UserId,
    access_token: String,
    refresh_token: String,
}

struct State {
    generation: u32,
    sessions: Vec<Session>,
    volumes: Vec<SessionVolume>,
    requests: Vec<RecordedRequest>,
}

impl State {
    fn next_pair(&mut self) -> (String, String) {
        self.generation += 1;
        (
            format!("access-{}", self.generation),
            format!("refresh-{}", self.generation),
        )
    }

    /// 为用户签发新会话，替换已有会话
    fn sign_in(&mut self, user: UserId) -> (String, String) {
        let (access, refresh) = self.next_pair();
        self.sessions.retain(|s| s.user != user);
        self.sessions.push(Session {
            user,
            access_token: access.clone(),
            refresh_token: refresh.clone(),
        });
        (access, refresh)
    }

    /// 刷新令牌只能使用一次
    fn rotate(&mut self, refresh_token: &str) -> Option<(String, String)> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.refresh_token == refresh_token)?;
        let (access, refresh) = self.next_pair();
        let session = &mut self.sessions[index];
        session.access_token = access.clone();
        session.refresh_token = refresh.clone();
        Some((access, refresh))
    }
}

pub struct FakeBackend {
    state: Mutex<State>,
    refresh_calls: AtomicUsize,
    hold_refresh_until: AtomicUsize,
    rejected: watch::Sender<usize>,
    fail_refresh: AtomicBool,
    fail_logout: AtomicBool,
    offline: AtomicBool,
}

fn error(status: u16, detail: impl Into<String>) -> ApiResponse {
    ApiResponse::json(status, &json!({ "detail": detail.into() }))
}

fn to_response<T: serde::Serialize>(status: u16, value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(json) => ApiResponse::json(status, &json),
        Err(e) => error(500, e.to_string()),
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let (rejected, _) = watch::channel(0);
        Arc::new(Self {
            state: Mutex::new(State {
                generation: 0,
                sessions: Vec::new(),
                volumes: Vec::new(),
                requests: Vec::new(),
            }),
            refresh_calls: AtomicUsize::new(0),
            hold_refresh_until: AtomicUsize::new(0),
            rejected,
            fail_refresh: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            offline: AtomicBool::new(false),
        })
    }

    /// 新建一个使用该后端与内存存储的客户端
    pub fn client(self: &Arc<Self>) -> (BodybackClient, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let client = BodybackClient::new(self.clone(), store.clone(), BASE_URL);
        (client, store)
    }

    /// 登录后的客户端
    pub async fn signed_in(self: &Arc<Self>, email: &str) -> (BodybackClient, Arc<MemoryStore>) {
        let (client, store) = self.client();
        client
            .auth()
            .login(email, PASSWORD)
            .await
            .expect("login against fake backend");
        (client, store)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn rejected_count(&self) -> usize {
        *self.rejected.borrow()
    }

    /// 让所有访问令牌失效，刷新令牌仍然有效
    pub fn expire_access_tokens(&self) {
        for session in self.lock().sessions.iter_mut() {
            session.access_token = format!("revoked-{}", session.access_token);
        }
    }

    /// 刷新请求挂起，直到后端累计返回 `count` 次 401
    pub fn hold_refresh_until_rejections(&self, count: usize) {
        self.hold_refresh_until.store(count, Ordering::SeqCst);
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// 模拟网络不可达：所有请求返回连接错误
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn has_session(&self, user: UserId) -> bool {
        self.lock().sessions.iter().any(|s| s.user == user)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn volume(&self, id: SessionVolumeId) -> Option<SessionVolume> {
        self.lock().volumes.iter().find(|v| v.id == id).cloned()
    }

    /// 直接写入一条记录（教练 -> 客户）
    pub fn seed_volume(&self, period: Period, status: SessionVolumeStatus) -> SessionVolumeId {
        let volume = SessionVolume {
            id: SessionVolumeId::from_uuid(Uuid::new_v4()),
            trainer_id: trainer_id(),
            customer_id: customer_id(),
            period,
            session_count: 6,
            plans: Some("Mobility and strength".to_string()),
            notes: Some("Consistent attendance".to_string()),
            status,
            timestamps: Timestamps::now(),
            customer: None,
            trainer: None,
        };
        let id = volume.id;
        self.lock().volumes.push(volume);
        id
    }

    async fn refresh(&self, request: &ApiRequest) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let target = self.hold_refresh_until.load(Ordering::SeqCst);
        if target > 0 {
            let mut seen = self.rejected.subscribe();
            let _ = seen.wait_for(|count| *count >= target).await;
        }

        let presented = request
            .body
            .as_ref()
            .and_then(|body| body.get("refresh_token"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if self.fail_refresh.load(Ordering::SeqCst) {
            return error(401, "Invalid refresh token");
        }
        let rotated = presented.and_then(|token| self.lock().rotate(&token));
        let Some((access, refresh)) = rotated else {
            return error(401, "Invalid refresh token");
        };
        ApiResponse::json(
            200,
            &json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer" }),
        )
    }

    fn authenticate(&self, request: &ApiRequest) -> Result<UserId, ApiResponse> {
        let user = request.bearer_token().and_then(|token| {
            self.lock()
                .sessions
                .iter()
                .find(|s| s.access_token == token)
                .map(|s| s.user)
        });
        user.ok_or_else(|| {
            self.rejected.send_modify(|count| *count += 1);
            error(401, "Could not validate credentials")
        })
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let method = request.method.as_str();
        let segments: Vec<&str> = request
            .path
            .trim_start_matches("/api/v1/")
            .split('/')
            .collect();

        match (method, segments.as_slice()) {
            ("POST", ["auth", "login"]) => return self.login(request),
            ("POST", ["auth", "forgot-password"]) => {
                return ApiResponse::json(200, &json!({ "message": "Reset email sent" }));
            }
            _ => {}
        }

        let user = match self.authenticate(request) {
            Ok(user) => user,
            Err(response) => return response,
        };

        match (method, segments.as_slice()) {
            ("POST", ["auth", "logout"]) => {
                if self.fail_logout.load(Ordering::SeqCst) {
                    error(500, "Logout failed")
                } else {
                    self.lock().sessions.retain(|s| s.user != user);
                    ApiResponse::json(200, &json!({ "message": "Successfully logged out" }))
                }
            }
            ("GET", ["users", "me"]) => self.me(user),
            ("POST", ["session-volumes"]) => self.create_volume(user, request),
            ("GET", ["session-volumes"]) => self.list_volumes(request),
            ("GET", ["session-volumes", id]) => self.get_volume(id),
            ("PUT", ["session-volumes", id]) => self.update_volume(user, id, request),
            ("DELETE", ["session-volumes", id]) => self.delete_volume(user, id),
            ("POST", ["session-volumes", id, "approve"]) => {
                self.decide(user, id, request, SessionVolumeStatus::Approved)
            }
            ("POST", ["session-volumes", id, "reject"]) => {
                self.decide(user, id, request, SessionVolumeStatus::Rejected)
            }
            ("GET", ["trainers", "me", "stats"]) => self.stats(user),
            _ => error(404, "Not Found"),
        }
    }

    fn login(&self, request: &ApiRequest) -> ApiResponse {
        let field = |name: &str| {
            request
                .body
                .as_ref()
                .and_then(|b| b.get(name))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let (email, password) = (field("email"), field("password"));

        let Some(user) = users().into_iter().find(|u| u.email == email) else {
            return error(401, "Incorrect email or password");
        };
        if password != PASSWORD {
            return error(401, "Incorrect email or password");
        }

        let (access, refresh) = self.lock().sign_in(user.id);
        ApiResponse::json(
            200,
            &json!({
                "access_token": access,
                "refresh_token": refresh,
                "token_type": "bearer",
                "user_id": user.id,
                "email": user.email,
                "role": user.role,
                "status": 1,
                "first_name": user.first_name,
                "last_name": null
            }),
        )
    }

    fn me(&self, user: UserId) -> ApiResponse {
        match users().into_iter().find(|u| u.id == user) {
            Some(u) => ApiResponse::json(
                200,
                &json!({
                    "id": u.id,
                    "email": u.email,
                    "first_name": u.first_name,
                    "last_name": null,
                    "phone_number": null,
                    "location": null
                }),
            ),
            None => error(404, "User not found"),
        }
    }

    fn find(&self, raw_id: &str) -> Result<SessionVolume, ApiResponse> {
        let not_found = || error(404, "Session volume not found");
        let id = SessionVolumeId::from_string(raw_id).map_err(|_| not_found())?;
        self.lock()
            .volumes
            .iter()
            .find(|v| v.id == id && !v.is_deleted())
            .cloned()
            .ok_or_else(not_found)
    }

    fn store(&self, volume: &SessionVolume) {
        let mut state = self.lock();
        if let Some(slot) = state.volumes.iter_mut().find(|v| v.id == volume.id) {
            *slot = volume.clone();
        }
    }

    fn create_volume(&self, user: UserId, request: &ApiRequest) -> ApiResponse {
        let create: SessionVolumeCreate = match request.body.clone().map(serde_json::from_value) {
            Some(Ok(create)) => create,
            _ => return error(422, "Invalid session volume payload"),
        };
        if create.trainer_id != user {
            return error(403, "Only trainers can create session volumes for themselves");
        }

        let mut state = self.lock();
        let duplicate = state.volumes.iter().any(|v| {
            !v.is_deleted()
                && v.trainer_id == create.trainer_id
                && v.customer_id == create.customer_id
                && v.period == create.period
        });
        if duplicate {
            return error(400, "Session volume already exists for this period");
        }

        let volume = SessionVolume {
            id: SessionVolumeId::from_uuid(Uuid::new_v4()),
            trainer_id: create.trainer_id,
            customer_id: create.customer_id,
            period: create.period,
            session_count: create.session_count,
            plans: create.plans.clone(),
            notes: create.notes.clone(),
            status: create.effective_status(),
            timestamps: Timestamps::now(),
            customer: None,
            trainer: None,
        };
        state.volumes.push(volume.clone());
        to_response(201, &volume)
    }

    fn list_volumes(&self, request: &ApiRequest) -> ApiResponse {
        let param = |name: &str| {
            request
                .query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        let customer = param("customer_id");
        let trainer = param("trainer_id");
        let status = param("status");

        let volumes: Vec<SessionVolume> = self
            .lock()
            .volumes
            .iter()
            .filter(|v| !v.is_deleted())
            .filter(|v| customer.as_ref().is_none_or(|c| *c == v.customer_id.to_string()))
            .filter(|v| trainer.as_ref().is_none_or(|t| *t == v.trainer_id.to_string()))
            .filter(|v| status.as_ref().is_none_or(|s| s == v.status.as_str()))
            .cloned()
            .collect();
        to_response(200, &volumes)
    }

    fn get_volume(&self, raw_id: &str) -> ApiResponse {
        match self.find(raw_id) {
            Ok(volume) => to_response(200, &volume),
            Err(response) => response,
        }
    }

    fn update_volume(&self, user: UserId, raw_id: &str, request: &ApiRequest) -> ApiResponse {
        let volume = match self.find(raw_id) {
            Ok(volume) => volume,
            Err(response) => return response,
        };
        if volume.trainer_id != user {
            return error(403, "Not authorized to update this session volume");
        }
        if !volume.status.is_trainer_editable() {
            return error(
                400,
                format!("Cannot update session volume in status {}", volume.status),
            );
        }
        let update: SessionVolumeUpdate = match request.body.clone().map(serde_json::from_value) {
            Some(Ok(update)) => update,
            _ => return error(422, "Invalid session volume payload"),
        };
        if let Some(to) = update.status {
            if !volume.status.can_transition(to, Actor::Trainer) {
                return error(
                    400,
                    format!("Cannot transition session volume from {} to {to}", volume.status),
                );
            }
        }

        let mut updated = volume.merged_with(&update);
        updated.timestamps.updated_at = Utc::now();
        self.store(&updated);
        to_response(200, &updated)
    }

    fn delete_volume(&self, user: UserId, raw_id: &str) -> ApiResponse {
        let mut volume = match self.find(raw_id) {
            Ok(volume) => volume,
            Err(response) => return response,
        };
        if volume.trainer_id != user {
            return error(403, "Not authorized to delete this session volume");
        }
        volume.timestamps.deleted_at = Some(Utc::now());
        self.store(&volume);
        ApiResponse::json(200, &json!({ "message": "Session volume deleted" }))
    }

    fn decide(
        &self,
        user: UserId,
        raw_id: &str,
        request: &ApiRequest,
        target: SessionVolumeStatus,
    ) -> ApiResponse {
        let mut volume = match self.find(raw_id) {
            Ok(volume) => volume,
            Err(response) => return response,
        };
        if volume.customer_id != user {
            return error(403, "Only the customer can review this session volume");
        }
        let (verb, done) = if target == SessionVolumeStatus::Approved {
            ("approve", "approved")
        } else {
            ("reject", "rejected")
        };
        if volume.check_decision(target).is_err() {
            return error(
                400,
                format!("Cannot {verb} session volume in status {}", volume.status),
            );
        }
        let decision: Option<DecisionRequest> = request
            .body
            .clone()
            .and_then(|body| serde_json::from_value(body).ok());
        let has_notes = decision
            .as_ref()
            .and_then(|d| d.notes.as_deref())
            .is_some_and(|n| !n.trim().is_empty());
        if target == SessionVolumeStatus::Rejected && !has_notes {
            return error(422, "Notes are required when rejecting");
        }

        volume.status = target;
        volume.timestamps.updated_at = Utc::now();
        self.store(&volume);
        ApiResponse::json(
            200,
            &json!({
                "success": true,
                "message": format!("Session volume {done}"),
                "new_status": target,
                "updated_at": volume.timestamps.updated_at
            }),
        )
    }

    fn stats(&self, user: UserId) -> ApiResponse {
        let state = self.lock();
        let mine: Vec<&SessionVolume> = state
            .volumes
            .iter()
            .filter(|v| v.trainer_id == user && !v.is_deleted())
            .collect();
        let mut customers: Vec<UserId> = mine.iter().map(|v| v.customer_id).collect();
        customers.sort_by_key(|id| id.0);
        customers.dedup();
        ApiResponse::json(
            200,
            &json!({
                "trainer_id": user,
                "total_customers": customers.len(),
                "active_customers": customers.len(),
                "total_sessions": mine.iter().map(|v| v.session_count).sum::<u32>(),
                "sessions_this_month": 0
            }),
        )
    }
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::connectivity("connection refused"));
        }
        self.lock().requests.push(RecordedRequest {
            method: request.method.clone(),
            path: request.path.clone(),
            bearer: request.bearer_token().map(str::to_string),
        });

        if request.method == Method::POST && request.path == paths::AUTH_REFRESH {
            return Ok(self.refresh(&request).await);
        }
        Ok(self.handle(&request))
    }
}
