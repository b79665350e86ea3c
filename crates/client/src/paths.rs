//! 后端接口路径

use bodyback_common::{SessionVolumeId, UserId};

pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
pub const AUTH_REFRESH: &str = "/api/v1/auth/refresh";
pub const AUTH_LOGOUT: &str = "/api/v1/auth/logout";
pub const AUTH_CHANGE_PASSWORD: &str = "/api/v1/auth/change-password";
pub const AUTH_FORGOT_PASSWORD: &str = "/api/v1/auth/forgot-password";
pub const AUTH_RESET_PASSWORD: &str = "/api/v1/auth/reset-password";

pub const USERS_ME: &str = "/api/v1/users/me";
pub const PROFILES_ME: &str = "/api/v1/profiles/me";
pub const SESSION_VOLUMES: &str = "/api/v1/session-volumes";
pub const TRAINER_STATS_ME: &str = "/api/v1/trainers/me/stats";
pub const QR_CODES_ME: &str = "/api/v1/qr-codes/me";
pub const QR_CODES_SCAN: &str = "/api/v1/qr-codes/scan";

pub fn user(id: UserId) -> String {
    format!("/api/v1/users/{id}")
}

pub fn profile(user_id: UserId) -> String {
    format!("/api/v1/profiles/{user_id}")
}

pub fn session_volume(id: SessionVolumeId) -> String {
    format!("{SESSION_VOLUMES}/{id}")
}

pub fn session_volumes_for_period(year: i32, month: u32) -> String {
    format!("{SESSION_VOLUMES}/period/{year}/{month}")
}

pub fn approve_session_volume(id: SessionVolumeId) -> String {
    format!("{SESSION_VOLUMES}/{id}/approve")
}

pub fn reject_session_volume(id: SessionVolumeId) -> String {
    format!("{SESSION_VOLUMES}/{id}/reject")
}

pub fn trainer_customers(trainer_id: UserId) -> String {
    format!("/api/v1/trainers/{trainer_id}/customers")
}

pub fn qr_code_image(token: &str) -> String {
    format!("/api/v1/qr-codes/image/{token}")
}
