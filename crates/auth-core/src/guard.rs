//! 页面访问守卫
//!
//! 纯函数：(身份, 允许的角色) → 放行或重定向，不依赖任何导航库。

use crate::{Role, SessionIdentity};

/// 重定向目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    CustomerDashboard,
    TrainerDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::CustomerDashboard => "/customer/dashboard",
            Self::TrainerDashboard => "/trainer/dashboard",
        }
    }
}

/// 守卫结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Permit,
    Redirect(Route),
}

/// 角色对应的首页；未知角色或无角色返回 None
pub fn home_route(role: Option<&Role>) -> Option<Route> {
    match role {
        Some(Role::Customer) => Some(Route::CustomerDashboard),
        Some(Role::Trainer) => Some(Route::TrainerDashboard),
        _ => None,
    }
}

/// 检查当前身份能否进入受保护页面
///
/// `allowed_roles` 为空表示只要求已登录，角色比较不区分大小写。
pub fn check_access(identity: Option<&SessionIdentity>, allowed_roles: &[&str]) -> Access {
    let Some(identity) = identity else {
        return Access::Redirect(Route::Login);
    };

    if allowed_roles.is_empty() {
        return Access::Permit;
    }

    let role = identity.role();
    let permitted = role.as_ref().is_some_and(|role| {
        allowed_roles
            .iter()
            .any(|allowed| Role::parse(allowed) == *role)
    });

    if permitted {
        Access::Permit
    } else {
        Access::Redirect(home_route(role.as_ref()).unwrap_or(Route::Login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyback_common::UserId;
    use uuid::Uuid;

    fn identity(role: Option<&str>) -> SessionIdentity {
        SessionIdentity {
            user_id: UserId::from_uuid(Uuid::nil()),
            email: "user@example.com".to_string(),
            role: role.map(str::to_string),
            status: 1,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        assert_eq!(check_access(None, &["trainer"]), Access::Redirect(Route::Login));
        assert_eq!(check_access(None, &[]), Access::Redirect(Route::Login));
    }

    #[test]
    fn test_no_role_restriction_permits() {
        assert_eq!(check_access(Some(&identity(None)), &[]), Access::Permit);
    }

    #[test]
    fn test_matching_role_permits_case_insensitively() {
        let trainer = identity(Some("Trainer"));
        assert_eq!(check_access(Some(&trainer), &["TRAINER"]), Access::Permit);
        assert_eq!(
            check_access(Some(&trainer), &["customer", "trainer"]),
            Access::Permit
        );
    }

    #[test]
    fn test_wrong_role_redirects_home() {
        assert_eq!(
            check_access(Some(&identity(Some("customer"))), &["trainer"]),
            Access::Redirect(Route::CustomerDashboard)
        );
        assert_eq!(
            check_access(Some(&identity(Some("trainer"))), &["customer"]),
            Access::Redirect(Route::TrainerDashboard)
        );
    }

    #[test]
    fn test_unknown_or_missing_role_redirects_to_login() {
        assert_eq!(
            check_access(Some(&identity(Some("admin"))), &["trainer"]),
            Access::Redirect(Route::Login)
        );
        assert_eq!(
            check_access(Some(&identity(None)), &["trainer"]),
            Access::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/");
        assert_eq!(Route::TrainerDashboard.path(), "/trainer/dashboard");
        assert_eq!(home_route(Some(&Role::Customer)), Some(Route::CustomerDashboard));
        assert_eq!(home_route(None), None);
    }
}
