//! 单飞令牌刷新协调器
//!
//! 同一时刻最多只有一次刷新在进行。刷新进行中到达的调用者进入等待队列，
//! 刷新结束后按加入顺序拿到同一个结果（新访问令牌或刷新错误）。

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bodyback_errors::{ApiError, ApiResult};
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Waiter = oneshot::Sender<ApiResult<String>>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
}

/// 刷新协调器，每个客户端实例持有一个
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<ApiResult<String>>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 是否有刷新正在进行
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// 正在等待刷新结果的调用者数量
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    /// 获取刷新后的访问令牌
    ///
    /// 没有刷新在进行时由当前调用者执行 `refresh`，否则排队等待正在进行的那次。
    pub async fn run<F, Fut>(&self, refresh: F) -> ApiResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<String>>,
    {
        let role = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                debug!(waiters = state.waiters.len(), "Joined in-flight token refresh");
                Role::Follower(rx)
            } else {
                state.refreshing = true;
                Role::Leader
            }
        };

        match role {
            Role::Follower(rx) => rx.await.unwrap_or_else(|_| {
                Err(ApiError::unauthenticated("token refresh was abandoned"))
            }),
            Role::Leader => {
                let mut flight = InFlight {
                    coordinator: self,
                    settled: false,
                };
                let result = refresh().await;
                flight.settle(&result);
                result
            }
        }
    }

    fn finish(&self, result: &ApiResult<String>) {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        debug!(
            waiters = waiters.len(),
            success = result.is_ok(),
            "Token refresh finished"
        );
        for waiter in waiters {
            // 等待方可能已被取消
            let _ = waiter.send(result.clone());
        }
    }
}

/// 刷新进行中的标记；领头的 future 被丢弃时复位状态并拒绝所有等待者
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, result: &ApiResult<String>) {
        self.settled = true;
        self.coordinator.finish(result);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Token refresh dropped before completion");
            self.coordinator
                .finish(&Err(ApiError::unauthenticated("token refresh was abandoned")));
        }
    }
}
