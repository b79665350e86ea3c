//! 课时量状态机
//!
//! 权威状态在后端，这里只描述客户端允许发起的流转：
//!
//! | 状态 | 谁可以进入 | 教练可编辑 |
//! |---|---|---|
//! | draft | 教练（创建/编辑） | 是 |
//! | submitted | 教练，从 draft 或 rejected | 是（重新提交） |
//! | read | 客户，从 submitted | 否 |
//! | approved | 客户，从 submitted/read | 否 |
//! | rejected | 客户，从 submitted/read | 重新开放编辑 |

use std::fmt;
use std::str::FromStr;

use bodyback_errors::ApiError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionVolumeStatus {
    Draft,
    Submitted,
    Read,
    Approved,
    Rejected,
}

/// 发起流转的一方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Trainer,
    Customer,
}

impl SessionVolumeStatus {
    pub const ALL: [SessionVolumeStatus; 5] = [
        Self::Draft,
        Self::Submitted,
        Self::Read,
        Self::Approved,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Read => "read",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// 教练能否修改该记录
    pub fn is_trainer_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    /// 客户能否审批（通过或驳回）
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::Submitted | Self::Read)
    }

    /// 流转是否合法
    ///
    /// 状态不变也算流转：教练在可编辑状态下保存不改状态是允许的。
    pub fn can_transition(&self, to: SessionVolumeStatus, actor: Actor) -> bool {
        match actor {
            Actor::Trainer => {
                self.is_trainer_editable()
                    && (to == *self || matches!(to, Self::Draft | Self::Submitted))
            }
            Actor::Customer => match to {
                Self::Read => *self == Self::Submitted,
                Self::Approved | Self::Rejected => self.is_awaiting_decision(),
                Self::Draft | Self::Submitted => false,
            },
        }
    }

    /// 合法时返回目标状态，否则返回 [`ApiError::ForbiddenTransition`]
    pub fn transition(
        &self,
        to: SessionVolumeStatus,
        actor: Actor,
    ) -> Result<SessionVolumeStatus, ApiError> {
        if self.can_transition(to, actor) {
            Ok(to)
        } else {
            Err(ApiError::forbidden_transition(format!(
                "{:?} cannot move a session volume from {} to {}",
                actor, self, to
            )))
        }
    }
}

impl fmt::Display for SessionVolumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionVolumeStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ApiError::validation(format!("unknown session volume status '{s}'")))
    }
}
