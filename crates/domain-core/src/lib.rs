//! domain-core - 课时量领域核心
//!
//! 课时量记录、状态机、周期值对象以及提交前的客户端校验

mod period;
mod session_volume;
mod status;
mod validation;

pub use period::*;
pub use session_volume::*;
pub use status::*;
pub use validation::*;

// Re-export common types
pub use bodyback_common::{SessionVolumeId, Timestamps, UserId};
