//! ports - 抽象 trait 层
//!
//! 定义客户端依赖的基础设施接口：本地键值存储与 HTTP 传输

mod key_value;
mod transport;

pub use key_value::*;
pub use transport::*;
