//! adapter-storage - 本地键值存储实现
//!
//! - [`MemoryStore`]：进程内存储，测试与临时会话使用
//! - [`FileStore`]：单个 JSON 文件，整文件替换写入

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
