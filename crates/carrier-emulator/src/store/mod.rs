//! 内存存储模块
//!
//! 模拟器的全部状态只存在于进程内存中：启动时为空，显式 reset 时清空。

mod memory_store;

pub use memory_store::MemoryStore;
