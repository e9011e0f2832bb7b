//! 内存存储
//!
//! 使用 DashMap 实现的高并发内存存储，适用于测试和开发环境。

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// 通用内存存储
///
/// 基于 DashMap 实现，支持高并发读写操作。
/// 值通常是 `Arc<...>`，读取时克隆的只是引用计数。
#[derive(Debug)]
pub struct MemoryStore<T> {
    data: Arc<DashMap<String, T>>,
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MemoryStore<T> {
    /// 创建新的内存存储实例
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    /// 插入或更新数据
    ///
    /// 如果 key 已存在则覆盖原有数据
    pub fn insert(&self, id: &str, value: T) {
        self.data.insert(id.to_string(), value);
    }

    /// 获取数据
    ///
    /// 返回数据的克隆，不持有锁
    pub fn get(&self, id: &str) -> Option<T> {
        self.data.get(id).map(|v| v.clone())
    }

    /// 获取数据，不存在时用工厂函数创建
    ///
    /// 检查与插入在同一个分片锁内完成，并发的首次访问只会创建一次。
    /// 返回值的第二项表示本次调用是否新建了数据。
    pub fn get_or_insert_with<F>(&self, id: &str, factory: F) -> (T, bool)
    where
        F: FnOnce() -> T,
    {
        match self.data.entry(id.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let value = factory();
                entry.insert(value.clone());
                (value, true)
            }
        }
    }

    /// 获取数据总数
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// 清空所有数据
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl<T: Clone> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}
