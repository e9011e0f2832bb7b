//! 时钟抽象
//!
//! 场景推进完全由墙钟时间决定。生产环境使用 `SystemClock`，
//! 测试使用可手动拨动的 `ManualClock` 模拟时间流逝。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// 时间源
pub trait Clock: Send + Sync {
    /// 当前 UTC 时间
    fn now(&self) -> DateTime<Utc>;
}

/// 系统墙钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟
///
/// 克隆后共享同一个时间值，测试可以在把时钟交给模拟器之后继续拨动它。
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// 向前拨动时钟
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write();
        *now += delta;
    }

    /// 设置为指定时间
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.write() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
