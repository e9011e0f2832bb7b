//! 随机数来源
//!
//! 故障注入和概率推进都从这里取 `[0, 1)` 的均匀随机数。
//! 需要可重放时使用 `SeededRandom`，单元测试使用 `FixedRandom`。

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 均匀分布随机数来源
pub trait RandomSource: Send + Sync {
    /// 返回 `[0, 1)` 内的随机数
    fn next_f64(&self) -> f64;
}

/// 线程本地 RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// 固定种子的 RNG，同一种子产生同一序列
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// 恒定取值
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}
