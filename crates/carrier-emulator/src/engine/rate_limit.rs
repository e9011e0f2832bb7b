//! 按承运商的固定窗口限流
//!
//! 计数器 key 为 (承运商, 自然分钟)。每次检查先无条件自增再与上限比较，
//! 同一分钟内第 L+1 次请求被拒绝。旧窗口的计数器不主动过期，直到显式 reset。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::warn;
use trackbox_shared::config::CarrierLimit;
use trackbox_shared::observability::metrics;

use crate::error::{EmulatorError, Result};

const WINDOW_SECS: i64 = 60;

/// 承运商限流器
#[derive(Debug)]
pub struct RateLimiter {
    limits: HashMap<String, u32>,
    counters: DashMap<(String, i64), u64>,
}

impl RateLimiter {
    /// 创建限流器，上限在启动时固定
    pub fn new(limits: &[CarrierLimit]) -> Self {
        Self {
            limits: limits
                .iter()
                .map(|l| (l.carrier.clone(), l.per_minute))
                .collect(),
            counters: DashMap::new(),
        }
    }

    /// 承运商的每分钟上限，`None` 表示不限流
    pub fn limit_for(&self, carrier: &str) -> Option<u32> {
        self.limits.get(carrier).copied()
    }

    /// 计数并检查是否超限
    pub fn check(&self, carrier: &str, now: DateTime<Utc>) -> Result<()> {
        let Some(limit) = self.limit_for(carrier) else {
            return Ok(());
        };

        let window = window_key(now);
        let count = {
            let mut counter = self
                .counters
                .entry((carrier.to_string(), window))
                .or_insert(0);
            *counter += 1;
            *counter
        };

        if count > u64::from(limit) {
            warn!(carrier, limit, count, "承运商限流触发");
            metrics::record_rate_limited(carrier);
            return Err(EmulatorError::RateLimitExceeded {
                carrier: carrier.to_string(),
                limit,
                retry_after_secs: seconds_left_in_window(now),
            });
        }

        Ok(())
    }

    /// 当前窗口已计数的请求数
    pub fn current_count(&self, carrier: &str, now: DateTime<Utc>) -> u64 {
        self.counters
            .get(&(carrier.to_string(), window_key(now)))
            .map(|c| *c)
            .unwrap_or(0)
    }

    /// 清空全部计数器
    pub fn reset(&self) {
        self.counters.clear();
    }
}

/// 截断到自然分钟
fn window_key(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(WINDOW_SECS)
}

fn seconds_left_in_window(now: DateTime<Utc>) -> u64 {
    (WINDOW_SECS - now.timestamp().rem_euclid(WINDOW_SECS)) as u64
}
