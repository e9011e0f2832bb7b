//! 故障注入
//!
//! 先按请求参数挂起调用方，再独立掷一次骰子决定是否以 503 中止。
//! 必须在获取任何按 key 的锁之前调用，延迟不能串行化其它轨迹。

use std::sync::Arc;

use tokio::time::{Duration, sleep};
use tracing::warn;
use trackbox_shared::observability::metrics;

use super::random::RandomSource;
use crate::error::{EmulatorError, Result};

/// 单次请求的故障参数
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaultSpec {
    /// 人为延迟（毫秒）
    pub delay_ms: u64,
    /// 失败概率，`[0, 1]`
    pub fail_rate: f64,
}

impl FaultSpec {
    pub fn new(delay_ms: u64, fail_rate: f64) -> Self {
        Self {
            delay_ms,
            fail_rate,
        }
    }
}

/// 故障注入器
pub struct FaultInjector {
    random: Arc<dyn RandomSource>,
    max_delay_ms: u64,
}

impl FaultInjector {
    pub fn new(random: Arc<dyn RandomSource>, max_delay_ms: u64) -> Self {
        Self {
            random,
            max_delay_ms,
        }
    }

    /// 按参数延迟并可能失败
    ///
    /// 延迟超过上限时截断到上限。延迟不可中断，只受调用方自身的传输超时约束。
    pub async fn apply(&self, spec: FaultSpec, endpoint: &'static str) -> Result<()> {
        let delay_ms = spec.delay_ms.min(self.max_delay_ms);
        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }

        if spec.fail_rate > 0.0 && self.random.next_f64() < spec.fail_rate {
            warn!(endpoint, fail_rate = spec.fail_rate, "注入随机失败");
            metrics::record_injected_failure(endpoint);
            return Err(EmulatorError::InjectedFailure);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::FixedRandom;
    use std::time::Instant;

    fn injector(draw: f64) -> FaultInjector {
        FaultInjector::new(Arc::new(FixedRandom(draw)), 10_000)
    }

    #[tokio::test]
    async fn test_zero_fail_rate_never_fails() {
        // 骰子为 0 也不会失败：概率为 0 时不掷骰
        let result = injector(0.0).apply(FaultSpec::default(), "test").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_draw_below_rate_fails() {
        let result = injector(0.3).apply(FaultSpec::new(0, 0.5), "test").await;
        assert!(matches!(result, Err(EmulatorError::InjectedFailure)));
    }

    #[tokio::test]
    async fn test_draw_at_or_above_rate_passes() {
        assert!(injector(0.5).apply(FaultSpec::new(0, 0.5), "test").await.is_ok());
        assert!(injector(0.9).apply(FaultSpec::new(0, 0.5), "test").await.is_ok());
    }

    #[tokio::test]
    async fn test_full_fail_rate_always_fails() {
        let result = injector(0.999).apply(FaultSpec::new(0, 1.0), "test").await;
        assert!(matches!(result, Err(EmulatorError::InjectedFailure)));
    }

    #[tokio::test]
    async fn test_delay_suspends_caller() {
        let start = Instant::now();
        injector(0.9)
            .apply(FaultSpec::new(30, 0.0), "test")
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_delay_is_capped() {
        let capped = FaultInjector::new(Arc::new(FixedRandom(0.9)), 5);
        let start = Instant::now();
        capped
            .apply(FaultSpec::new(60_000, 0.0), "test")
            .await
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
