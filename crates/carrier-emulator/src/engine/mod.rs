//! 场景/状态引擎
//!
//! 一次轮询的处理顺序固定为：故障注入 → 取当前时间 → 承运商限流（仅承运商接口）
//! → 查找或创建状态 → 推进 → 交给响应适配器渲染。

pub mod clock;
pub mod defaults;
pub mod fault;
pub mod random;
pub mod rate_limit;
pub mod scenario;
pub mod scenario_store;
pub mod track_state;
pub mod track_store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use trackbox_shared::config::EmulatorConfig;
use trackbox_shared::observability::metrics;

use crate::error::{EmulatorError, Result};
use clock::{Clock, SystemClock};
use fault::{FaultInjector, FaultSpec};
use random::{RandomSource, ThreadRandom};
use rate_limit::RateLimiter;
use scenario::{AUTO_CARRIER, Scenario, ScenarioStep};
use scenario_store::ScenarioStore;
use track_state::TrackStep;
use track_store::{TrackDefaults, TrackSnapshot, TrackStateStore};

/// 场景不存在时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingScenarioPolicy {
    /// 合成默认场景并写入仓库
    Synthesize,
    /// 返回 404
    NotFound,
}

/// 场景 seed 条目
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSeed {
    pub carrier: String,
    pub code: String,
    pub step_seconds: i64,
    pub steps: Vec<ScenarioStep>,
}

/// 轨迹状态 seed 条目
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSeed {
    pub carrier: String,
    pub track_number: String,
    pub step_seconds: i64,
    pub progress_prob: f64,
    pub steps: Vec<TrackStep>,
}

/// 按时间解析后的场景视图
#[derive(Debug, Clone)]
pub struct ScenarioView {
    pub scenario: Arc<Scenario>,
    pub step_index: usize,
    pub created: bool,
}

impl ScenarioView {
    /// 第 0 步到当前步（含）的步骤及其名义时间
    pub fn visible_steps(&self) -> impl Iterator<Item = (usize, &ScenarioStep, DateTime<Utc>)> {
        self.scenario
            .steps
            .iter()
            .take(self.step_index + 1)
            .enumerate()
            .map(|(i, step)| (i, step, self.scenario.step_time(i)))
    }
}

/// 模拟器
///
/// 持有全部进程内状态。启动时为空，`reset` 清空场景、轨迹状态和限流计数器。
pub struct Emulator {
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    faults: FaultInjector,
    rate_limiter: RateLimiter,
    scenarios: ScenarioStore,
    tracks: TrackStateStore,
    config: EmulatorConfig,
}

impl Emulator {
    pub fn new(
        config: EmulatorConfig,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            faults: FaultInjector::new(Arc::clone(&random), config.max_delay_ms),
            rate_limiter: RateLimiter::new(&config.rate_limits),
            scenarios: ScenarioStore::new(),
            tracks: TrackStateStore::new(),
            clock,
            random,
            config,
        }
    }

    /// 系统时钟 + 线程 RNG
    pub fn with_config(config: EmulatorConfig) -> Self {
        Self::new(config, Arc::new(SystemClock), Arc::new(ThreadRandom))
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn tracks(&self) -> &TrackStateStore {
        &self.tracks
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// 批量写入场景
    ///
    /// 先校验整批，任一条目步骤为空则整批不写入。
    pub fn seed_scenarios(&self, items: Vec<ScenarioSeed>) -> Result<usize> {
        if let Some(bad) = items.iter().find(|it| it.steps.is_empty()) {
            return Err(EmulatorError::Validation(format!(
                "steps 不能为空: {}:{}",
                bad.carrier, bad.code
            )));
        }

        let now = self.clock.now();
        let count = items.len();
        for it in items {
            self.scenarios
                .seed(&it.carrier, &it.code, it.steps, it.step_seconds, now);
        }
        Ok(count)
    }

    /// 批量写入轨迹状态，校验规则同 `seed_scenarios`
    pub fn seed_tracks(&self, items: Vec<TrackSeed>) -> Result<usize> {
        if let Some(bad) = items.iter().find(|it| it.steps.is_empty()) {
            return Err(EmulatorError::Validation(format!(
                "steps 不能为空: {}:{}",
                bad.carrier, bad.track_number
            )));
        }

        let now = self.clock.now();
        let count = items.len();
        for it in items {
            self.tracks.seed(
                &it.carrier,
                &it.track_number,
                it.steps,
                it.step_seconds,
                it.progress_prob,
                now,
            )?;
        }
        Ok(count)
    }

    /// 清空全部状态
    pub fn reset(&self) {
        self.scenarios.reset();
        self.tracks.reset();
        self.rate_limiter.reset();
        info!("模拟器状态已重置");
    }

    /// 轮询承运商轨迹
    pub async fn poll_tracking(
        &self,
        carrier: &str,
        track_number: &str,
        fault: FaultSpec,
    ) -> Result<TrackSnapshot> {
        self.faults.apply(fault, "tracking").await?;

        let now = self.clock.now();
        self.rate_limiter.check(carrier, now)?;

        let defaults = TrackDefaults {
            step_seconds: self.config.default_step_seconds,
            progress_prob: self.config.default_progress_prob,
        };
        Ok(self
            .tracks
            .poll(carrier, track_number, now, self.random.as_ref(), defaults))
    }

    /// 按 `AUTO:{code}` 查找场景并解析当前步骤，不经过限流
    pub async fn lookup_scenario(
        &self,
        code: &str,
        policy: MissingScenarioPolicy,
        fault: FaultSpec,
        endpoint: &'static str,
    ) -> Result<ScenarioView> {
        self.faults.apply(fault, endpoint).await?;

        let now = self.clock.now();
        let (scenario, created) = match policy {
            MissingScenarioPolicy::Synthesize => {
                self.scenarios.get_or_create(AUTO_CARRIER, code, || {
                    Scenario::default_track24(
                        code,
                        now,
                        self.config.track24_backdate_seconds,
                        self.config.track24_step_seconds,
                    )
                })
            }
            MissingScenarioPolicy::NotFound => {
                let scenario = self.scenarios.get(AUTO_CARRIER, code).ok_or_else(|| {
                    EmulatorError::ScenarioNotFound {
                        track: code.to_string(),
                    }
                })?;
                (scenario, false)
            }
        };

        if created {
            debug!(code, endpoint, "合成默认场景");
            metrics::record_auto_created("scenario");
        }

        Ok(ScenarioView {
            step_index: scenario.current_step_index(now),
            scenario,
            created,
        })
    }
}
