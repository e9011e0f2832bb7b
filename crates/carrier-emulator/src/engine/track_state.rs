//! 追踪状态机
//!
//! 每条轨迹 (carrier, track_number) 一个可变状态，每次轮询可能推进一步。
//! 推进有两个互相独立的触发条件：
//!
//! - 时间就绪：`step_seconds > 0` 且距上次推进已满 `step_seconds` 秒
//! - 概率就绪：`progress_prob > 0` 且一次均匀随机数小于 `progress_prob`
//!
//! 任一触发即推进恰好一步并追加一条事件。到达最后一步后不再变化。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::defaults::default_steps_for;
use super::random::RandomSource;

/// 状态步骤（模拟器原生字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStep {
    /// 归一化状态，如 IN_TRANSIT / DELIVERED
    pub status: String,
    /// 承运商原始状态文本
    pub status_raw: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TrackStep {
    pub fn new(
        status: &str,
        status_raw: &str,
        location: Option<&str>,
        message: Option<&str>,
    ) -> Self {
        Self {
            status: status.to_string(),
            status_raw: status_raw.to_string(),
            location: location.map(String::from),
            message: message.map(String::from),
        }
    }
}

/// 事件附加信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub carrier: String,
}

/// 历史事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub status: String,
    pub status_raw: String,
    pub event_time: DateTime<Utc>,
    pub location: Option<String>,
    pub message: Option<String>,
    pub payload: EventPayload,
}

/// 单次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// 本次轮询是否推进了一步
    pub advanced: bool,
    /// 轮询后的步骤索引
    pub step_index: usize,
}

/// 追踪状态
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub carrier: String,
    pub track_number: String,
    pub created_at: DateTime<Utc>,
    pub last_advance_at: DateTime<Utc>,
    pub step_seconds: i64,
    pub progress_prob: f64,
    step_index: usize,
    /// 非空
    steps: Vec<TrackStep>,
    /// 只追加
    events: Vec<TrackEvent>,
}

impl TrackState {
    /// 创建处于第 0 步的新状态
    ///
    /// `steps` 为空时返回 `None`。
    pub fn new(
        carrier: &str,
        track_number: &str,
        steps: Vec<TrackStep>,
        step_seconds: i64,
        progress_prob: f64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self {
            carrier: carrier.to_string(),
            track_number: track_number.to_string(),
            created_at: now,
            last_advance_at: now,
            step_seconds,
            progress_prob: progress_prob.clamp(0.0, 1.0),
            step_index: 0,
            steps,
            events: Vec::new(),
        })
    }

    /// 首次轮询未知轨迹时按承运商默认步骤创建
    pub fn with_default_steps(
        carrier: &str,
        track_number: &str,
        step_seconds: i64,
        progress_prob: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            carrier: carrier.to_string(),
            track_number: track_number.to_string(),
            created_at: now,
            last_advance_at: now,
            step_seconds,
            progress_prob: progress_prob.clamp(0.0, 1.0),
            step_index: 0,
            steps: default_steps_for(carrier),
            events: Vec::new(),
        }
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn steps(&self) -> &[TrackStep] {
        &self.steps
    }

    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// 当前报告的步骤，与本次轮询是否推进无关
    pub fn current_step(&self) -> &TrackStep {
        &self.steps[self.step_index]
    }

    pub fn is_terminal(&self) -> bool {
        self.step_index + 1 >= self.steps.len()
    }

    /// 处理一次轮询
    ///
    /// 历史为空时先为当前步骤补一条事件，因此轮询完成后事件数恒等于 `step_index + 1`。
    pub fn poll(&mut self, now: DateTime<Utc>, random: &dyn RandomSource) -> PollOutcome {
        if self.events.is_empty() {
            self.record_current(now);
        }

        if self.is_terminal() {
            return PollOutcome {
                advanced: false,
                step_index: self.step_index,
            };
        }

        let advanced = self.time_ready(now) || self.probability_ready(random);
        if advanced {
            self.step_index += 1;
            self.last_advance_at = now;
            self.record_current(now);
        }

        PollOutcome {
            advanced,
            step_index: self.step_index,
        }
    }

    /// 间隔换算成毫秒溢出时视为永不就绪
    fn time_ready(&self, now: DateTime<Utc>) -> bool {
        if self.step_seconds <= 0 {
            return false;
        }
        match self.step_seconds.checked_mul(1_000) {
            Some(interval_ms) => (now - self.last_advance_at).num_milliseconds() >= interval_ms,
            None => false,
        }
    }

    fn probability_ready(&self, random: &dyn RandomSource) -> bool {
        self.progress_prob > 0.0 && random.next_f64() < self.progress_prob
    }

    fn record_current(&mut self, now: DateTime<Utc>) {
        let step = &self.steps[self.step_index];
        self.events.push(TrackEvent {
            status: step.status.clone(),
            status_raw: step.status_raw.clone(),
            event_time: now,
            location: step.location.clone(),
            message: step.message.clone(),
            payload: EventPayload {
                carrier: self.carrier.clone(),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::{FixedRandom, SeededRandom};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap()
    }

    fn cdek_steps() -> Vec<TrackStep> {
        vec![
            TrackStep::new("IN_TRANSIT", "CDEK: accepted", Some("Moscow"), Some("Accepted")),
            TrackStep::new("IN_TRANSIT", "CDEK: in transit", Some("Sorting center"), None),
            TrackStep::new("DELIVERED", "CDEK: delivered", Some("Destination"), None),
        ]
    }

    fn state(step_seconds: i64, prob: f64) -> TrackState {
        TrackState::new("CDEK", "1234567890", cdek_steps(), step_seconds, prob, t0()).unwrap()
    }

    /// 永不触发概率推进
    const NEVER: FixedRandom = FixedRandom(0.999);
    /// 只要概率大于 0 就触发
    const ALWAYS: FixedRandom = FixedRandom(0.0);

    #[test]
    fn test_empty_steps_rejected() {
        assert!(TrackState::new("CDEK", "1", vec![], 10, 0.0, t0()).is_none());
    }

    #[test]
    fn test_first_poll_records_initial_event() {
        let mut st = state(10, 0.0);
        let outcome = st.poll(t0(), &NEVER);

        assert!(!outcome.advanced);
        assert_eq!(outcome.step_index, 0);
        assert_eq!(st.events().len(), 1);
        assert_eq!(st.events()[0].status_raw, "CDEK: accepted");
        assert_eq!(st.events()[0].payload.carrier, "CDEK");
    }

    #[test]
    fn test_time_trigger_advances_exactly_one_step() {
        let mut st = state(10, 0.0);
        st.poll(t0(), &NEVER);

        // 即使过去了很久，一次轮询也只推进一步
        let outcome = st.poll(t0() + Duration::seconds(45), &NEVER);
        assert!(outcome.advanced);
        assert_eq!(st.step_index(), 1);
        assert_eq!(st.events().len(), 2);
        assert_eq!(st.last_advance_at, t0() + Duration::seconds(45));
        assert_eq!(st.current_step().status_raw, "CDEK: in transit");
    }

    #[test]
    fn test_time_trigger_measured_from_last_advance() {
        let mut st = state(10, 0.0);
        st.poll(t0() + Duration::seconds(10), &NEVER);
        assert_eq!(st.step_index(), 1);

        st.poll(t0() + Duration::seconds(19), &NEVER);
        assert_eq!(st.step_index(), 1);

        st.poll(t0() + Duration::seconds(20), &NEVER);
        assert_eq!(st.step_index(), 2);
    }

    #[test]
    fn test_probability_trigger() {
        let mut st = state(0, 0.25);
        let outcome = st.poll(t0(), &FixedRandom(0.2));
        assert!(outcome.advanced);

        let outcome = st.poll(t0(), &FixedRandom(0.25));
        assert!(!outcome.advanced);
    }

    #[test]
    fn test_zero_probability_never_draws_advance() {
        let mut st = state(0, 0.0);
        for _ in 0..10 {
            assert!(!st.poll(t0() + Duration::days(1), &ALWAYS).advanced);
        }
        assert_eq!(st.step_index(), 0);
    }

    #[test]
    fn test_terminal_state_is_stable() {
        let mut st = state(1, 1.0);
        for i in 0..5 {
            st.poll(t0() + Duration::seconds(i), &ALWAYS);
        }
        assert!(st.is_terminal());
        let events = st.events().len();

        for i in 0..20 {
            let outcome = st.poll(t0() + Duration::hours(i), &ALWAYS);
            assert!(!outcome.advanced);
            assert_eq!(outcome.step_index, 2);
        }
        assert_eq!(st.events().len(), events);
        assert_eq!(st.current_step().status, "DELIVERED");
    }

    #[test]
    fn test_default_steps_state_starts_at_zero() {
        let st = TrackState::with_default_steps("POST_RU", "RA1", 20, 0.25, t0());
        assert_eq!(st.step_index(), 0);
        assert_eq!(st.steps().len(), 3);
        assert!(st.events().is_empty());
        assert_eq!(st.current_step().status_raw, "POST_RU: accepted");
    }

    #[test]
    fn test_single_step_state_is_terminal_from_start() {
        let mut st = TrackState::new(
            "DHL",
            "T1",
            vec![TrackStep::new("DELIVERED", "Delivered", None, None)],
            1,
            1.0,
            t0(),
        )
        .unwrap();
        st.poll(t0() + Duration::hours(1), &ALWAYS);
        assert_eq!(st.step_index(), 0);
        assert_eq!(st.events().len(), 1);
    }

    #[test]
    fn test_history_length_tracks_index_under_random_polling() {
        let random = SeededRandom::new(42);
        let mut st = state(7, 0.3);
        let mut last_index = 0;

        for s in 0..200 {
            let outcome = st.poll(t0() + Duration::seconds(s * 3), &random);
            assert!(outcome.step_index >= last_index);
            assert!(outcome.step_index < st.steps().len());
            assert_eq!(st.events().len(), outcome.step_index + 1);
            last_index = outcome.step_index;
        }
    }

    #[test]
    fn test_huge_interval_never_time_ready() {
        // 换算成毫秒会溢出 i64 的间隔
        let mut st = state(10_000_000_000_000_000, 0.0);
        st.poll(t0(), &NEVER);

        let outcome = st.poll(t0() + Duration::seconds(1), &NEVER);
        assert!(!outcome.advanced);
        let outcome = st.poll(t0() + Duration::days(365 * 100), &NEVER);
        assert!(!outcome.advanced);
        assert_eq!(st.step_index(), 0);
        assert_eq!(st.events().len(), 1);
    }

    #[test]
    fn test_event_serializes_with_snake_case_fields() {
        let mut st = state(10, 0.0);
        st.poll(t0(), &NEVER);
        let json = serde_json::to_value(&st.events()[0]).unwrap();
        assert_eq!(json["status_raw"], "CDEK: accepted");
        assert_eq!(json["payload"]["carrier"], "CDEK");
        assert!(json["message"].is_string());
        assert!(json.get("event_time").is_some());
    }
}
