//! 追踪状态仓库
//!
//! 每个 key 一把互斥锁，轮询的读-判断-推进-追加在同一把锁内完成，
//! 并发轮询同一条轨迹不会重复推进。锁在返回快照前释放，序列化不持锁。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};
use trackbox_shared::observability::metrics;

use super::random::RandomSource;
use super::track_state::{TrackEvent, TrackState, TrackStep};
use crate::error::{EmulatorError, Result};
use crate::store::MemoryStore;

/// 自动创建轨迹时使用的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackDefaults {
    pub step_seconds: i64,
    pub progress_prob: f64,
}

impl Default for TrackDefaults {
    fn default() -> Self {
        Self {
            step_seconds: 20,
            progress_prob: 0.25,
        }
    }
}

/// 一次轮询后的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    pub carrier: String,
    pub track_number: String,
    pub step_index: usize,
    pub current: TrackStep,
    pub events: Vec<TrackEvent>,
    pub advanced: bool,
    pub created: bool,
    /// 本次轮询的时间
    pub polled_at: DateTime<Utc>,
}

type SharedState = Arc<Mutex<TrackState>>;

/// 追踪状态仓库
#[derive(Debug, Clone, Default)]
pub struct TrackStateStore {
    states: MemoryStore<SharedState>,
}

fn key(carrier: &str, track_number: &str) -> String {
    format!("{}:{}", carrier, track_number)
}

impl TrackStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或替换一条轨迹，从第 0 步重新开始
    pub fn seed(
        &self,
        carrier: &str,
        track_number: &str,
        steps: Vec<TrackStep>,
        step_seconds: i64,
        progress_prob: f64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let step_count = steps.len();
        let state = TrackState::new(carrier, track_number, steps, step_seconds, progress_prob, now)
            .ok_or_else(|| {
                EmulatorError::Validation(format!("steps 不能为空: {carrier}:{track_number}"))
            })?;
        self.states
            .insert(&key(carrier, track_number), Arc::new(Mutex::new(state)));
        info!(
            carrier,
            track_number,
            steps = step_count,
            step_seconds,
            progress_prob,
            "写入轨迹状态"
        );
        Ok(())
    }

    /// 轮询一条轨迹，不存在时按承运商默认步骤创建
    pub fn poll(
        &self,
        carrier: &str,
        track_number: &str,
        now: DateTime<Utc>,
        random: &dyn RandomSource,
        defaults: TrackDefaults,
    ) -> TrackSnapshot {
        let (shared, created) = self.states.get_or_insert_with(&key(carrier, track_number), || {
            Arc::new(Mutex::new(TrackState::with_default_steps(
                carrier,
                track_number,
                defaults.step_seconds,
                defaults.progress_prob,
                now,
            )))
        });
        if created {
            debug!(carrier, track_number, "自动创建轨迹状态");
            metrics::record_auto_created("track_state");
        }

        let snapshot = {
            let mut state = shared.lock();
            let outcome = state.poll(now, random);
            TrackSnapshot {
                carrier: state.carrier.clone(),
                track_number: state.track_number.clone(),
                step_index: outcome.step_index,
                current: state.current_step().clone(),
                events: state.events().to_vec(),
                advanced: outcome.advanced,
                created,
                polled_at: now,
            }
        };

        if snapshot.advanced {
            debug!(
                carrier,
                track_number,
                step_index = snapshot.step_index,
                "轨迹推进一步"
            );
        }
        metrics::record_poll(carrier, snapshot.advanced);
        snapshot
    }

    /// 当前状态的副本，不触发推进
    pub fn get(&self, carrier: &str, track_number: &str) -> Option<TrackState> {
        self.states
            .get(&key(carrier, track_number))
            .map(|shared| shared.lock().clone())
    }

    pub fn len(&self) -> usize {
        self.states.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::FixedRandom;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn steps() -> Vec<TrackStep> {
        vec![
            TrackStep::new("IN_TRANSIT", "POST_RU: accepted", Some("Москва"), None),
            TrackStep::new("IN_TRANSIT", "POST_RU: processing", Some("СЦ"), None),
            TrackStep::new("DELIVERED", "POST_RU: delivered", Some("Отделение"), None),
        ]
    }

    const NO_DRAW: FixedRandom = FixedRandom(0.999);

    #[test]
    fn test_seed_rejects_empty_steps() {
        let store = TrackStateStore::new();
        let err = store
            .seed("CDEK", "1", vec![], 10, 0.0, t0())
            .unwrap_err();
        assert!(matches!(err, EmulatorError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_seeded_track_advances_on_time() {
        let store = TrackStateStore::new();
        store
            .seed("POST_RU", "ABC123", steps(), 10, 0.0, t0())
            .unwrap();

        let first = store.poll("POST_RU", "ABC123", t0(), &NO_DRAW, TrackDefaults::default());
        assert!(!first.created);
        assert_eq!(first.step_index, 0);
        assert_eq!(first.events.len(), 1);

        let second = store.poll(
            "POST_RU",
            "ABC123",
            t0() + Duration::seconds(11),
            &NO_DRAW,
            TrackDefaults::default(),
        );
        assert!(second.advanced);
        assert_eq!(second.step_index, 1);
        assert_eq!(second.events.len(), 2);
        assert_eq!(second.current.status_raw, "POST_RU: processing");
    }

    #[test]
    fn test_unknown_track_auto_created_once() {
        let store = TrackStateStore::new();
        let a = store.poll("CDEK", "9", t0(), &NO_DRAW, TrackDefaults::default());
        let b = store.poll("CDEK", "9", t0(), &NO_DRAW, TrackDefaults::default());
        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.current.status_raw, "CDEK: accepted");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reseed_restarts_from_step_zero() {
        let store = TrackStateStore::new();
        store.seed("CDEK", "1", steps(), 1, 0.0, t0()).unwrap();
        store.poll("CDEK", "1", t0() + Duration::seconds(5), &NO_DRAW, TrackDefaults::default());
        assert_eq!(store.get("CDEK", "1").unwrap().step_index(), 1);

        store.seed("CDEK", "1", steps(), 1, 0.0, t0()).unwrap();
        let st = store.get("CDEK", "1").unwrap();
        assert_eq!(st.step_index(), 0);
        assert!(st.events().is_empty());
    }

    #[test]
    fn test_concurrent_polls_advance_once_per_ready_window() {
        let store = TrackStateStore::new();
        store.seed("CDEK", "X", steps(), 10, 0.0, t0()).unwrap();
        store.poll("CDEK", "X", t0(), &NO_DRAW, TrackDefaults::default());

        // 同一时刻的并发轮询只能有一个看到"时间就绪"
        let later = t0() + Duration::seconds(10);
        let advanced: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    s.spawn(move || {
                        store
                            .poll("CDEK", "X", later, &NO_DRAW, TrackDefaults::default())
                            .advanced
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });

        assert_eq!(advanced, 1);
        let st = store.get("CDEK", "X").unwrap();
        assert_eq!(st.step_index(), 1);
        assert_eq!(st.events().len(), 2);
    }

    #[test]
    fn test_reset_drops_all_states() {
        let store = TrackStateStore::new();
        store.poll("CDEK", "1", t0(), &NO_DRAW, TrackDefaults::default());
        store.poll("DHL", "2", t0(), &NO_DRAW, TrackDefaults::default());
        store.reset();
        assert!(store.is_empty());
        assert!(store.get("CDEK", "1").is_none());
    }
}
