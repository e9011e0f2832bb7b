//! 场景仓库
//!
//! 以 `carrier:code` 为 key 保存只读场景。写入会覆盖旧场景，读取不修改任何状态。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::scenario::{Scenario, ScenarioStep};
use crate::store::MemoryStore;

/// 场景仓库
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    scenarios: MemoryStore<Arc<Scenario>>,
}

impl ScenarioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入或替换场景，创建时间记为 `now`
    pub fn seed(
        &self,
        carrier: &str,
        code: &str,
        steps: Vec<ScenarioStep>,
        step_seconds: i64,
        now: DateTime<Utc>,
    ) -> Arc<Scenario> {
        let scenario = Arc::new(Scenario {
            carrier: carrier.to_string(),
            code: code.to_string(),
            created_at: now,
            steps,
            step_seconds,
        });
        self.scenarios
            .insert(&Scenario::key(carrier, code), Arc::clone(&scenario));
        info!(carrier, code, steps = scenario.steps.len(), step_seconds, "写入场景");
        scenario
    }

    pub fn get(&self, carrier: &str, code: &str) -> Option<Arc<Scenario>> {
        self.scenarios.get(&Scenario::key(carrier, code))
    }

    /// 获取场景，不存在时原子地创建
    pub fn get_or_create<F>(&self, carrier: &str, code: &str, factory: F) -> (Arc<Scenario>, bool)
    where
        F: FnOnce() -> Scenario,
    {
        self.scenarios
            .get_or_insert_with(&Scenario::key(carrier, code), || Arc::new(factory()))
    }

    /// 当前步骤索引；场景不存在时返回 `None`
    pub fn resolve(&self, carrier: &str, code: &str, now: DateTime<Utc>) -> Option<usize> {
        self.get(carrier, code)
            .map(|scenario| scenario.current_step_index(now))
    }

    pub fn len(&self) -> usize {
        self.scenarios.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空全部场景
    pub fn reset(&self) {
        self.scenarios.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    fn steps(n: usize) -> Vec<ScenarioStep> {
        (0..n)
            .map(|i| ScenarioStep {
                operation_attribute: format!("Операция {i}"),
                operation_type: "Обработка".into(),
                operation_place_postal_code: Some("101000".into()),
                operation_place_name: Some("Москва".into()),
                source: None,
            })
            .collect()
    }

    #[test]
    fn test_seed_then_resolve_by_elapsed_time() {
        let store = ScenarioStore::new();
        store.seed("AUTO", "RA1", steps(3), 10, t0());

        assert_eq!(store.resolve("AUTO", "RA1", t0()), Some(0));
        assert_eq!(store.resolve("AUTO", "RA1", t0() + Duration::seconds(11)), Some(1));
        assert_eq!(store.resolve("AUTO", "RA1", t0() + Duration::hours(1)), Some(2));
        assert_eq!(store.resolve("AUTO", "missing", t0()), None);
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let store = ScenarioStore::new();
        let seeded = store.seed("AUTO", "RA1", steps(3), 10, t0());

        let _ = store.resolve("AUTO", "RA1", t0() + Duration::hours(2));
        assert_eq!(*store.get("AUTO", "RA1").unwrap(), *seeded);
    }

    #[test]
    fn test_reseed_with_same_payload_is_idempotent() {
        let a = ScenarioStore::new();
        let b = ScenarioStore::new();
        a.seed("AUTO", "RA1", steps(4), 15, t0());
        b.seed("AUTO", "RA1", steps(4), 15, t0());
        b.seed("AUTO", "RA1", steps(4), 15, t0());

        for s in [0, 14, 15, 31, 46, 1_000] {
            let now = t0() + Duration::seconds(s);
            assert_eq!(a.resolve("AUTO", "RA1", now), b.resolve("AUTO", "RA1", now));
        }
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_reseed_restarts_progression() {
        let store = ScenarioStore::new();
        store.seed("AUTO", "RA1", steps(3), 10, t0());
        let later = t0() + Duration::seconds(25);
        assert_eq!(store.resolve("AUTO", "RA1", later), Some(2));

        store.seed("AUTO", "RA1", steps(3), 10, later);
        assert_eq!(store.resolve("AUTO", "RA1", later), Some(0));
    }

    #[test]
    fn test_get_or_create_reports_creation() {
        let store = ScenarioStore::new();
        let (sc, created) = store.get_or_create("AUTO", "X", || {
            Scenario::default_track24("X", t0(), 600, 60)
        });
        assert!(created);
        assert_eq!(sc.steps.len(), 2);

        let (_, created) = store.get_or_create("AUTO", "X", || unreachable!());
        assert!(!created);
    }

    #[test]
    fn test_reset_clears_all() {
        let store = ScenarioStore::new();
        store.seed("AUTO", "A", steps(2), 10, t0());
        store.seed("CDEK", "B", steps(2), 10, t0());
        store.reset();
        assert!(store.is_empty());
    }
}
