//! 场景定义
//!
//! 场景是只读的推进模板，当前步骤完全由创建以来经过的墙钟时间推导，读取不产生副作用。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 聚合器默认使用的承运商 key 前缀
pub const AUTO_CARRIER: &str = "AUTO";

/// 场景步骤（Track24 原生字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStep {
    /// 状态文本
    pub operation_attribute: String,
    /// 操作类型
    pub operation_type: String,
    #[serde(default)]
    pub operation_place_postal_code: Option<String>,
    #[serde(default)]
    pub operation_place_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// 推进场景
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub carrier: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    /// 非空
    pub steps: Vec<ScenarioStep>,
    pub step_seconds: i64,
}

impl Scenario {
    /// 存储 key：`{carrier}:{code}`
    pub fn key(carrier: &str, code: &str) -> String {
        format!("{}:{}", carrier, code)
    }

    /// 按经过时间计算当前步骤
    ///
    /// 结果总是落在 `[0, steps.len() - 1]`；间隔非正时固定为 0，
    /// `now` 早于创建时间时按 0 秒处理。
    pub fn current_step_index(&self, now: DateTime<Utc>) -> usize {
        if self.step_seconds <= 0 || self.steps.is_empty() {
            return 0;
        }
        let elapsed = (now - self.created_at).num_seconds().max(0);
        let idx = (elapsed / self.step_seconds) as usize;
        idx.min(self.steps.len() - 1)
    }

    /// 第 `index` 步的名义发生时间
    pub fn step_time(&self, index: usize) -> DateTime<Utc> {
        self.created_at + Duration::seconds(self.step_seconds * index as i64)
    }

    /// Track24 查询未命中时合成的默认两步场景
    ///
    /// 创建时间回拨，保证首次查询就能看到"在途"而不是停在第 0 步。
    pub fn default_track24(
        code: &str,
        now: DateTime<Utc>,
        backdate_seconds: i64,
        step_seconds: i64,
    ) -> Self {
        let step = |attribute: &str, operation: &str| ScenarioStep {
            operation_attribute: attribute.to_string(),
            operation_type: operation.to_string(),
            operation_place_postal_code: Some("000000".to_string()),
            operation_place_name: Some("Emulator City".to_string()),
            source: Some("emulator".to_string()),
        };

        Self {
            carrier: AUTO_CARRIER.to_string(),
            code: code.to_string(),
            created_at: now - Duration::seconds(backdate_seconds),
            steps: vec![
                step("Принято в отделении связи", "Прием"),
                step("В пути", "Перевозка"),
            ],
            step_seconds,
        }
    }
}
