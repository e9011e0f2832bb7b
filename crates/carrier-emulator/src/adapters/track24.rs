//! Track24 风格格式
//!
//! 从第 0 步到当前步各输出一条事件，id 从 1000 开始顺序编号，
//! 时间为 `创建时间 + 步进间隔 * 序号`，按 `DD.MM.YYYY HH:MM:SS`（UTC）格式化。

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DEFAULT_SOURCE;
use crate::engine::{MissingScenarioPolicy, ScenarioView};

/// 查不到场景时合成默认场景
pub const MISSING_POLICY: MissingScenarioPolicy = MissingScenarioPolicy::Synthesize;

const FIRST_EVENT_ID: usize = 1000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track24Event {
    pub id: String,
    pub operation_date_time: String,
    pub operation_attribute: String,
    pub operation_place_postal_code: Option<String>,
    pub operation_place_name: Option<String>,
    pub operation_type: String,
    pub item_weight: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Track24Data {
    pub events: Vec<Track24Event>,
}

/// `GET /tracking.json.php` 的响应
#[derive(Debug, Clone, Serialize)]
pub struct Track24Response {
    pub status: &'static str,
    pub data: Track24Data,
}

pub fn format_datetime(at: DateTime<Utc>) -> String {
    at.format("%d.%m.%Y %H:%M:%S").to_string()
}

pub fn render(view: &ScenarioView) -> Track24Response {
    let events = view
        .visible_steps()
        .map(|(i, step, at)| Track24Event {
            id: (FIRST_EVENT_ID + i).to_string(),
            operation_date_time: format_datetime(at),
            operation_attribute: step.operation_attribute.clone(),
            operation_place_postal_code: step.operation_place_postal_code.clone(),
            operation_place_name: step.operation_place_name.clone(),
            operation_type: step.operation_type.clone(),
            item_weight: String::new(),
            source: step
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
        .collect();

    Track24Response {
        status: "ok",
        data: Track24Data { events },
    }
}
