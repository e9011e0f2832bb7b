//! gdeposylka 风格格式

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::DEFAULT_SOURCE;
use crate::engine::{MissingScenarioPolicy, ScenarioView};

/// 查不到场景时返回 404，和 Track24 适配器不同
pub const MISSING_POLICY: MissingScenarioPolicy = MissingScenarioPolicy::NotFound;

#[derive(Debug, Clone, Serialize)]
pub struct Checkpoint {
    pub time: DateTime<Utc>,
    pub status: String,
    pub message: String,
    pub location: Option<String>,
    pub postal_code: Option<String>,
    pub source: String,
}

/// `GET /gdeposylka/api/v4/track` 的响应
#[derive(Debug, Clone, Serialize)]
pub struct GdeposylkaResponse {
    pub status: &'static str,
    pub track: String,
    pub checkpoints: Vec<Checkpoint>,
}

pub fn render(track: &str, view: &ScenarioView) -> GdeposylkaResponse {
    let checkpoints = view
        .visible_steps()
        .map(|(_, step, at)| Checkpoint {
            time: at,
            status: step.operation_type.clone(),
            message: step.operation_attribute.clone(),
            location: step.operation_place_name.clone(),
            postal_code: step.operation_place_postal_code.clone(),
            source: step
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
        .collect();

    GdeposylkaResponse {
        status: "ok",
        track: track.to_string(),
        checkpoints,
    }
}
