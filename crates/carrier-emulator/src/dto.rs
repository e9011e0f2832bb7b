//! 请求 DTO 定义
//!
//! seed 请求体既接受裸列表，也接受 `{"items": [...]}` 包装。

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::fault::FaultSpec;
use crate::engine::scenario::ScenarioStep;
use crate::engine::track_state::TrackStep;
use crate::engine::{ScenarioSeed, TrackSeed};
use crate::error::{EmulatorError, Result};

fn default_step_seconds() -> i64 {
    30
}

fn default_progress_prob() -> f64 {
    0.25
}

/// 场景 seed 条目
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedItem {
    #[validate(length(min = 1, message = "carrier 不能为空"))]
    pub carrier: String,
    #[validate(length(min = 1, message = "code 不能为空"))]
    pub code: String,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: i64,
    #[validate(length(min = 1, message = "steps 至少包含一个步骤"))]
    pub steps: Vec<ScenarioStep>,
}

impl From<SeedItem> for ScenarioSeed {
    fn from(item: SeedItem) -> Self {
        Self {
            carrier: item.carrier,
            code: item.code,
            step_seconds: item.step_seconds,
            steps: item.steps,
        }
    }
}

/// 轨迹状态 seed 条目
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeedV1Item {
    #[validate(length(min = 1, message = "carrier 不能为空"))]
    pub carrier: String,
    #[validate(length(min = 1, message = "trackNumber 不能为空"))]
    pub track_number: String,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: i64,
    #[serde(default = "default_progress_prob")]
    #[validate(range(min = 0.0, max = 1.0, message = "progressProb 必须在 0-1 之间"))]
    pub progress_prob: f64,
    #[validate(length(min = 1, message = "steps 至少包含一个步骤"))]
    pub steps: Vec<TrackStep>,
}

impl From<SeedV1Item> for TrackSeed {
    fn from(item: SeedV1Item) -> Self {
        Self {
            carrier: item.carrier,
            track_number: item.track_number,
            step_seconds: item.step_seconds,
            progress_prob: item.progress_prob,
            steps: item.steps,
        }
    }
}

/// seed 请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedBody<T> {
    Wrapped { items: Vec<T> },
    Bare(Vec<T>),
}

impl<T: Validate> SeedBody<T> {
    /// 逐条校验后取出条目
    pub fn into_validated(self) -> Result<Vec<T>> {
        let items = match self {
            Self::Wrapped { items } | Self::Bare(items) => items,
        };
        for item in &items {
            item.validate()?;
        }
        Ok(items)
    }
}

/// seed 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub status: String,
    pub count: usize,
}

impl SeedResponse {
    pub fn ok(count: usize) -> Self {
        Self {
            status: "ok".to_string(),
            count,
        }
    }
}

/// 故障参数校验
fn fault_spec(delay_ms: u64, fail_rate: f64, max_delay_ms: u64) -> Result<FaultSpec> {
    if delay_ms > max_delay_ms {
        return Err(EmulatorError::Validation(format!(
            "delayMs 不能超过 {max_delay_ms}"
        )));
    }
    Ok(FaultSpec::new(delay_ms, fail_rate))
}

/// `GET /v1/tracking/{carrier}/{trackNumber}` 查询参数
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingQuery {
    pub api_key: Option<String>,
    pub delay_ms: u64,
    #[validate(range(min = 0.0, max = 1.0, message = "failRate 必须在 0-1 之间"))]
    pub fail_rate: f64,
}

impl TrackingQuery {
    pub fn fault(&self, max_delay_ms: u64) -> Result<FaultSpec> {
        self.validate()?;
        fault_spec(self.delay_ms, self.fail_rate, max_delay_ms)
    }
}

/// `GET /tracking.json.php` 查询参数
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Track24Query {
    pub api_key: Option<String>,
    pub domain: Option<String>,
    #[validate(length(min = 1, message = "code 不能为空"))]
    pub code: String,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0, message = "failRate 必须在 0-1 之间"))]
    pub fail_rate: f64,
}

impl Track24Query {
    pub fn fault(&self, max_delay_ms: u64) -> Result<FaultSpec> {
        self.validate()?;
        fault_spec(self.delay_ms, self.fail_rate, max_delay_ms)
    }
}

/// `GET /gdeposylka/api/v4/track` 查询参数
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GdeposylkaQuery {
    pub token: Option<String>,
    #[validate(length(min = 1, message = "track 不能为空"))]
    pub track: String,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0, message = "failRate 必须在 0-1 之间"))]
    pub fail_rate: f64,
}

impl GdeposylkaQuery {
    pub fn fault(&self, max_delay_ms: u64) -> Result<FaultSpec> {
        self.validate()?;
        fault_spec(self.delay_ms, self.fail_rate, max_delay_ms)
    }
}
