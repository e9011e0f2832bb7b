//! 管理接口
//!
//! seed 场景、seed 轨迹状态、清空全部状态。

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};
use tracing::info;

use crate::dto::{SeedBody, SeedItem, SeedResponse, SeedV1Item};
use crate::engine::Emulator;
use crate::error::Result;

pub fn admin_routes() -> Router<Arc<Emulator>> {
    Router::new()
        .route("/v1/admin/seed", post(seed_scenarios))
        .route("/v1/admin/seed-v1", post(seed_tracks))
        .route("/v1/admin/reset", post(reset))
}

/// 写入场景
///
/// POST /v1/admin/seed
async fn seed_scenarios(
    State(emulator): State<Arc<Emulator>>,
    Json(body): Json<SeedBody<SeedItem>>,
) -> Result<Json<SeedResponse>> {
    let items = body.into_validated()?;
    let count = emulator.seed_scenarios(items.into_iter().map(Into::into).collect())?;
    info!(count, "场景 seed 完成");
    Ok(Json(SeedResponse::ok(count)))
}

/// 写入轨迹状态
///
/// POST /v1/admin/seed-v1
async fn seed_tracks(
    State(emulator): State<Arc<Emulator>>,
    Json(body): Json<SeedBody<SeedV1Item>>,
) -> Result<Json<SeedResponse>> {
    let items = body.into_validated()?;
    let count = emulator.seed_tracks(items.into_iter().map(Into::into).collect())?;
    info!(count, "轨迹状态 seed 完成");
    Ok(Json(SeedResponse::ok(count)))
}

/// 清空场景、轨迹状态和限流计数器
///
/// POST /v1/admin/reset
async fn reset(State(emulator): State<Arc<Emulator>>) -> Json<Value> {
    emulator.reset();
    Json(json!({ "status": "ok" }))
}
