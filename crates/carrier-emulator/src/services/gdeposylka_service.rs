//! gdeposylka 风格接口
//!
//! 基于场景仓库按时间解析，查不到场景时返回 404。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::adapters::gdeposylka::{self, GdeposylkaResponse};
use crate::dto::GdeposylkaQuery;
use crate::engine::Emulator;
use crate::error::Result;

pub fn gdeposylka_routes() -> Router<Arc<Emulator>> {
    Router::new().route("/gdeposylka/api/v4/track", get(track))
}

/// 查询轨迹
///
/// GET /gdeposylka/api/v4/track?token=..&track=..
async fn track(
    State(emulator): State<Arc<Emulator>>,
    Query(query): Query<GdeposylkaQuery>,
) -> Result<Json<GdeposylkaResponse>> {
    let fault = query.fault(emulator.config().max_delay_ms)?;
    let view = emulator
        .lookup_scenario(&query.track, gdeposylka::MISSING_POLICY, fault, "gdeposylka")
        .await?;
    Ok(Json(gdeposylka::render(&query.track, &view)))
}
