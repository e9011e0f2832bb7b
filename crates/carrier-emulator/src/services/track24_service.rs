//! Track24 风格接口
//!
//! 基于场景仓库按时间解析，查不到场景时合成默认场景，不限流。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::adapters::track24;
use crate::dto::Track24Query;
use crate::engine::Emulator;
use crate::error::Result;

pub fn track24_routes() -> Router<Arc<Emulator>> {
    Router::new().route("/tracking.json.php", get(track24_tracking))
}

/// 查询轨迹
///
/// GET /tracking.json.php?apiKey=..&domain=..&code=..&pretty=false
async fn track24_tracking(
    State(emulator): State<Arc<Emulator>>,
    Query(query): Query<Track24Query>,
) -> Result<Response> {
    let fault = query.fault(emulator.config().max_delay_ms)?;
    let view = emulator
        .lookup_scenario(&query.code, track24::MISSING_POLICY, fault, "track24")
        .await?;
    let body = track24::render(&view);

    if query.pretty {
        let text = serde_json::to_string_pretty(&body)?;
        return Ok(([(header::CONTENT_TYPE, "application/json")], text).into_response());
    }
    Ok(Json(body).into_response())
}
