//! 承运商追踪接口
//!
//! 有状态推进，受故障注入和承运商限流约束。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::adapters::native::NativeTrackingResponse;
use crate::dto::TrackingQuery;
use crate::engine::Emulator;
use crate::error::Result;

pub fn tracking_routes() -> Router<Arc<Emulator>> {
    Router::new().route("/v1/tracking/{carrier}/{track_number}", get(poll_tracking))
}

/// 轮询一条轨迹
///
/// GET /v1/tracking/{carrier}/{track_number}?delayMs=0&failRate=0
async fn poll_tracking(
    State(emulator): State<Arc<Emulator>>,
    Path((carrier, track_number)): Path<(String, String)>,
    Query(query): Query<TrackingQuery>,
) -> Result<Json<NativeTrackingResponse>> {
    let fault = query.fault(emulator.config().max_delay_ms)?;
    let snapshot = emulator
        .poll_tracking(&carrier, &track_number, fault)
        .await?;
    Ok(Json(snapshot.into()))
}
