//! 模拟器原生格式

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::track_state::TrackEvent;
use crate::engine::track_store::TrackSnapshot;

/// `GET /v1/tracking/{carrier}/{trackNumber}` 的响应
#[derive(Debug, Clone, Serialize)]
pub struct NativeTrackingResponse {
    pub carrier: String,
    pub track_number: String,
    pub status: String,
    pub status_raw: String,
    /// 本次轮询时间
    pub status_at: DateTime<Utc>,
    pub events: Vec<TrackEvent>,
}

impl From<TrackSnapshot> for NativeTrackingResponse {
    fn from(snapshot: TrackSnapshot) -> Self {
        Self {
            carrier: snapshot.carrier,
            track_number: snapshot.track_number,
            status: snapshot.current.status,
            status_raw: snapshot.current.status_raw,
            status_at: snapshot.polled_at,
            events: snapshot.events,
        }
    }
}
