//! 健康检查

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};

use crate::engine::Emulator;

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// 就绪检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub services: Vec<String>,
}

pub fn health_routes() -> Router<Arc<Emulator>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

/// 健康检查端点
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// 就绪检查端点
///
/// 返回可用的模拟接口列表
async fn readiness_check() -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        services: ["tracking", "track24", "gdeposylka"]
            .into_iter()
            .map(String::from)
            .collect(),
    })
}
