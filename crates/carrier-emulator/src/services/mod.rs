//! HTTP 服务模块
//!
//! 每个文件对应一组外部接口，共享同一个 `Emulator` 状态。

pub mod admin_service;
pub mod gdeposylka_service;
pub mod health;
pub mod track24_service;
pub mod tracking_service;

use std::sync::Arc;

use axum::Router;

use crate::engine::Emulator;

pub use admin_service::admin_routes;
pub use gdeposylka_service::gdeposylka_routes;
pub use health::health_routes;
pub use track24_service::track24_routes;
pub use tracking_service::tracking_routes;

/// 合并全部路由
pub fn app_routes(emulator: Arc<Emulator>) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(admin_routes())
        .merge(tracking_routes())
        .merge(track24_routes())
        .merge(gdeposylka_routes())
        .with_state(emulator)
}
