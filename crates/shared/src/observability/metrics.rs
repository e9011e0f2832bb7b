//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述
///
/// 这些描述会出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "emulator_polls_total",
        "Tracking polls served by the emulator"
    );
    metrics::describe_counter!(
        "emulator_rate_limited_total",
        "Requests rejected by the per-carrier rate limiter"
    );
    metrics::describe_counter!(
        "emulator_injected_failures_total",
        "Requests aborted by fault injection"
    );
    metrics::describe_counter!(
        "emulator_scenarios_auto_created_total",
        "Scenarios or track states created implicitly on first poll"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录一次追踪轮询
#[inline]
pub fn record_poll(carrier: &str, advanced: bool) {
    metrics::counter!(
        "emulator_polls_total",
        "carrier" => carrier.to_string(),
        "advanced" => advanced.to_string()
    )
    .increment(1);
}

/// 记录限流拒绝
#[inline]
pub fn record_rate_limited(carrier: &str) {
    metrics::counter!(
        "emulator_rate_limited_total",
        "carrier" => carrier.to_string()
    )
    .increment(1);
}

/// 记录注入的失败
#[inline]
pub fn record_injected_failure(endpoint: &'static str) {
    metrics::counter!("emulator_injected_failures_total", "endpoint" => endpoint).increment(1);
}

/// 记录隐式创建的场景/状态
#[inline]
pub fn record_auto_created(kind: &'static str) {
    metrics::counter!("emulator_scenarios_auto_created_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_http_request("GET", "/v1/tracking/CDEK/1", 200, 0.1);
        record_poll("CDEK", true);
        record_rate_limited("POST_RU");
        record_injected_failure("tracking");
        record_auto_created("track_state");
    }
}
