//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。

use std::fs;
use std::io::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use axum::{Router, middleware};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use trackbox_shared::config::AppConfig;
use trackbox_shared::observability::middleware as obs_middleware;

use crate::cli::SeedKind;
use crate::dto::{SeedBody, SeedItem, SeedResponse, SeedV1Item};
use crate::engine::Emulator;
use crate::engine::clock::SystemClock;
use crate::engine::random::{RandomSource, SeededRandom, ThreadRandom};
use crate::generators::{SeedGenerator, SeedGeneratorConfig};
use crate::services::app_routes;

/// 命令执行器
pub struct CommandRunner {
    config: AppConfig,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 执行 server 命令
    ///
    /// 启动 HTTP 服务，可选地预先写入轨迹 seed 文件。
    pub async fn run_server(
        &self,
        port: Option<u16>,
        seed_file: Option<String>,
        random_seed: Option<u64>,
    ) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(port) = port {
            config.server.port = port;
        }
        info!(port = config.server.port, ?random_seed, "启动承运商模拟器");

        let random: Arc<dyn RandomSource> = match random_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        let emulator = Arc::new(Emulator::new(
            config.emulator.clone(),
            Arc::new(SystemClock),
            random,
        ));

        if let Some(ref path) = seed_file {
            let items: Vec<SeedV1Item> = load_seed_file(path)?;
            let count = emulator
                .seed_tracks(items.into_iter().map(Into::into).collect())
                .with_context(|| format!("写入 seed 文件失败: {}", path))?;
            info!(count, path, "预写入轨迹状态完成");
        }

        let app = build_app(emulator);

        let addr = config.server_addr();
        let listener = TcpListener::bind(&addr).await.context("绑定端口失败")?;

        info!("承运商模拟器已启动: http://{}", addr);
        info!("可用端点:");
        info!("  GET  /health, /ready - 健康检查");
        info!("  POST /v1/admin/seed, /v1/admin/seed-v1, /v1/admin/reset - 管理");
        info!("  GET  /v1/tracking/{{carrier}}/{{trackNumber}} - 承运商接口");
        info!("  GET  /tracking.json.php - Track24 风格接口");
        info!("  GET  /gdeposylka/api/v4/track - gdeposylka 风格接口");
        info!("按 Ctrl+C 停止服务");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务器运行失败")?;

        info!("承运商模拟器已停止");
        Ok(())
    }

    /// 执行 generate 命令
    ///
    /// 生成轨迹 seed 数据，输出到文件或 stdout。
    pub async fn run_generate(
        &self,
        count: usize,
        carriers: Vec<String>,
        step_seconds: i64,
        progress_prob: f64,
        output: Option<String>,
    ) -> Result<()> {
        let carriers: Vec<String> = carriers
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if carriers.is_empty() {
            bail!("承运商列表不能为空");
        }

        info!(count, ?carriers, step_seconds, progress_prob, "生成 seed 数据");

        let generator = SeedGenerator::new(SeedGeneratorConfig {
            count,
            carriers,
            step_seconds,
            progress_prob,
        });
        let items = generator.generate()?;
        let json = serde_json::to_string_pretty(&SeedBody::Wrapped { items })
            .context("序列化 seed 数据失败")?;

        match output {
            Some(path) => {
                let mut file =
                    fs::File::create(&path).with_context(|| format!("创建文件失败: {}", path))?;
                file.write_all(json.as_bytes())
                    .with_context(|| format!("写入文件失败: {}", path))?;
                info!(path, count, "seed 数据已写入");
            }
            None => println!("{}", json),
        }

        Ok(())
    }

    /// 执行 seed 命令
    ///
    /// 读取 seed 文件并提交到运行中的模拟器。
    pub async fn run_seed(&self, emulator_base: &str, file: &str, kind: SeedKind) -> Result<()> {
        let body = match kind {
            SeedKind::Tracks => {
                let items: Vec<SeedV1Item> = load_seed_file(file)?;
                serde_json::to_value(SeedBody::Wrapped { items })?
            }
            SeedKind::Scenarios => {
                let items: Vec<SeedItem> = load_seed_file(file)?;
                serde_json::to_value(SeedBody::Wrapped { items })?
            }
        };

        let url = format!("{}{}", emulator_base.trim_end_matches('/'), kind.endpoint());
        info!(url = %url, file, "提交 seed 数据");

        let response = reqwest::Client::new()
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("请求模拟器失败: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("模拟器返回错误 {}: {}", status, text);
        }

        let resp: SeedResponse = response.json().await.context("解析模拟器响应失败")?;
        info!(count = resp.count, "seed 数据已写入模拟器");
        Ok(())
    }
}

/// 组装 HTTP 应用：业务路由 + 可观测性中间件 + CORS
pub fn build_app(emulator: Arc<Emulator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app_routes(emulator)
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
}

/// 从 JSON/YAML 文件加载并校验 seed 条目
///
/// 文件内容可以是裸列表，也可以是 `{"items": [...]}`。
fn load_seed_file<T>(path: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned + validator::Validate,
{
    let content = fs::read_to_string(path).with_context(|| format!("读取 seed 文件失败: {}", path))?;

    // 根据文件扩展名选择解析方式
    let body: SeedBody<T> = if path.ends_with(".yaml") || path.ends_with(".yml") {
        serde_yaml::from_str(&content).with_context(|| format!("解析 YAML seed 失败: {}", path))?
    } else {
        serde_json::from_str(&content).with_context(|| format!("解析 JSON seed 失败: {}", path))?
    };

    let items = body
        .into_validated()
        .with_context(|| format!("seed 数据校验失败: {}", path))?;
    if items.is_empty() {
        warn!(path, "seed 文件没有条目");
    }
    Ok(items)
}

/// 监听关闭信号
///
/// 收到 Ctrl+C 或 SIGTERM 后返回，触发 axum 的优雅关闭流程。
/// 信号处理器注册失败时只记录日志，服务继续运行直到另一个信号到达。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，正在停止服务..."),
        _ = terminate => info!("收到 SIGTERM，正在停止服务..."),
    }
}
