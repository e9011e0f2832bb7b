//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            // 下游追踪平台默认指向 9000 端口
            port: 9000,
        }
    }
}

/// 单个承运商的限流配额
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarrierLimit {
    pub carrier: String,
    pub per_minute: u32,
}

impl CarrierLimit {
    pub fn new(carrier: impl Into<String>, per_minute: u32) -> Self {
        Self {
            carrier: carrier.into(),
            per_minute,
        }
    }
}

/// 模拟器配置
///
/// 承运商限流使用列表而不是 map：config crate 会把 map 的 key 转成小写，
/// 而承运商代码（CDEK、POST_RU）是大小写敏感的。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// 每分钟请求上限，未列出的承运商不限流
    pub rate_limits: Vec<CarrierLimit>,
    /// `delayMs` 参数允许的最大值
    pub max_delay_ms: u64,
    /// 自动创建的追踪状态：每步间隔秒数
    pub default_step_seconds: i64,
    /// 自动创建的追踪状态：每次轮询推进概率
    pub default_progress_prob: f64,
    /// Track24 默认场景的创建时间回拨秒数
    pub track24_backdate_seconds: i64,
    /// Track24 默认场景的步进间隔
    pub track24_step_seconds: i64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            rate_limits: vec![CarrierLimit::new("CDEK", 60), CarrierLimit::new("POST_RU", 20)],
            max_delay_ms: 10_000,
            default_step_seconds: 20,
            default_progress_prob: 0.25,
            track24_backdate_seconds: 600,
            track24_step_seconds: 60,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub emulator: EmulatorConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（TRACKBOX_ 前缀，双下划线分隔层级，如 TRACKBOX_SERVER__PORT -> server.port）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        // .env 文件可选，不存在时忽略
        let _ = dotenvy::dotenv();

        let env = std::env::var("TRACKBOX_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("TRACKBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
