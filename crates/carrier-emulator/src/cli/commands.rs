//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand, ValueEnum};
use trackbox_shared::config::AppConfig;

/// 承运商模拟器命令行工具
#[derive(Parser, Debug)]
#[command(name = "carrier-emulator")]
#[command(version, about = "承运商追踪接口模拟器")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，未指定时使用配置文件中的值
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// seed 文件的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedKind {
    /// 轨迹状态，写入 /v1/admin/seed-v1
    Tracks,
    /// 场景，写入 /v1/admin/seed
    Scenarios,
}

impl SeedKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Tracks => "/v1/admin/seed-v1",
            Self::Scenarios => "/v1/admin/seed",
        }
    }
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动模拟器 HTTP 服务
    ///
    /// 提供承运商、Track24、gdeposylka 三组接口以及管理接口。
    Server {
        /// 服务端口（覆盖配置文件）
        #[arg(short, long)]
        port: Option<u16>,

        /// 启动时预先写入的轨迹 seed 文件（JSON/YAML）
        #[arg(long)]
        seed_file: Option<String>,

        /// 固定随机种子，用于复现概率推进和随机失败
        #[arg(long)]
        random_seed: Option<u64>,
    },

    /// 生成轨迹 seed 数据
    Generate {
        /// 生成数量
        #[arg(short, long, default_value = "1000")]
        count: usize,

        /// 承运商列表，逗号分隔
        #[arg(long, value_delimiter = ',', default_value = "CDEK,POST_RU")]
        carriers: Vec<String>,

        /// 每步间隔秒数
        #[arg(long, default_value = "10")]
        step_seconds: i64,

        /// 每次轮询推进概率
        #[arg(long, default_value = "0.2")]
        progress_prob: f64,

        /// 输出到文件（JSON 格式），默认输出到 stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 把 seed 文件写入运行中的模拟器
    Seed {
        /// 模拟器地址
        #[arg(long, default_value = "http://localhost:9000")]
        emulator_base: String,

        /// seed 文件路径（JSON/YAML）
        #[arg(short, long)]
        file: String,

        /// 文件内容类型
        #[arg(long, value_enum, default_value = "tracks")]
        kind: SeedKind,
    },
}

// ============================================================================
// 单元测试
// ============================================================================

impl Cli {
    /// 用命令行参数覆盖已加载的配置
    ///
    /// 只有显式给出的 `--log-level` 才覆盖配置；一次性命令不启动指标服务器。
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(ref level) = self.log_level {
            config.observability.log_level = level.clone();
        }
        if !matches!(self.command, Commands::Server { .. }) {
            config.observability.metrics_enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_server() {
        let cli = Cli::parse_from(["carrier-emulator", "server"]);
        match cli.command {
            Commands::Server {
                port,
                seed_file,
                random_seed,
            } => {
                assert!(port.is_none());
                assert!(seed_file.is_none());
                assert!(random_seed.is_none());
            }
            _ => panic!("预期 Server 命令"),
        }

        let cli = Cli::parse_from([
            "carrier-emulator",
            "server",
            "--port",
            "9100",
            "--seed-file",
            "seeds.yaml",
            "--random-seed",
            "42",
        ]);
        match cli.command {
            Commands::Server {
                port,
                seed_file,
                random_seed,
            } => {
                assert_eq!(port, Some(9100));
                assert_eq!(seed_file.as_deref(), Some("seeds.yaml"));
                assert_eq!(random_seed, Some(42));
            }
            _ => panic!("预期 Server 命令"),
        }
    }

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::parse_from(["carrier-emulator", "generate"]);
        match cli.command {
            Commands::Generate {
                count,
                carriers,
                step_seconds,
                progress_prob,
                output,
            } => {
                assert_eq!(count, 1000);
                assert_eq!(carriers, vec!["CDEK", "POST_RU"]);
                assert_eq!(step_seconds, 10);
                assert_eq!(progress_prob, 0.2);
                assert!(output.is_none());
            }
            _ => panic!("预期 Generate 命令"),
        }

        let cli = Cli::parse_from([
            "carrier-emulator",
            "generate",
            "-c",
            "5",
            "--carriers",
            "DHL",
            "-o",
            "out.json",
        ]);
        match cli.command {
            Commands::Generate {
                count,
                carriers,
                output,
                ..
            } => {
                assert_eq!(count, 5);
                assert_eq!(carriers, vec!["DHL"]);
                assert_eq!(output.as_deref(), Some("out.json"));
            }
            _ => panic!("预期 Generate 命令"),
        }
    }

    #[test]
    fn test_cli_parse_seed() {
        let cli = Cli::parse_from([
            "carrier-emulator",
            "seed",
            "-f",
            "scenarios.json",
            "--kind",
            "scenarios",
        ]);
        match cli.command {
            Commands::Seed {
                emulator_base,
                file,
                kind,
            } => {
                assert_eq!(emulator_base, "http://localhost:9000");
                assert_eq!(file, "scenarios.json");
                assert_eq!(kind, SeedKind::Scenarios);
                assert_eq!(kind.endpoint(), "/v1/admin/seed");
            }
            _ => panic!("预期 Seed 命令"),
        }
    }

    #[test]
    fn test_global_log_level() {
        let cli = Cli::parse_from(["carrier-emulator", "--log-level", "debug", "server"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_apply_to_keeps_configured_log_level_without_flag() {
        let mut config = AppConfig::default();
        config.observability.log_level = "warn".to_string();
        config.observability.metrics_enabled = true;

        let cli = Cli::parse_from(["carrier-emulator", "server"]);
        cli.apply_to(&mut config);
        assert_eq!(config.observability.log_level, "warn");
        assert!(config.observability.metrics_enabled);

        let cli = Cli::parse_from(["carrier-emulator", "-l", "debug", "generate"]);
        cli.apply_to(&mut config);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }
}
