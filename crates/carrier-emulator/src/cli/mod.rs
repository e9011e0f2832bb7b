//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `server` - 启动承运商模拟 HTTP 服务
//! - `generate` - 生成轨迹 seed 数据
//! - `seed` - 把 seed 文件写入运行中的模拟器
//!
//! # 使用示例
//!
//! ```bash
//! # 启动服务器
//! carrier-emulator server --port 9000 --seed-file seeds.json
//!
//! # 生成 seed 数据
//! carrier-emulator generate -c 500 --carriers CDEK,POST_RU -o seeds.json
//!
//! # 写入运行中的模拟器
//! carrier-emulator seed --emulator-base http://localhost:9000 -f seeds.json
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, SeedKind};
pub use runner::CommandRunner;
