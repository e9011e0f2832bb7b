//! Carrier Emulator
//!
//! 模拟多家第三方物流追踪服务的测试替身，供追踪平台在集成测试和演示中使用。
//!
//! # 主要模块
//!
//! - `engine`: 场景/状态引擎（故障注入、承运商限流、场景仓库、追踪状态机）
//! - `adapters`: 三种外部 JSON 格式的渲染
//! - `services`: axum HTTP 接口
//! - `generators`: seed 数据生成
//!
//! # 使用示例
//!
//! ```rust
//! use std::sync::Arc;
//! use carrier_emulator::engine::{Emulator, fault::FaultSpec};
//! use carrier_emulator::services::app_routes;
//! use trackbox_shared::config::EmulatorConfig;
//!
//! let emulator = Arc::new(Emulator::with_config(EmulatorConfig::default()));
//! let app = app_routes(emulator.clone());
//! # let _ = (app, FaultSpec::default());
//! ```

pub mod adapters;
pub mod cli;
pub mod dto;
pub mod engine;
pub mod error;
pub mod generators;
pub mod services;
pub mod store;

pub use engine::Emulator;
pub use error::{EmulatorError, Result};
