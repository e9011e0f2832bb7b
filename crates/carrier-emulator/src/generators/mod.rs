//! 生成器模块
//!
//! 批量生成 seed 数据，供压测和演示使用。

pub mod seed_generator;

pub use seed_generator::{SeedGenerator, SeedGeneratorConfig};
