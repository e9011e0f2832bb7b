//! seed 数据生成器
//!
//! 为指定承运商批量生成轨迹 seed 条目，轨迹号格式尽量接近真实承运商：
//! POST_RU 为简化的 UPU S10（2 位字母 + 9 位数字 + RU），CDEK 为 10 位数字，
//! 其它承运商为 `T` + 10 位大写字母数字。

use rand::Rng;

use crate::dto::SeedV1Item;
use crate::engine::defaults::default_steps_for;
use crate::error::{EmulatorError, Result};

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成器配置
#[derive(Debug, Clone)]
pub struct SeedGeneratorConfig {
    /// 生成条目数
    pub count: usize,
    /// 承运商列表，每条随机取一个
    pub carriers: Vec<String>,
    pub step_seconds: i64,
    pub progress_prob: f64,
}

impl Default for SeedGeneratorConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            carriers: vec!["CDEK".to_string(), "POST_RU".to_string()],
            step_seconds: 10,
            progress_prob: 0.2,
        }
    }
}

/// seed 数据生成器
pub struct SeedGenerator {
    config: SeedGeneratorConfig,
}

impl SeedGenerator {
    pub fn new(config: SeedGeneratorConfig) -> Self {
        Self { config }
    }

    /// 使用线程 RNG 生成
    pub fn generate(&self) -> Result<Vec<SeedV1Item>> {
        self.generate_with(&mut rand::rng())
    }

    /// 使用指定 RNG 生成，同一种子得到同一批数据
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Result<Vec<SeedV1Item>> {
        if self.config.carriers.is_empty() {
            return Err(EmulatorError::Validation("carriers 不能为空".to_string()));
        }
        if !(0.0..=1.0).contains(&self.config.progress_prob) {
            return Err(EmulatorError::Validation(
                "progressProb 必须在 0-1 之间".to_string(),
            ));
        }

        let items = (0..self.config.count)
            .map(|_| {
                let carrier =
                    &self.config.carriers[rng.random_range(0..self.config.carriers.len())];
                SeedV1Item {
                    carrier: carrier.clone(),
                    track_number: track_number_for(carrier, rng),
                    step_seconds: self.config.step_seconds,
                    progress_prob: self.config.progress_prob,
                    steps: default_steps_for(carrier),
                }
            })
            .collect();
        Ok(items)
    }
}

/// 按承运商格式生成轨迹号
pub fn track_number_for<R: Rng>(carrier: &str, rng: &mut R) -> String {
    match carrier {
        "POST_RU" => format!(
            "{}{}RU",
            random_chars(UPPERCASE, 2, rng),
            random_chars(DIGITS, 9, rng)
        ),
        "CDEK" => random_chars(DIGITS, 10, rng),
        _ => format!("T{}", random_chars(ALPHANUMERIC, 10, rng)),
    }
}

fn random_chars<R: Rng>(alphabet: &[u8], len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}
