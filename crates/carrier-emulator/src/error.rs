//! 模拟器错误类型定义
//!
//! 每个错误只影响当前请求，不会中断进程。

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 模拟器错误类型
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    #[error("rate limit exceeded for {carrier} ({limit}/min)")]
    RateLimitExceeded {
        carrier: String,
        limit: u32,
        /// 当前分钟窗口剩余秒数
        retry_after_secs: u64,
    },

    #[error("emulator: random failure")]
    InjectedFailure,

    #[error("track not found (seed it via /v1/admin/seed): {track}")]
    ScenarioNotFound { track: String },

    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error("响应序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EmulatorError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InjectedFailure => StatusCode::SERVICE_UNAVAILABLE,
            Self::ScenarioNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::InjectedFailure => "INJECTED_FAILURE",
            Self::ScenarioNotFound { .. } => "SCENARIO_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

impl IntoResponse for EmulatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "detail": self.to_string(),
            "code": self.error_code(),
        });

        let mut response = (status, axum::Json(body)).into_response();
        if let Self::RateLimitExceeded {
            retry_after_secs, ..
        } = self
            && let Ok(val) = HeaderValue::from_str(&retry_after_secs.to_string())
        {
            response.headers_mut().insert("Retry-After", val);
        }
        response
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for EmulatorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 模拟器 Result 类型别名
pub type Result<T> = std::result::Result<T, EmulatorError>;
