//! 响应适配器
//!
//! 把引擎的状态渲染成三种外部 JSON 形状，渲染本身没有副作用。
//! 两个聚合器适配器读同一个场景仓库，但对缺失场景的处理不同，见各自的 `MISSING_POLICY`。

pub mod gdeposylka;
pub mod native;
pub mod track24;

/// 步骤未指定来源时使用的默认值
pub const DEFAULT_SOURCE: &str = "emulator";
