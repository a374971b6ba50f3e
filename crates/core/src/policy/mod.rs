//! 虚拟策略模型与负载降级模块
//!
//! 网关路由决策面的三个紧密相关的能力：
//! - 活跃请求计量（gauge）：进程级在途请求计数与过载信号
//! - 策略解析（resolver）：将虚拟策略模型名称解析为真实上游模型
//! - 过载降频（clamp）：过载时压低出站请求的采样参数
//!
//! 三者均为全函数，任何操作都不会失败；未识别的模型名称原样透传。

mod clamp;
mod gauge;
mod models;
mod resolver;

pub use clamp::{ClampResult, OverloadClamp, DEGRADED_MAX_TOKENS, DEGRADED_TEMPERATURE};
pub use gauge::{ActiveRequestGauge, ActiveRequestGuard, OverloadSignal, OVERLOAD_THRESHOLD};
pub use models::{
    is_virtual_policy_model, VirtualPolicy, MODEL_CLAUDE_3_HAIKU, MODEL_CLAUDE_3_SONNET,
    MODEL_GEMINI_FLASH, MODEL_GPT_35_TURBO, MODEL_GPT_4O,
};
pub use resolver::{PolicyResolution, PolicyResolver};
