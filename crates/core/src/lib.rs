//! VeriFlow 核心库
//!
//! 包含虚拟策略模型解析、活跃请求计量、过载降频等网关决策核心逻辑

pub mod policy;
pub mod processor;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
