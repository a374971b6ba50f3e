//! 请求处理器 crate
//!
//! 提供请求处理管道的网关侧接线：策略路由、活跃请求登记、过载降频、
//! 响应模型名称回写。
//!
//! ## 模块结构
//!
//! - `steps` - 管道步骤（策略路由、过载降频）
//! - `spoof` - 响应 model 字段回写
//! - `processor` - 把三个挂接点串起来的请求处理器

pub mod processor;
pub mod spoof;
pub mod steps;

pub use processor::RequestProcessor;
pub use spoof::restore_response_model;
pub use steps::*;
pub use veriflow_core::processor::RequestContext;
