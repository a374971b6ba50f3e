//! 管道步骤模块
//!
//! 定义请求处理管道中的各个步骤

mod routing;
mod shedding;
mod traits;

pub use routing::PolicyRoutingStep;
pub use shedding::LoadShedStep;
pub use traits::{PipelineStep, StepError};
