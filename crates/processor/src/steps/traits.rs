//! 管道步骤 trait 定义

use async_trait::async_trait;
use thiserror::Error;
use veriflow_core::processor::RequestContext;

/// 步骤错误
#[derive(Error, Debug, Clone)]
pub enum StepError {
    #[error("路由错误: {0}")]
    Routing(String),
    #[error("降频错误: {0}")]
    Shedding(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl StepError {
    /// 获取对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            StepError::Routing(_) => 400,
            StepError::Shedding(_) => 400,
            StepError::Internal(_) => 500,
        }
    }
}

/// 管道步骤 trait
#[async_trait]
pub trait PipelineStep: Send + Sync {
    async fn execute(
        &self,
        ctx: &mut RequestContext,
        payload: &mut serde_json::Value,
    ) -> Result<(), StepError>;

    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool {
        true
    }
}
