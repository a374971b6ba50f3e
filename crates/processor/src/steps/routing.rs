//! 策略路由步骤

use super::traits::{PipelineStep, StepError};
use async_trait::async_trait;
use std::sync::Arc;
use veriflow_core::policy::{ActiveRequestGauge, OverloadSignal, PolicyResolver};
use veriflow_core::processor::RequestContext;

/// 策略路由步骤
///
/// 把请求体中的虚拟策略模型解析为真实模型，在上下文中记录解析记录，
/// 并改写请求体的 model 字段。未识别的模型名称原样透传。
pub struct PolicyRoutingStep<S: OverloadSignal = &'static ActiveRequestGauge> {
    resolver: Arc<PolicyResolver<S>>,
}

impl PolicyRoutingStep {
    /// 创建读取进程级计数器的路由步骤
    pub fn new() -> Self {
        Self {
            resolver: Arc::new(PolicyResolver::new()),
        }
    }
}

impl Default for PolicyRoutingStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OverloadSignal> PolicyRoutingStep<S> {
    /// 使用自定义解析器创建路由步骤
    pub fn with_resolver(resolver: Arc<PolicyResolver<S>>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl<S: OverloadSignal> PipelineStep for PolicyRoutingStep<S> {
    async fn execute(
        &self,
        ctx: &mut RequestContext,
        payload: &mut serde_json::Value,
    ) -> Result<(), StepError> {
        let resolution = self.resolver.resolve(&ctx.original_model);
        ctx.apply_resolution(&resolution);

        let obj = payload
            .as_object_mut()
            .ok_or_else(|| StepError::Routing("请求体不是 JSON 对象".to_string()))?;
        obj.insert(
            "model".to_string(),
            serde_json::json!(resolution.resolved_model),
        );

        tracing::info!(
            "[ROUTE] request_id={} original_model={} resolved_model={} was_virtual={}",
            ctx.request_id,
            ctx.original_model,
            ctx.resolved_model,
            ctx.was_virtual
        );

        Ok(())
    }

    fn name(&self) -> &str {
        "policy_routing"
    }
}
