//! 过载降频步骤

use super::traits::{PipelineStep, StepError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use veriflow_core::policy::{ActiveRequestGauge, OverloadClamp, OverloadSignal};
use veriflow_core::processor::RequestContext;

/// 过载降频步骤
///
/// 转发前对请求体执行过载降频，并把降频结果记入上下文元数据。
pub struct LoadShedStep<S: OverloadSignal = &'static ActiveRequestGauge> {
    clamp: Arc<OverloadClamp<S>>,
    enabled: Arc<RwLock<bool>>,
}

impl LoadShedStep {
    /// 创建读取进程级计数器的降频步骤
    pub fn new() -> Self {
        Self::with_clamp(Arc::new(OverloadClamp::new()))
    }
}

impl Default for LoadShedStep {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OverloadSignal> LoadShedStep<S> {
    /// 使用自定义降频器创建降频步骤
    pub fn with_clamp(clamp: Arc<OverloadClamp<S>>) -> Self {
        Self {
            clamp,
            enabled: Arc::new(RwLock::new(true)),
        }
    }

    pub fn with_enabled(self, enabled: Arc<RwLock<bool>>) -> Self {
        Self { enabled, ..self }
    }

    pub async fn is_shedding_enabled(&self) -> bool {
        *self.enabled.read().await
    }
}

#[async_trait]
impl<S: OverloadSignal> PipelineStep for LoadShedStep<S> {
    async fn execute(
        &self,
        ctx: &mut RequestContext,
        payload: &mut serde_json::Value,
    ) -> Result<(), StepError> {
        if !self.is_shedding_enabled().await {
            return Ok(());
        }

        let result = self.clamp.clamp(payload);

        if result.has_clamps() {
            tracing::info!(
                "[SHED] request_id={} clamped_params={:?}",
                ctx.request_id,
                result.clamped_params
            );
            ctx.set_metadata(
                "shed_result",
                serde_json::json!({"clamped_params": result.clamped_params}),
            );
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "load_shed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSignal(bool);

    impl OverloadSignal for StubSignal {
        fn overloaded(&self) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn test_shed_step_clamps_under_overload() {
        let step = LoadShedStep::with_clamp(Arc::new(OverloadClamp::with_signal(StubSignal(true))));
        let mut ctx = RequestContext::new("gpt-4o".to_string());
        let mut payload = serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "temperature": 0.7,
        });

        step.execute(&mut ctx, &mut payload).await.unwrap();
        assert_eq!(payload["max_tokens"], 100);
        assert_eq!(payload["temperature"], serde_json::json!(1.2));
        assert!(ctx.metadata.contains_key("shed_result"));
    }

    #[tokio::test]
    async fn test_shed_step_noop_when_not_overloaded() {
        let step =
            LoadShedStep::with_clamp(Arc::new(OverloadClamp::with_signal(StubSignal(false))));
        let mut ctx = RequestContext::new("gpt-4o".to_string());
        let mut payload = serde_json::json!({"model": "gpt-4o", "max_tokens": 2000});
        let before = payload.clone();

        step.execute(&mut ctx, &mut payload).await.unwrap();
        assert_eq!(payload, before);
        assert!(!ctx.metadata.contains_key("shed_result"));
    }

    #[tokio::test]
    async fn test_shed_step_disabled() {
        let step = LoadShedStep::with_clamp(Arc::new(OverloadClamp::with_signal(StubSignal(true))))
            .with_enabled(Arc::new(RwLock::new(false)));
        let mut ctx = RequestContext::new("gpt-4o".to_string());
        let mut payload = serde_json::json!({"model": "gpt-4o", "max_tokens": 2000});
        let before = payload.clone();

        step.execute(&mut ctx, &mut payload).await.unwrap();
        assert_eq!(payload, before);
    }
}
