//! 请求处理器实现
//!
//! 把网关与决策核心之间的三个挂接点串成一条管道：
//!
//! 1. 请求入场：策略路由（PolicyRoutingStep）+ 活跃请求登记
//! 2. 转发前：过载降频（LoadShedStep）
//! 3. 响应阶段：model 字段回写（spoof）
//!
//! 活跃请求的注销由 [`ActiveRequestGuard`] 的 Drop 完成，调用方只需
//! 把守卫持有到请求结束，任何退出路径都会配对注销。

use serde_json::Value;
use std::sync::Arc;

use veriflow_core::policy::{
    ActiveRequestGauge, ActiveRequestGuard, OverloadClamp, OverloadSignal, PolicyResolver,
};
use veriflow_core::processor::RequestContext;

use crate::spoof;
use crate::steps::{LoadShedStep, PipelineStep, PolicyRoutingStep, StepError};

/// 请求处理器
///
/// 持有路由与降频两个入场步骤以及活跃请求计数器。
pub struct RequestProcessor<S: OverloadSignal = &'static ActiveRequestGauge> {
    /// 策略路由步骤
    pub routing: PolicyRoutingStep<S>,
    /// 过载降频步骤
    pub shedding: LoadShedStep<S>,
    /// 活跃请求计数器
    gauge: &'static ActiveRequestGauge,
}

impl RequestProcessor {
    /// 创建读取进程级计数器的请求处理器
    pub fn new() -> Self {
        Self {
            routing: PolicyRoutingStep::new(),
            shedding: LoadShedStep::new(),
            gauge: ActiveRequestGauge::global(),
        }
    }
}

impl Default for RequestProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OverloadSignal + Clone> RequestProcessor<S> {
    /// 使用自定义过载信号创建请求处理器
    ///
    /// 路由与降频共享同一个信号；活跃请求仍登记在进程级计数器上，
    /// 需要隔离计数时配合 [`Self::with_gauge`] 使用。
    pub fn with_signal(signal: S) -> Self {
        Self {
            routing: PolicyRoutingStep::with_resolver(Arc::new(PolicyResolver::with_signal(
                signal.clone(),
            ))),
            shedding: LoadShedStep::with_clamp(Arc::new(OverloadClamp::with_signal(signal))),
            gauge: ActiveRequestGauge::global(),
        }
    }
}

impl<S: OverloadSignal> RequestProcessor<S> {
    /// 替换活跃请求计数器
    pub fn with_gauge(mut self, gauge: &'static ActiveRequestGauge) -> Self {
        self.gauge = gauge;
        self
    }

    /// 请求入场
    ///
    /// 依次执行策略路由、活跃请求登记、过载降频。返回的守卫必须持有
    /// 到请求结束（含错误路径），Drop 时自动注销计数。
    pub async fn admit(
        &self,
        ctx: &mut RequestContext,
        payload: &mut Value,
    ) -> Result<ActiveRequestGuard<'static>, StepError> {
        self.routing.execute(ctx, payload).await?;
        let guard = ActiveRequestGuard::acquire_on(self.gauge);
        self.shedding.execute(ctx, payload).await?;
        Ok(guard)
    }

    /// 响应阶段：把 model 字段改回原始名称
    ///
    /// 一元响应与每个流式分块都应经过此调用。
    pub fn restore_response_model(&self, ctx: &RequestContext, response: &mut Value) -> bool {
        spoof::restore_response_model(ctx, response)
    }
}
