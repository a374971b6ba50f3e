//! 虚拟策略模型解析
//!
//! 将虚拟策略模型名称解析为真实上游模型名称。未识别的名称原样透传，
//! 解析永不失败。概率型策略从进程级共享随机源取数，负载降级策略在
//! 解析时读取一次过载信号。

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::gauge::{ActiveRequestGauge, OverloadSignal};
use super::models::{
    VirtualPolicy, MODEL_CLAUDE_3_HAIKU, MODEL_CLAUDE_3_SONNET, MODEL_GEMINI_FLASH,
    MODEL_GPT_35_TURBO, MODEL_GPT_4O,
};

/// 进程级共享随机源
///
/// 首次使用时以墙钟纳秒种子化一次，之后不再重新播种。
static POLICY_RNG: Lazy<Mutex<StdRng>> = Lazy::new(|| {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed_cafe);
    Mutex::new(StdRng::seed_from_u64(seed))
});

/// 解析记录
///
/// 随请求生命周期传递，响应阶段据此把 model 字段改回原始名称。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResolution {
    /// 客户端请求的原始模型名称
    pub original_model: String,
    /// 解析后的真实模型名称
    pub resolved_model: String,
    /// 原始名称是否为虚拟策略模型
    pub was_virtual: bool,
}

/// 虚拟策略解析器
///
/// 过载信号通过 [`OverloadSignal`] 注入，便于测试时替换为桩实现。
#[derive(Debug, Clone)]
pub struct PolicyResolver<S> {
    signal: S,
}

impl PolicyResolver<&'static ActiveRequestGauge> {
    /// 创建读取进程级计数器的解析器
    pub fn new() -> Self {
        Self {
            signal: ActiveRequestGauge::global(),
        }
    }
}

impl Default for PolicyResolver<&'static ActiveRequestGauge> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OverloadSignal> PolicyResolver<S> {
    /// 使用自定义过载信号创建解析器
    pub fn with_signal(signal: S) -> Self {
        Self { signal }
    }

    /// 解析模型名称
    pub fn resolve(&self, model: &str) -> PolicyResolution {
        let mut rng = POLICY_RNG.lock();
        self.resolve_with_rng(model, &mut *rng)
    }

    /// 使用指定随机源解析模型名称
    pub fn resolve_with_rng<R: Rng + ?Sized>(&self, model: &str, rng: &mut R) -> PolicyResolution {
        let (resolved_model, was_virtual) = match VirtualPolicy::from_model_name(model) {
            Some(policy) => {
                let resolved = self.resolve_policy(policy, rng);
                tracing::debug!(
                    "[POLICY] virtual_model={} resolved_model={}",
                    model,
                    resolved
                );
                (resolved, true)
            }
            None => (model.to_string(), false),
        };

        PolicyResolution {
            original_model: model.to_string(),
            resolved_model,
            was_virtual,
        }
    }

    /// 按策略规则选择真实模型
    ///
    /// 概率分支的边界为左闭右开（u < p），保证极限比例与标称一致。
    fn resolve_policy<R: Rng + ?Sized>(&self, policy: VirtualPolicy, rng: &mut R) -> String {
        let model = match policy {
            VirtualPolicy::HighAvailability => {
                if rng.gen::<f32>() < 0.5 {
                    MODEL_GPT_4O
                } else {
                    MODEL_CLAUDE_3_SONNET
                }
            }
            VirtualPolicy::CostOptimized => {
                if rng.gen::<f32>() < 0.8 {
                    MODEL_GEMINI_FLASH
                } else {
                    MODEL_CLAUDE_3_HAIKU
                }
            }
            VirtualPolicy::QualityFirst => MODEL_GPT_4O,
            // 过载信号在解析时读取一次，不在转发时复读
            VirtualPolicy::LoadDegrade => {
                if self.signal.overloaded() {
                    MODEL_GPT_35_TURBO
                } else {
                    MODEL_GPT_4O
                }
            }
        };
        model.to_string()
    }
}
