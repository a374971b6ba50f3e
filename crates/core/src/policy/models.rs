//! 虚拟策略模型与真实模型名称定义

use serde::{Deserialize, Serialize};

/// 真实模型名称
pub const MODEL_GPT_4O: &str = "gpt-4o";
pub const MODEL_CLAUDE_3_SONNET: &str = "claude-3-sonnet-20240229";
pub const MODEL_GEMINI_FLASH: &str = "gemini-1.5-flash-latest";
pub const MODEL_CLAUDE_3_HAIKU: &str = "claude-3-haiku-20240307";
pub const MODEL_GPT_35_TURBO: &str = "gpt-3.5-turbo-0125";

/// 虚拟策略模型
///
/// 客户端可见的合成模型名称。名称本身不对应任何真实上游模型，
/// 而是对应一条路由规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualPolicy {
    /// 高可用策略：gpt-4o 与 claude-3-sonnet 各 50%
    HighAvailability,
    /// 成本效益策略：gemini-flash 与 claude-3-haiku 按 8:2 选择
    CostOptimized,
    /// 质量优先策略：固定使用 gpt-4o
    QualityFirst,
    /// 负载降级策略：过载时切换到 gpt-3.5-turbo
    LoadDegrade,
}

impl VirtualPolicy {
    /// 对外暴露的虚拟模型名称
    pub fn model_name(&self) -> &'static str {
        match self {
            VirtualPolicy::HighAvailability => "policy-a-ha",
            VirtualPolicy::CostOptimized => "policy-b-cost",
            VirtualPolicy::QualityFirst => "policy-c-quality",
            VirtualPolicy::LoadDegrade => "policy-d-degrade",
        }
    }

    /// 从模型名称解析虚拟策略
    ///
    /// 名称不在虚拟策略表中时返回 None。
    pub fn from_model_name(name: &str) -> Option<Self> {
        match name {
            "policy-a-ha" => Some(VirtualPolicy::HighAvailability),
            "policy-b-cost" => Some(VirtualPolicy::CostOptimized),
            "policy-c-quality" => Some(VirtualPolicy::QualityFirst),
            "policy-d-degrade" => Some(VirtualPolicy::LoadDegrade),
            _ => None,
        }
    }

    /// 获取所有虚拟策略
    pub fn all() -> &'static [VirtualPolicy] {
        &[
            VirtualPolicy::HighAvailability,
            VirtualPolicy::CostOptimized,
            VirtualPolicy::QualityFirst,
            VirtualPolicy::LoadDegrade,
        ]
    }
}

impl std::fmt::Display for VirtualPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

/// 检查模型名称是否为虚拟策略模型
pub fn is_virtual_policy_model(name: &str) -> bool {
    VirtualPolicy::from_model_name(name).is_some()
}
