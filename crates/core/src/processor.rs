//! 请求处理上下文
//!
//! 在管道步骤间传递请求级状态，包括解析记录与响应回写所需的原始模型名称。

use std::collections::HashMap;
use uuid::Uuid;

use crate::policy::PolicyResolution;

/// 请求上下文
///
/// 生命周期与单个请求相同，不做持久化。
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// 请求 ID
    pub request_id: String,
    /// 客户端请求的原始模型名称
    pub original_model: String,
    /// 解析后的真实模型名称
    pub resolved_model: String,
    /// 原始名称是否为虚拟策略模型
    pub was_virtual: bool,
    /// 请求级元数据
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RequestContext {
    /// 创建新的请求上下文
    pub fn new(original_model: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            resolved_model: original_model.clone(),
            original_model,
            was_virtual: false,
            metadata: HashMap::new(),
        }
    }

    /// 设置解析后的模型名称
    pub fn set_resolved_model(&mut self, model: String) {
        self.resolved_model = model;
    }

    /// 记录一次解析结果
    pub fn apply_resolution(&mut self, resolution: &PolicyResolution) {
        self.resolved_model = resolution.resolved_model.clone();
        self.was_virtual = resolution.was_virtual;
    }

    /// 设置元数据
    pub fn set_metadata(&mut self, key: &str, value: serde_json::Value) {
        self.metadata.insert(key.to_string(), value);
    }
}
