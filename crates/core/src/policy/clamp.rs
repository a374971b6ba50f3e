//! 过载降频
//!
//! 过载时压低出站请求的采样参数，减小上游压力。降频只改采样参数，
//! 不改 model 字段，不影响路由结果。

use serde::{Deserialize, Serialize};

use super::gauge::{ActiveRequestGauge, OverloadSignal};

/// 降频后的 max_tokens 上限，原值不超过上限时保持不变
pub const DEGRADED_MAX_TOKENS: u64 = 100;

/// 降频后的 temperature 值
///
/// 过载时无条件改写，即使调用方传入的值低于 1.2 也会被覆盖。
pub const DEGRADED_TEMPERATURE: f64 = 1.2;

/// 降频结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClampResult {
    /// 执行降频时是否处于过载状态
    pub applied: bool,
    /// 被改写的参数名列表
    pub clamped_params: Vec<String>,
}

impl ClampResult {
    /// 检查是否有参数被改写
    pub fn has_clamps(&self) -> bool {
        !self.clamped_params.is_empty()
    }
}

/// 过载降频器
///
/// 与参数注入器相同，直接在请求体 JSON 上原地改写。
#[derive(Debug, Clone)]
pub struct OverloadClamp<S> {
    signal: S,
}

impl OverloadClamp<&'static ActiveRequestGauge> {
    /// 创建读取进程级计数器的降频器
    pub fn new() -> Self {
        Self {
            signal: ActiveRequestGauge::global(),
        }
    }
}

impl Default for OverloadClamp<&'static ActiveRequestGauge> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: OverloadSignal> OverloadClamp<S> {
    /// 使用自定义过载信号创建降频器
    pub fn with_signal(signal: S) -> Self {
        Self { signal }
    }

    /// 对出站请求执行降频
    ///
    /// 非过载时为空操作。过载时：
    /// - max_tokens 超过上限则压到上限，不超过则保持不变
    /// - temperature 无条件改写为降频值
    /// - model 字段不受影响
    pub fn clamp(&self, payload: &mut serde_json::Value) -> ClampResult {
        let mut result = ClampResult::default();
        if !self.signal.overloaded() {
            return result;
        }
        result.applied = true;

        let obj = match payload.as_object_mut() {
            Some(obj) => obj,
            None => return result,
        };

        if let Some(tokens) = obj.get("max_tokens").and_then(|v| v.as_u64()) {
            if tokens > DEGRADED_MAX_TOKENS {
                obj.insert(
                    "max_tokens".to_string(),
                    serde_json::json!(DEGRADED_MAX_TOKENS),
                );
                result.clamped_params.push("max_tokens".to_string());
            }
        }

        obj.insert(
            "temperature".to_string(),
            serde_json::json!(DEGRADED_TEMPERATURE),
        );
        result.clamped_params.push("temperature".to_string());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct StubSignal(bool);

    impl OverloadSignal for StubSignal {
        fn overloaded(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_noop_when_not_overloaded() {
        let clamp = OverloadClamp::with_signal(StubSignal(false));
        let mut payload = serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "temperature": 0.7,
        });
        let before = payload.clone();

        let result = clamp.clamp(&mut payload);
        assert!(!result.applied);
        assert!(!result.has_clamps());
        assert_eq!(payload, before);
    }

    #[test]
    fn test_clamps_max_tokens_and_temperature() {
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "temperature": 0.7,
        });

        let result = clamp.clamp(&mut payload);
        assert!(result.applied);
        assert_eq!(result.clamped_params, vec!["max_tokens", "temperature"]);
        assert_eq!(payload["max_tokens"], serde_json::json!(100));
        assert_eq!(payload["temperature"], serde_json::json!(1.2));
        assert_eq!(payload["model"], "gpt-4o");
    }

    #[test]
    fn test_small_max_tokens_untouched() {
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!({
            "model": "gpt-4",
            "max_tokens": 50,
            "temperature": 0.3,
        });

        let result = clamp.clamp(&mut payload);
        assert!(result.applied);
        assert_eq!(result.clamped_params, vec!["temperature"]);
        assert_eq!(payload["max_tokens"], serde_json::json!(50));
        assert_eq!(payload["temperature"], serde_json::json!(1.2));
    }

    #[test]
    fn test_temperature_raised_when_lower() {
        // 降频值会覆盖更低的 temperature，与既有网关行为一致
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!({"model": "gpt-4o", "temperature": 0.0});
        clamp.clamp(&mut payload);
        assert_eq!(payload["temperature"], serde_json::json!(1.2));
    }

    #[test]
    fn test_missing_params_only_sets_temperature() {
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!({"model": "gpt-4o"});

        let result = clamp.clamp(&mut payload);
        assert_eq!(result.clamped_params, vec!["temperature"]);
        assert!(payload.get("max_tokens").is_none());
        assert_eq!(payload["temperature"], serde_json::json!(1.2));
    }

    #[test]
    fn test_idempotent_under_overload() {
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!({
            "model": "gpt-4o",
            "max_tokens": 2000,
            "temperature": 0.7,
        });

        clamp.clamp(&mut payload);
        let once = payload.clone();
        clamp.clamp(&mut payload);
        assert_eq!(payload, once);
    }

    #[test]
    fn test_non_object_payload_is_left_alone() {
        let clamp = OverloadClamp::with_signal(StubSignal(true));
        let mut payload = serde_json::json!("not-an-object");
        let result = clamp.clamp(&mut payload);
        assert!(result.applied);
        assert!(!result.has_clamps());
        assert_eq!(payload, serde_json::json!("not-an-object"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// 降频永不改写 model 字段
        #[test]
        fn prop_model_field_untouched(
            model in "[a-zA-Z0-9._-]{1,24}",
            max_tokens in 0u64..100_000,
            overloaded: bool,
        ) {
            let clamp = OverloadClamp::with_signal(StubSignal(overloaded));
            let mut payload = serde_json::json!({
                "model": model.clone(),
                "max_tokens": max_tokens,
            });
            clamp.clamp(&mut payload);
            prop_assert_eq!(payload["model"].as_str(), Some(model.as_str()));
        }

        /// 过载下降频幂等：执行两次与执行一次的请求体相同
        #[test]
        fn prop_idempotent(
            max_tokens in 0u64..100_000,
            temperature in 0.0f64..2.0,
        ) {
            let clamp = OverloadClamp::with_signal(StubSignal(true));
            let mut payload = serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": max_tokens,
                "temperature": temperature,
            });
            clamp.clamp(&mut payload);
            let once = payload.clone();
            clamp.clamp(&mut payload);
            prop_assert_eq!(payload, once);
        }

        /// 过载下 max_tokens 不会超过上限，且不会被抬高
        #[test]
        fn prop_max_tokens_never_raised(max_tokens in 0u64..100_000) {
            let clamp = OverloadClamp::with_signal(StubSignal(true));
            let mut payload = serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": max_tokens,
            });
            clamp.clamp(&mut payload);
            let after = payload["max_tokens"].as_u64().unwrap();
            prop_assert!(after <= max_tokens);
            prop_assert_eq!(after, if max_tokens > DEGRADED_MAX_TOKENS { DEGRADED_MAX_TOKENS } else { max_tokens });
        }
    }
}
