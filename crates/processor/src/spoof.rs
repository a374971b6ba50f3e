//! 响应模型名称回写
//!
//! 对虚拟策略请求，把响应中的 model 字段改回客户端请求的原始名称，
//! 客户端始终只观察到自己请求的虚拟模型名。一元响应与流式分块共用
//! 同一个入口，分块缺少 model 字段时不做处理。

use veriflow_core::processor::RequestContext;

/// 回写一元响应或流式分块中的 model 字段
///
/// 返回是否发生了改写。仅在请求经过虚拟策略解析（was_virtual）且
/// 响应对象携带 model 字段时生效。
pub fn restore_response_model(ctx: &RequestContext, response: &mut serde_json::Value) -> bool {
    if !ctx.was_virtual {
        return false;
    }

    let obj = match response.as_object_mut() {
        Some(obj) => obj,
        None => return false,
    };
    if !obj.contains_key("model") {
        return false;
    }

    obj.insert(
        "model".to_string(),
        serde_json::json!(ctx.original_model),
    );
    tracing::debug!(
        "[SPOOF] request_id={} model={}",
        ctx.request_id,
        ctx.original_model
    );
    true
}
