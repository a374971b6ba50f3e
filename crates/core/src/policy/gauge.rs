//! 活跃请求计量
//!
//! 进程级的在途请求计数器，为负载降级策略与过载降频提供过载信号。
//! 所有操作基于单个原子整数单元，无锁且有界时间完成，永不失败。

use std::sync::atomic::{AtomicI64, Ordering};

/// 过载阈值：活跃请求数严格大于该值时视为过载，恰好等于阈值不算过载
pub const OVERLOAD_THRESHOLD: i64 = 50;

/// 过载信号能力
///
/// 解析器与降频器通过该 trait 读取过载状态，测试时可注入桩实现。
pub trait OverloadSignal: Send + Sync {
    fn overloaded(&self) -> bool;
}

impl<T: OverloadSignal + ?Sized> OverloadSignal for &T {
    fn overloaded(&self) -> bool {
        (**self).overloaded()
    }
}

impl<T: OverloadSignal + ?Sized> OverloadSignal for std::sync::Arc<T> {
    fn overloaded(&self) -> bool {
        (**self).overloaded()
    }
}

/// 活跃请求计数器
#[derive(Debug, Default)]
pub struct ActiveRequestGauge {
    active: AtomicI64,
}

impl ActiveRequestGauge {
    pub const fn new() -> Self {
        Self {
            active: AtomicI64::new(0),
        }
    }

    /// 进程级单例，随进程创建为 0，随进程销毁
    pub fn global() -> &'static ActiveRequestGauge {
        static GLOBAL: ActiveRequestGauge = ActiveRequestGauge::new();
        &GLOBAL
    }

    /// 增加活跃请求计数，返回新值
    pub fn increment(&self) -> i64 {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 减少活跃请求计数，返回新值
    ///
    /// 调用方必须先行调用过 increment；不配对的 decrement 属于调用方缺陷，
    /// 计数器本身不做检测。
    pub fn decrement(&self) -> i64 {
        self.active.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// 读取当前活跃请求数（原子快照）
    pub fn read(&self) -> i64 {
        self.active.load(Ordering::SeqCst)
    }

    /// 是否过载
    ///
    /// 结果是一次瞬时快照，调用方使用该结果时计数可能已经变化。
    pub fn overloaded(&self) -> bool {
        self.read() > OVERLOAD_THRESHOLD
    }
}

impl OverloadSignal for ActiveRequestGauge {
    fn overloaded(&self) -> bool {
        ActiveRequestGauge::overloaded(self)
    }
}

/// 活跃请求作用域守卫
///
/// 创建时计数加一，Drop 时计数减一，保证任意退出路径上 increment
/// 与 decrement 成对出现。
#[derive(Debug)]
pub struct ActiveRequestGuard<'a> {
    gauge: &'a ActiveRequestGauge,
}

impl<'a> ActiveRequestGuard<'a> {
    /// 在指定计数器上登记一个活跃请求
    pub fn acquire_on(gauge: &'a ActiveRequestGauge) -> Self {
        gauge.increment();
        Self { gauge }
    }
}

impl ActiveRequestGuard<'static> {
    /// 在进程级单例上登记一个活跃请求
    pub fn acquire() -> Self {
        Self::acquire_on(ActiveRequestGauge::global())
    }
}

impl Drop for ActiveRequestGuard<'_> {
    fn drop(&mut self) {
        self.gauge.decrement();
    }
}
