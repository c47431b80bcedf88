//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量调试跟踪
//!
//! 每个信号量操作进入时调用一次 [`Tracer::trace`]，
//! 跟踪器由创建者注入，默认是什么都不做的 [`NoopTracer`]。
//! 跟踪器总是在锁外调用。

use core::fmt;
use std::time::Instant;

use crate::config::TRACE_TARGET;

/// 被跟踪的操作
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    /// 初始化
    Init { value: u32, shared: bool },
    /// 销毁
    Destroy,
    /// 非阻塞获取
    TryWait,
    /// 带截止时间的获取，`None` 表示无限等待
    TimedWait { deadline: Option<Instant> },
    /// 阻塞获取
    Wait,
    /// 释放
    Post,
    /// 读取当前值
    GetValue,
}

impl Op {
    /// 操作名称
    pub const fn name(&self) -> &'static str {
        match self {
            Op::Init { .. } => "init",
            Op::Destroy => "destroy",
            Op::TryWait => "try_wait",
            Op::TimedWait { .. } => "timed_wait",
            Op::Wait => "wait",
            Op::Post => "post",
            Op::GetValue => "get_value",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Init { value, shared } => write!(f, "init({}, {})", value, shared),
            Op::TimedWait { deadline: Some(deadline) } => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                write!(f, "timed_wait(+{:?})", remaining)
            }
            Op::TimedWait { deadline: None } => f.write_str("timed_wait(none)"),
            op => write!(f, "{}()", op.name()),
        }
    }
}

/// 信号量跟踪接口
///
/// `sem` 只用于标识信号量实例，不能解引用
pub trait Tracer: Send + Sync {
    fn trace(&self, sem: *const (), op: Op);
}

/// 不输出任何内容
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline]
    fn trace(&self, _sem: *const (), _op: Op) {}
}

/// 通过 `log` 门面输出 debug 级别日志
#[derive(Debug, Default, Copy, Clone)]
pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace(&self, sem: *const (), op: Op) {
        log::debug!(target: TRACE_TARGET, "{:p}: {}", sem, op);
    }
}

impl<F> Tracer for F
where
    F: Fn(*const (), Op) + Send + Sync,
{
    fn trace(&self, sem: *const (), op: Op) {
        self(sem, op)
    }
}
