//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 条件变量 (Condition Variable) 等待队列
//!
//! 对应：
//! - `pthread_cond_t` - POSIX 条件变量
//!
//! 核心概念：
//! - 等待队列必须与同一个互斥锁配合使用
//! - wait 原子地释放锁并睡眠，返回前重新获取锁
//! - 可能出现虚假唤醒，调用者必须在循环中重新检查条件
//! - signal() 唤醒一个等待者，broadcast() 唤醒所有等待者

use std::sync::{Condvar, MutexGuard, PoisonError};
use std::time::Instant;

/// 等待结果
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaitResult {
    /// 被唤醒（可能是虚假唤醒）
    Woken,
    /// 截止时间已到
    TimedOut,
}

impl WaitResult {
    /// 是否因截止时间到达而返回
    pub fn timed_out(self) -> bool {
        self == WaitResult::TimedOut
    }
}

/// 等待队列
///
/// 对 `std::sync::Condvar` 的封装，增加了按绝对截止时间等待的能力。
/// 锁中毒时直接取回内部数据：调用者保证临界区内的状态始终完整。
///
/// # 使用示例
/// ```
/// use std::sync::Mutex;
/// use condsem::sync::WaitQueue;
///
/// let ready = Mutex::new(true);
/// let queue = WaitQueue::new();
///
/// let mut guard = ready.lock().unwrap();
/// while !*guard {
///     guard = queue.wait(guard);
/// }
/// ```
#[derive(Debug, Default)]
pub struct WaitQueue {
    cond: Condvar,
}

impl WaitQueue {
    /// 创建新的等待队列
    pub const fn new() -> Self {
        Self { cond: Condvar::new() }
    }

    /// 无限等待，直到被唤醒
    ///
    /// 对应 POSIX 的 `pthread_cond_wait()`
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// 等待直到被唤醒或到达截止时间
    ///
    /// `deadline` 为 `None` 时等价于 [`WaitQueue::wait`]。
    /// 截止时间已过时不睡眠，直接返回 `TimedOut`。
    ///
    /// 对应 POSIX 的 `pthread_cond_timedwait()`
    pub fn wait_until<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        deadline: Option<Instant>,
    ) -> (MutexGuard<'a, T>, WaitResult) {
        let deadline = match deadline {
            Some(deadline) => deadline,
            None => return (self.wait(guard), WaitResult::Woken),
        };

        let now = Instant::now();
        if now >= deadline {
            return (guard, WaitResult::TimedOut);
        }

        let (guard, result) = self
            .cond
            .wait_timeout(guard, deadline - now)
            .unwrap_or_else(PoisonError::into_inner);

        if result.timed_out() {
            (guard, WaitResult::TimedOut)
        } else {
            (guard, WaitResult::Woken)
        }
    }

    /// 唤醒一个等待者
    ///
    /// 对应 POSIX 的 `pthread_cond_signal()`
    pub fn signal(&self) {
        self.cond.notify_one();
    }

    /// 唤醒所有等待者
    ///
    /// 对应 POSIX 的 `pthread_cond_broadcast()`
    pub fn broadcast(&self) {
        self.cond.notify_all();
    }
}
