//! 同步原语 (Synchronization Primitives)
//!
//! - `condvar` - 与互斥锁绑定的等待队列
//! - `semaphore` - 基于互斥锁 + 条件变量的计数信号量
//!
//! 核心概念：
//! - P 操作 (wait): 获取信号量
//! - V 操作 (post): 释放信号量

pub mod condvar;
pub mod semaphore;

pub use condvar::{WaitQueue, WaitResult};
pub use semaphore::Semaphore;
