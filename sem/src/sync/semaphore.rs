//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量 (Semaphore) 机制
//!
//! 由一个互斥锁和一个条件变量构成的计数信号量，行为与 POSIX `sem_t` 一致：
//! - `sem_init` / `sem_destroy` - 初始化与销毁
//! - `sem_wait` / `sem_timedwait` / `sem_trywait` - P 操作
//! - `sem_post` - V 操作
//! - `sem_getvalue` - 读取当前值
//!
//! 核心概念：
//! - 计数值和等待者数量都只在持有锁时读写
//! - 等待者被唤醒后必须在循环中重新检查计数（虚假唤醒、多等待者竞争）
//! - post 只唤醒一个等待者，不保证 FIFO 顺序

use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use super::condvar::WaitQueue;
use crate::config::MAX_COUNT;
use crate::error::SemError;
use crate::trace::{NoopTracer, Op, Tracer};

/// 锁保护的状态
#[derive(Debug)]
struct State {
    /// 可用许可数，0 ≤ count ≤ MAX_COUNT
    count: u32,
    /// 正在 wait/timed_wait 中的线程数
    waiters: u32,
    destroyed: bool,
}

/// 计数信号量
///
/// 信号量是一个非负整数：
/// - P 操作 (wait): 值减 1，如果为 0 则阻塞等待
/// - V 操作 (post): 值加 1，如果有线程在等待则唤醒一个
///
/// # 示例
/// ```
/// use condsem::Semaphore;
///
/// // 资源池
/// let pool = Semaphore::new(2, false).unwrap();
/// pool.wait().unwrap();
/// assert_eq!(pool.get_value(), Ok(1));
/// pool.post().unwrap();
/// assert_eq!(pool.get_value(), Ok(2));
/// ```
pub struct Semaphore<T: Tracer = NoopTracer> {
    state: Mutex<State>,
    /// 计数变为非零时的等待队列，只与 `state` 配合使用
    nonzero: WaitQueue,
    shared: bool,
    tracer: T,
}

impl Semaphore {
    /// 创建新信号量
    ///
    /// # 参数
    /// * `value` - 初始值，不能超过 [`MAX_COUNT`]
    /// * `shared` - 进程间共享标志，仅记录，不支持跨进程语义
    ///
    /// # 返回
    /// * `Err(SemError::InvalidArgument)` - 初始值超过上限
    pub fn new(value: u32, shared: bool) -> Result<Self, SemError> {
        Self::with_tracer(value, shared, NoopTracer)
    }
}

impl<T: Tracer> Semaphore<T> {
    /// 创建带跟踪器的信号量
    ///
    /// # 示例
    /// ```
    /// use condsem::{LogTracer, Semaphore};
    ///
    /// let sem = Semaphore::with_tracer(0, false, LogTracer).unwrap();
    /// assert_eq!(sem.try_wait(), Err(condsem::SemError::WouldBlock));
    /// ```
    pub fn with_tracer(value: u32, shared: bool, tracer: T) -> Result<Self, SemError> {
        // 实例尚未落到最终地址，用空指针标识
        tracer.trace(core::ptr::null(), Op::Init { value, shared });

        if value > MAX_COUNT {
            return Err(SemError::InvalidArgument);
        }

        Ok(Self {
            state: Mutex::new(State {
                count: value,
                waiters: 0,
                destroyed: false,
            }),
            nonzero: WaitQueue::new(),
            shared,
            tracer,
        })
    }

    /// 销毁信号量
    ///
    /// 不阻塞地尝试获取锁；锁被占用或仍有线程在等待时返回 `Busy`，
    /// 不做任何修改，可以稍后重试。
    ///
    /// 成功后该实例上的其他操作都返回 `InvalidArgument`。
    /// 正常情况下直接 drop 即可，不需要调用此函数。
    pub fn destroy(&self) -> Result<(), SemError> {
        self.trace(Op::Destroy);

        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(SemError::Busy),
        };

        if state.destroyed {
            return Err(SemError::InvalidArgument);
        }
        if state.waiters > 0 {
            return Err(SemError::Busy);
        }

        state.destroyed = true;
        state.count = 0;
        state.waiters = 0;
        Ok(())
    }

    /// 尝试 P 操作（非阻塞）
    ///
    /// # 返回
    /// * `Ok(())` - 成功获取一个许可
    /// * `Err(SemError::WouldBlock)` - 当前没有许可，计数不变
    pub fn try_wait(&self) -> Result<(), SemError> {
        self.trace(Op::TryWait);

        let mut state = self.lock()?;
        if state.count > 0 {
            state.count -= 1;
            Ok(())
        } else {
            Err(SemError::WouldBlock)
        }
    }

    /// 带截止时间的 P 操作
    ///
    /// # 参数
    /// * `deadline` - 绝对截止时间，`None` 表示无限等待
    ///
    /// # 返回
    /// * `Ok(())` - 成功获取一个许可
    /// * `Err(SemError::TimedOut)` - 截止时间已到且没有许可，计数不变
    ///
    /// 只要检查时有许可就会取走，即使截止时间已经过去。
    pub fn timed_wait(&self, deadline: Option<Instant>) -> Result<(), SemError> {
        self.trace(Op::TimedWait { deadline });
        self.acquire(deadline)
    }

    /// 最多等待 `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), SemError> {
        // 溢出时退化为无限等待
        let deadline = Instant::now().checked_add(timeout);
        self.timed_wait(deadline)
    }

    /// P 操作（阻塞）
    ///
    /// 等价于 `timed_wait(None)`
    pub fn wait(&self) -> Result<(), SemError> {
        self.trace(Op::Wait);
        self.acquire(None)
    }

    fn acquire(&self, deadline: Option<Instant>) -> Result<(), SemError> {
        let mut state = self.lock()?;

        state.waiters += 1;

        // 必须是 while：被唤醒时许可可能已被其他线程取走
        let mut timed_out = false;
        while state.count == 0 && !timed_out {
            let (guard, result) = self.nonzero.wait_until(state, deadline);
            state = guard;
            timed_out = result.timed_out();
        }

        state.waiters -= 1;

        if state.count == 0 {
            return Err(SemError::TimedOut);
        }

        state.count -= 1;
        Ok(())
    }

    /// V 操作（释放一个许可）
    ///
    /// 有线程在等待时唤醒其中一个。
    ///
    /// # 返回
    /// * `Err(SemError::Overflow)` - 计数已经是 [`MAX_COUNT`]，计数不变
    pub fn post(&self) -> Result<(), SemError> {
        self.trace(Op::Post);

        let mut state = self.lock()?;
        if state.count >= MAX_COUNT {
            return Err(SemError::Overflow);
        }

        state.count += 1;

        if state.waiters > 0 {
            self.nonzero.signal();
        }

        Ok(())
    }

    /// 获取信号量当前值
    ///
    /// # 注意
    /// 锁被占用时不等待，直接返回 `Ok(0)`。
    /// 此值仅供诊断，不能用于同步决策。
    pub fn get_value(&self) -> Result<u32, SemError> {
        self.trace(Op::GetValue);

        match self.state.try_lock() {
            Ok(state) => Self::value_of(&state),
            Err(TryLockError::Poisoned(poisoned)) => Self::value_of(&poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Ok(0),
        }
    }

    fn value_of(state: &State) -> Result<u32, SemError> {
        if state.destroyed {
            Err(SemError::InvalidArgument)
        } else {
            Ok(state.count)
        }
    }

    /// 当前阻塞在 wait/timed_wait 中的线程数（阻塞读取，仅供诊断）
    pub fn waiting(&self) -> u32 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).waiters
    }

    /// 创建时传入的共享标志
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// 计数上限
    pub fn max_count(&self) -> u32 {
        MAX_COUNT
    }

    /// 获取锁
    ///
    /// 临界区内的更新总是完整的，锁中毒时直接取回状态
    fn lock(&self) -> Result<MutexGuard<'_, State>, SemError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.destroyed {
            return Err(SemError::InvalidArgument);
        }
        Ok(state)
    }

    fn trace(&self, op: Op) {
        self.tracer.trace(self as *const Self as *const (), op);
    }
}

impl<T: Tracer> fmt::Debug for Semaphore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Semaphore");
        match self.state.try_lock() {
            Ok(state) => d.field("count", &state.count).field("waiters", &state.waiters),
            Err(_) => d.field("count", &format_args!("<locked>")),
        };
        d.field("shared", &self.shared).finish()
    }
}
