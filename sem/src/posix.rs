//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! POSIX 风格的信号量接口
//!
//! 对应 `<semaphore.h>`：成功返回 0，失败返回 -1 并设置 errno。
//! 空指针参数用 `None` 表示。errno 保存在线程局部变量中，
//! 其他线程的调用不会覆盖它。
//!
//! # 示例
//! ```
//! use condsem::posix::*;
//! use condsem::errno::constants::EAGAIN;
//!
//! let mut sem = SemT::new();
//! assert_eq!(sem_init(Some(&mut sem), 0, 0), 0);
//! assert_eq!(sem_trywait(Some(&sem)), -1);
//! assert_eq!(errno(), EAGAIN);
//! assert_eq!(sem_post(Some(&sem)), 0);
//! assert_eq!(sem_wait(Some(&sem)), 0);
//! assert_eq!(sem_destroy(Some(&sem)), 0);
//! ```

use core::cell::Cell;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::MAX_COUNT;
use crate::errno::constants::EINVAL;
use crate::error::SemError;
use crate::sync::Semaphore;
use crate::trace::LogTracer;

/// 信号量最大值，与 [`MAX_COUNT`] 相同
///
/// build.rs 保证 `MAX_COUNT <= i32::MAX`
pub const SEM_VALUE_MAX: i32 = MAX_COUNT as i32;

const NSEC_PER_SEC: i64 = 1_000_000_000;

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

/// 当前线程最近一次失败调用的错误代码
pub fn errno() -> i32 {
    ERRNO.with(Cell::get)
}

/// 设置当前线程的错误代码
pub fn set_errno(value: i32) {
    ERRNO.with(|e| e.set(value));
}

/// 信号量存储，对应 `sem_t`
///
/// `SemT::new()` 得到未初始化的存储，必须先 [`sem_init`]
#[derive(Debug, Default)]
pub struct SemT {
    inner: Option<Semaphore<LogTracer>>,
}

impl SemT {
    pub const fn new() -> Self {
        Self { inner: None }
    }
}

/// 绝对时间，对应 `struct timespec`（CLOCK_REALTIME）
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Timespec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

impl Timespec {
    /// 当前时间之后 `timeout` 的绝对时间
    pub fn after(timeout: Duration) -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .checked_add(timeout);

        // 溢出时取可表示的最大时间，to_deadline 会将其视为无限等待
        match since_epoch {
            Some(since_epoch) => Self {
                tv_sec: i64::try_from(since_epoch.as_secs()).unwrap_or(i64::MAX),
                tv_nsec: since_epoch.subsec_nanos() as i64,
            },
            None => Self {
                tv_sec: i64::MAX,
                tv_nsec: NSEC_PER_SEC - 1,
            },
        }
    }

    fn is_valid(&self) -> bool {
        (0..NSEC_PER_SEC).contains(&self.tv_nsec)
    }

    /// 转换为单调时钟上的截止时间；无法表示时返回 `None`（无限等待）
    fn to_deadline(self) -> Option<Instant> {
        let target = if self.tv_sec < 0 {
            UNIX_EPOCH
        } else {
            UNIX_EPOCH.checked_add(Duration::new(self.tv_sec as u64, self.tv_nsec as u32))?
        };

        match target.duration_since(SystemTime::now()) {
            Ok(remaining) => Instant::now().checked_add(remaining),
            // 已经过去
            Err(_) => Some(Instant::now()),
        }
    }
}

fn fail(err: SemError) -> i32 {
    set_errno(err.errno().as_i32());
    -1
}

fn status(result: Result<(), SemError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => fail(err),
    }
}

fn semaphore(sem: Option<&SemT>) -> Result<&Semaphore<LogTracer>, SemError> {
    sem.and_then(|s| s.inner.as_ref()).ok_or(SemError::InvalidArgument)
}

/// 初始化信号量
///
/// `pshared` 非零表示进程间共享，仅记录
pub fn sem_init(sem: Option<&mut SemT>, pshared: i32, value: u32) -> i32 {
    let sem = match sem {
        Some(sem) => sem,
        None => return fail(SemError::InvalidArgument),
    };
    if value > SEM_VALUE_MAX as u32 {
        return fail(SemError::InvalidArgument);
    }

    match Semaphore::with_tracer(value, pshared != 0, LogTracer) {
        Ok(inner) => {
            sem.inner = Some(inner);
            0
        }
        Err(err) => fail(err),
    }
}

/// 销毁信号量，仍在使用时失败并设置 EBUSY
pub fn sem_destroy(sem: Option<&SemT>) -> i32 {
    status(semaphore(sem).and_then(Semaphore::destroy))
}

/// 非阻塞获取，没有许可时设置 EAGAIN
pub fn sem_trywait(sem: Option<&SemT>) -> i32 {
    status(semaphore(sem).and_then(Semaphore::try_wait))
}

/// 获取，最多等到 `abstime`
///
/// `abstime` 为 `None` 时无限等待；超时设置 ETIMEDOUT，
/// `tv_nsec` 不在 `[0, 1e9)` 内设置 EINVAL
pub fn sem_timedwait(sem: Option<&SemT>, abstime: Option<&Timespec>) -> i32 {
    let sem = match semaphore(sem) {
        Ok(sem) => sem,
        Err(err) => return fail(err),
    };

    let deadline = match abstime {
        Some(ts) if !ts.is_valid() => {
            set_errno(EINVAL);
            return -1;
        }
        Some(ts) => ts.to_deadline(),
        None => None,
    };

    status(sem.timed_wait(deadline))
}

/// 阻塞获取
pub fn sem_wait(sem: Option<&SemT>) -> i32 {
    status(semaphore(sem).and_then(Semaphore::wait))
}

/// 释放，计数已达上限时设置 EOVERFLOW
pub fn sem_post(sem: Option<&SemT>) -> i32 {
    status(semaphore(sem).and_then(Semaphore::post))
}

/// 读取当前值，锁被占用时写入 0
pub fn sem_getvalue(sem: Option<&SemT>, sval: Option<&mut i32>) -> i32 {
    let (sem, sval) = match (semaphore(sem), sval) {
        (Ok(sem), Some(sval)) => (sem, sval),
        _ => return fail(SemError::InvalidArgument),
    };

    match sem.get_value() {
        Ok(value) => {
            *sval = i32::try_from(value).unwrap_or(i32::MAX);
            0
        }
        Err(err) => fail(err),
    }
}
