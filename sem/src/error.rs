//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量错误类型

use core::fmt;

use crate::errno::Errno;

/// 信号量操作错误
///
/// 所有错误都是同步、局部的，不会破坏信号量内部状态
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SemError {
    /// 参数无效：初始值超过上限、句柄为空或信号量已销毁
    InvalidArgument,
    /// 销毁时信号量仍在使用
    Busy,
    /// try_wait 时没有可用的许可
    WouldBlock,
    /// timed_wait 在截止时间前没有获得许可
    TimedOut,
    /// post 会使计数超过 MAX_COUNT
    Overflow,
}

impl SemError {
    /// 对应的 POSIX 错误代码
    pub const fn errno(self) -> Errno {
        match self {
            SemError::InvalidArgument => Errno::InvalidArgument,
            SemError::Busy => Errno::DeviceOrResourceBusy,
            SemError::WouldBlock => Errno::TryAgain,
            SemError::TimedOut => Errno::TimedOut,
            SemError::Overflow => Errno::ValueTooLarge,
        }
    }

    /// 重试是否可能成功
    ///
    /// `Overflow` 和 `InvalidArgument` 表示调用方用法错误，重试没有意义
    pub const fn is_retryable(self) -> bool {
        matches!(self, SemError::Busy | SemError::WouldBlock | SemError::TimedOut)
    }
}

impl fmt::Display for SemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SemError::InvalidArgument => "invalid argument",
            SemError::Busy => "semaphore is busy",
            SemError::WouldBlock => "operation would block",
            SemError::TimedOut => "timed out waiting for semaphore",
            SemError::Overflow => "semaphore count would overflow",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SemError {}

impl From<SemError> for Errno {
    fn from(err: SemError) -> Self {
        err.errno()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::constants;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(SemError::InvalidArgument.errno().as_i32(), constants::EINVAL);
        assert_eq!(SemError::Busy.errno().as_i32(), constants::EBUSY);
        assert_eq!(SemError::WouldBlock.errno().as_i32(), constants::EAGAIN);
        assert_eq!(SemError::TimedOut.errno().as_i32(), constants::ETIMEDOUT);
        assert_eq!(SemError::Overflow.errno().as_i32(), constants::EOVERFLOW);
    }

    #[test]
    fn test_retryable() {
        assert!(SemError::Busy.is_retryable());
        assert!(SemError::WouldBlock.is_retryable());
        assert!(SemError::TimedOut.is_retryable());
        assert!(!SemError::Overflow.is_retryable());
        assert!(!SemError::InvalidArgument.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(SemError::WouldBlock.to_string(), "operation would block");
        assert_eq!(SemError::Overflow.to_string(), "semaphore count would overflow");
    }
}
