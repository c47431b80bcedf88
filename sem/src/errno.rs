//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量相关的错误代码
//!
//! 和 include/uapi/asm-generic/errno.h 中的数值一致

/// 信号量操作可能产生的错误代码
///
/// 使用方法：
/// ```rust
/// use condsem::errno::Errno;
///
/// // 系统调用风格，返回负数
/// assert_eq!(Errno::InvalidArgument.as_neg_i32(), -22);
/// ```
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Errno {
    /// Try again (EAGAIN, 11)
    TryAgain = 11,

    /// Device or resource busy (EBUSY, 16)
    DeviceOrResourceBusy = 16,

    /// Invalid argument (EINVAL, 22)
    InvalidArgument = 22,

    /// Value too large (EOVERFLOW, 75)
    ValueTooLarge = 75,

    /// Connection timed out (ETIMEDOUT, 110)
    TimedOut = 110,
}

impl Errno {
    /// 获取错误代码的正数值
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// 获取错误代码的负数值（用于系统调用返回）
    #[inline]
    pub const fn as_neg_i32(self) -> i32 {
        -(self as i32)
    }

    /// 从正数错误代码还原
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            constants::EAGAIN => Some(Self::TryAgain),
            constants::EBUSY => Some(Self::DeviceOrResourceBusy),
            constants::EINVAL => Some(Self::InvalidArgument),
            constants::EOVERFLOW => Some(Self::ValueTooLarge),
            constants::ETIMEDOUT => Some(Self::TimedOut),
            _ => None,
        }
    }
}

/// 常用的错误代码常量
pub mod constants {
    pub const EAGAIN: i32 = 11;
    pub const EWOULDBLOCK: i32 = EAGAIN;
    pub const EBUSY: i32 = 16;
    pub const EINVAL: i32 = 22;
    pub const EOVERFLOW: i32 = 75;
    pub const ETIMEDOUT: i32 = 110;
}
