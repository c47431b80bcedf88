//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! condsem - 基于互斥锁和条件变量的计数信号量
//!
//! 用于没有原生信号量的平台，语义与 POSIX `sem_t` 一致。
//! Rust 接口见 [`Semaphore`]，errno 风格的兼容接口见 [`posix`]。

pub mod config;
pub mod errno;
pub mod error;
pub mod posix;
pub mod sync;
pub mod trace;

#[cfg(test)]
mod tests;

pub use config::MAX_COUNT;
pub use error::SemError;
pub use sync::Semaphore;
pub use trace::{LogTracer, NoopTracer, Op, Tracer};
