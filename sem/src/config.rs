//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 构建期配置
//!
//! 常量由 build.rs 根据 Sem.toml 生成

include!(concat!(env!("OUT_DIR"), "/config.rs"));
