//! condsem 构建脚本
//!
//! 这个脚本在编译前运行，负责：
//! 1. 解析 Sem.toml 配置文件
//! 2. 校验配置值
//! 3. 在 OUT_DIR 下生成 config.rs

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// 默认计数上限：与 Linux 的 SEM_VALUE_MAX (INT_MAX) 一致
const DEFAULT_MAX_COUNT: i64 = i32::MAX as i64;

/// 默认 log target
const DEFAULT_TRACE_TARGET: &str = "condsem";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SemConfig {
    limits: Limits,
    trace: Trace,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Limits {
    max_count: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_count: DEFAULT_MAX_COUNT }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Trace {
    target: String,
}

impl Default for Trace {
    fn default() -> Self {
        Self { target: DEFAULT_TRACE_TARGET.to_string() }
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var("SEM_CONFIG") {
        return PathBuf::from(path);
    }
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    manifest_dir.join("..").join("Sem.toml")
}

fn main() {
    let path = config_path();
    println!("cargo:rerun-if-env-changed=SEM_CONFIG");
    println!("cargo:rerun-if-changed={}", path.display());

    // 配置文件缺失时使用默认值
    let config: SemConfig = match fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content)
            .unwrap_or_else(|e| panic!("配置文件解析失败 {}: {}", path.display(), e)),
        Err(_) => {
            println!("cargo:warning=Sem.toml not found, using defaults");
            SemConfig::default()
        }
    };

    let max_count = config.limits.max_count;
    // sem_getvalue 以 i32 返回计数，上限不能超过 i32::MAX
    if max_count < 1 || max_count > i32::MAX as i64 {
        panic!("limits.max_count 必须在 1..={} 范围内，实际为 {}", i32::MAX, max_count);
    }

    generate_config_code(max_count as u32, &config.trace.target);
}

fn generate_config_code(max_count: u32, trace_target: &str) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let config_code = format!(
        r#"// condsem 配置（自动生成，请勿手动修改）

/// 信号量计数上限 (SEM_VALUE_MAX)
pub const MAX_COUNT: u32 = {};

/// LogTracer 使用的 log target
pub const TRACE_TARGET: &str = {:?};
"#,
        max_count, trace_target,
    );

    let config_file = out_dir.join("config.rs");

    // 只有内容变化时才写入，避免每次编译都更新文件时间戳
    let existing_content = fs::read_to_string(&config_file).unwrap_or_default();
    if existing_content != config_code {
        fs::write(&config_file, &config_code).expect("写入配置文件失败");
    }
}
