//! # Runtime Flags
//!
//! 进程级开关。只在这里读取环境，之后作为普通值传给 `Coordinator`。

use std::env;
use std::path::PathBuf;

/// 安全模式环境变量
pub const SAFE_MODE_ENV: &str = "PIXEL_DISSOLVE_SAFE";
/// 调试环境变量
pub const DEBUG_ENV: &str = "PIXEL_DISSOLVE_DEBUG";
/// 安全模式标记文件（位于主目录）
pub const SAFE_MODE_FILE: &str = ".pixel_dissolve_safe";

/// 运行时开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeFlags {
    /// 安全模式：不接管默认动画，不运行任何效果
    pub safe_mode: bool,
    /// 调试：输出更详细的诊断日志
    pub debug: bool,
}

impl RuntimeFlags {
    /// 从环境变量和主目录标记文件读取
    pub fn from_env() -> Self {
        let safe_marker = env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(SAFE_MODE_FILE).exists())
            .unwrap_or(false);

        Self {
            safe_mode: env_flag(SAFE_MODE_ENV) || safe_marker,
            debug: env_flag(DEBUG_ENV),
        }
    }
}

/// 变量存在且非空即视为开启
fn env_flag(name: &str) -> bool {
    env::var_os(name).is_some_and(|v| !v.is_empty())
}
