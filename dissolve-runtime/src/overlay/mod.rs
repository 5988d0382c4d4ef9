//! # Overlay 模块
//!
//! 单个窗口上的覆盖层效果：克隆体资源管理、逐帧计算、效果状态机。
//!
//! ## 状态流转
//!
//! ```text
//! Attached ──> Running ──> Finished(淡出) ──> Detached
//!                 │             │
//!                 └──> Cancelling ──────────> Detached
//! ```

mod clone;
mod effect;
mod frame;

pub use clone::{CloneHandle, create_clone, destroy_clone};
pub use effect::{
    END_FADE_GRACE_MS, END_FADE_MS, EffectState, EndFade, OverlayEffect, UNIFORM_THROTTLE_MS,
};
pub use frame::{Frame, compute_frame, minimize_opacity, reveal_opacity};

use serde::Serialize;
use std::fmt;

/// 效果阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// 最小化：覆盖层溶解消失
    Minimizing,
    /// 还原：覆盖层先遮住窗口再淡出
    Unminimizing,
}

impl Phase {
    /// 窗口绑定中的槽位名
    pub fn slot_name(&self) -> &'static str {
        match self {
            Phase::Minimizing => "minimize",
            Phase::Unminimizing => "unminimize",
        }
    }

    /// 相反阶段
    pub fn opposite(&self) -> Phase {
        match self {
            Phase::Minimizing => Phase::Unminimizing,
            Phase::Unminimizing => Phase::Minimizing,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_name())
    }
}
