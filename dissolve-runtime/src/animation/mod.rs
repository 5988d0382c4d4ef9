//! # Animation 模块
//!
//! 动画基础设施：缓动/门控函数、时间轴、几何变换。
//!
//! 这里只有纯计算，不接触渲染树：
//! - `easing`: 时间进度 → 缓动进度 / 门控信号
//! - `Timeline`: 由毫秒时间戳驱动的进度
//! - `CloneTransform`: 克隆体的缩放、平移、轴心

mod easing;
mod timeline;
mod transform;

pub use easing::{Easing, ease_cosine, ease_out_quad, gate, phase_gate};
pub use timeline::{Timeline, TimelineState};
pub use transform::{CloneTransform, Rect, Vec2};
