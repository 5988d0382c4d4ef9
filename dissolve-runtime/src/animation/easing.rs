//! # Easing 模块
//!
//! 缓动与门控函数。全部是纯函数，输入先 clamp 到 [0, 1]。

use std::f32::consts::PI;

use crate::overlay::Phase;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// 线性（匀速）
    Linear,
    /// 二次缓出
    #[default]
    EaseOutQuad,
    /// 余弦缓入缓出，正反两个方向加速曲线对称
    Cosine,
}

impl Easing {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
            Easing::EaseOutQuad => ease_out_quad(t),
            Easing::Cosine => ease_cosine(t),
        }
    }
}

/// 二次缓出：`1 - (1-t)^2`
///
/// 用于最小化时的收缩/下沉，以及交叉淡出。
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// 余弦缓动：`0.5 * (1 - cos(t*π))`
///
/// 着色器内部的时间基准。
pub fn ease_cosine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    0.5 * (1.0 - (t * PI).cos())
}

/// 门控信号
///
/// `t < hold` 时为 0，之后线性升到 1：`(t - hold) / (1 - hold)`。
/// 在 `t = hold` 处连续，`t = 1` 时恰好为 1。
pub fn gate(t: f32, hold: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let hold = hold.clamp(0.0, 1.0);
    if t < hold {
        return 0.0;
    }
    let span = 1.0 - hold;
    if span <= f32::EPSILON {
        // hold == 1：退化为 t = 1 处的阶跃
        return if t >= 1.0 { 1.0 } else { 0.0 };
    }
    ((t - hold) / span).clamp(0.0, 1.0)
}

/// 按阶段计算着色器门控值
///
/// - 还原：`gate(t, hold)`，hold 段内保持原图
/// - 最小化：恒为 1，溶解完全由 `u_time` 驱动
pub fn phase_gate(phase: Phase, t: f32, hold: f32) -> f32 {
    match phase {
        Phase::Minimizing => 1.0,
        Phase::Unminimizing => gate(t, hold),
    }
}
