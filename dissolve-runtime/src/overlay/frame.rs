//! # Frame
//!
//! 单帧计算：给定进度，算出克隆体不透明度、着色器时间/门控和几何变换。
//! 纯函数，不访问渲染树。

use serde::Serialize;

use super::Phase;
use crate::animation::{CloneTransform, ease_cosine, ease_out_quad, gate, phase_gate};
use crate::config::EffectParams;
use crate::style::{ShaderFrame, motion};

/// 一帧的计算结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    /// 原始进度
    pub progress: f32,
    /// 余弦缓动后的进度
    pub eased: f32,
    /// 克隆体不透明度（没有克隆体时为 `None`）
    pub opacity: Option<u8>,
    /// 着色器时间
    pub time: f32,
    /// 着色器门控
    pub gate: f32,
    /// 克隆体变换
    pub transform: CloneTransform,
}

impl Frame {
    /// 公共 uniform 取值
    pub fn shader_frame(&self, aspect: f32) -> ShaderFrame {
        ShaderFrame {
            time: self.time,
            gate: self.gate,
            aspect,
        }
    }
}

/// 最小化时克隆体的不透明度
pub fn minimize_opacity(progress: f32) -> u8 {
    to_alpha(1.0 - progress.clamp(0.0, 1.0))
}

/// 还原时覆盖层的不透明度：保持段内完全不透明，之后按 ease-out-quad 淡出
pub fn reveal_opacity(progress: f32, hold: f32) -> u8 {
    to_alpha(1.0 - ease_out_quad(gate(progress, hold)))
}

/// 计算一帧
pub fn compute_frame(phase: Phase, progress: f32, params: &EffectParams, has_clone: bool) -> Frame {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let eased = ease_cosine(progress);
    let hold = params.reveal_hold;

    let (time, opacity) = match phase {
        Phase::Minimizing => (eased, minimize_opacity(progress)),
        Phase::Unminimizing => (1.0 - eased, reveal_opacity(progress, hold)),
    };

    Frame {
        progress,
        eased,
        opacity: has_clone.then_some(opacity),
        time,
        gate: phase_gate(phase, progress, hold),
        transform: motion(params.style, phase, progress, params),
    }
}

fn to_alpha(v: f32) -> u8 {
    (255.0 * v).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_minimize_endpoints() {
        let params = EffectParams::default();

        let start = compute_frame(Phase::Minimizing, 0.0, &params, true);
        assert_eq!(start.eased, 0.0);
        assert_eq!(start.gate, 1.0);
        assert_eq!(start.time, 0.0);
        assert_eq!(start.opacity, Some(255));

        let end = compute_frame(Phase::Minimizing, 1.0, &params, true);
        assert!(approx(end.eased, 1.0));
        assert_eq!(end.gate, 1.0);
        assert_eq!(end.opacity, Some(0));
    }

    #[test]
    fn test_reveal_hold() {
        let params = EffectParams {
            reveal_hold: 0.7,
            ..EffectParams::default()
        };

        let held = compute_frame(Phase::Unminimizing, 0.5, &params, true);
        assert_eq!(held.gate, 0.0);
        assert_eq!(held.opacity, Some(255));
        assert!(approx(held.time, 0.5));

        let fading = compute_frame(Phase::Unminimizing, 0.85, &params, true);
        assert!(approx(fading.gate, 0.5));
        // 255 * (1 - 0.75)
        assert_eq!(fading.opacity, Some(64));

        let done = compute_frame(Phase::Unminimizing, 1.0, &params, true);
        assert_eq!(done.opacity, Some(0));
        assert!(approx(done.time, 0.0));
    }

    #[test]
    fn test_no_clone_has_no_opacity() {
        let params = EffectParams {
            style: Style::Genie,
            ..EffectParams::default()
        };
        let frame = compute_frame(Phase::Minimizing, 1.0, &params, false);
        assert_eq!(frame.opacity, None);
        assert!(approx(frame.transform.scale.x, 0.85));
    }

    #[test]
    fn test_invalid_progress() {
        let params = EffectParams::default();
        assert_eq!(
            compute_frame(Phase::Minimizing, f32::NAN, &params, true).progress,
            0.0
        );
        assert_eq!(
            compute_frame(Phase::Minimizing, 3.0, &params, true).progress,
            1.0
        );
    }

    #[test]
    fn test_minimize_opacity_rounding() {
        assert_eq!(minimize_opacity(0.5), 128);
        assert_eq!(minimize_opacity(-1.0), 255);
    }
}
