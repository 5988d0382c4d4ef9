//! # Motion
//!
//! 各风格施加在克隆体上的几何变换，与着色器无关（有无着色器都使用）。

use std::f32::consts::PI;

use super::Style;
use crate::animation::{CloneTransform, ease_out_quad, gate};
use crate::config::EffectParams;
use crate::overlay::Phase;

/// 垂直缩放下限，缩放永远不为 0
pub const MIN_SCALE_Y: f32 = 0.001;

/// 最小化果冻振幅
const WOBBLE_MINIMIZE_AMPLITUDE: f32 = 0.04;
/// 还原果冻振幅
const WOBBLE_RESTORE_AMPLITUDE: f32 = 0.03;

/// 计算当前进度下克隆体的变换
///
/// 最小化时收缩/下沉由 `ease_out_quad(progress)` 驱动；
/// 还原时只有风格专属的展开/回弹，其余保持单位变换。
pub fn motion(style: Style, phase: Phase, progress: f32, params: &EffectParams) -> CloneTransform {
    let progress = progress.clamp(0.0, 1.0);
    let base = CloneTransform::identity().with_pivot(style.pivot());

    match phase {
        Phase::Minimizing => {
            let eased = ease_out_quad(progress);
            let shrink = 1.0 - (1.0 - params.shrink_min) * eased;
            let drift = params.drift_px * eased;

            match style {
                Style::Genie => base
                    .with_scale(shrink, (1.0 - eased).max(MIN_SCALE_Y))
                    .with_drift(drift),
                Style::Wobble => {
                    let amp = WOBBLE_MINIMIZE_AMPLITUDE * (1.0 - eased);
                    let shear = amp * (progress * PI * 8.0).sin();
                    base.with_scale(shrink + shear, shrink - shear)
                        .with_drift(drift)
                }
                Style::Ink | Style::Pixelate | Style::Ripple => {
                    base.with_scale(shrink, shrink).with_drift(drift)
                }
            }
        }
        Phase::Unminimizing => match style {
            Style::Genie => {
                let open = gate(progress, params.reveal_hold);
                base.with_scale(1.0, open.max(MIN_SCALE_Y))
            }
            Style::Wobble => {
                let settle = ((progress - 0.1) / 0.3).clamp(0.0, 1.0);
                let amp = WOBBLE_RESTORE_AMPLITUDE * (1.0 - settle);
                let shear = amp * (progress * PI * 6.0).sin();
                base.with_scale(1.0 + shear, 1.0 - shear)
            }
            Style::Ink | Style::Pixelate | Style::Ripple => base,
        },
    }
}
