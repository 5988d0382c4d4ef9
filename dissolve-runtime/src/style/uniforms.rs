//! # Uniforms
//!
//! 着色器 uniform 值与各风格的 uniform 集合。

use serde::Serialize;

use super::Style;
use crate::config::EffectParams;

/// 墨迹/水波的扩散中心
pub const EFFECT_CENTER: [f32; 2] = [0.5, 0.80];

/// 墨迹边缘柔和度
pub const INK_EDGE_SOFTNESS: f32 = 0.18;

/// uniform 值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
}

/// 单个 uniform 写入
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Uniform {
    pub name: &'static str,
    pub value: UniformValue,
}

impl Uniform {
    pub const fn float(name: &'static str, value: f32) -> Self {
        Self {
            name,
            value: UniformValue::Float(value),
        }
    }

    pub const fn vec2(name: &'static str, value: [f32; 2]) -> Self {
        Self {
            name,
            value: UniformValue::Vec2(value),
        }
    }
}

/// 公共 uniform 的当前帧取值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShaderFrame {
    /// 着色器时间
    pub time: f32,
    /// 门控
    pub gate: f32,
    /// 宽高比
    pub aspect: f32,
}

/// 组装一帧需要写入的全部 uniform（公共 + 风格专属）
pub fn frame_uniforms(style: Style, frame: &ShaderFrame, params: &EffectParams) -> Vec<Uniform> {
    let mut uniforms = vec![
        Uniform::float("u_time", frame.time),
        Uniform::float("u_gate", frame.gate),
        Uniform::float("u_aspect", frame.aspect),
    ];

    match style {
        Style::Ink => {
            uniforms.push(Uniform::float("u_intensity", params.intensity));
            uniforms.push(Uniform::float("u_scale", params.noise_scale));
            uniforms.push(Uniform::vec2("u_center", EFFECT_CENTER));
            uniforms.push(Uniform::float("u_edgeSoft", INK_EDGE_SOFTNESS));
        }
        Style::Ripple => {
            uniforms.push(Uniform::vec2("u_center", EFFECT_CENTER));
        }
        Style::Pixelate | Style::Wobble | Style::Genie => {}
    }

    uniforms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(style: Style) -> String {
        let frame = ShaderFrame {
            time: 0.0,
            gate: 1.0,
            aspect: 1.0,
        };
        frame_uniforms(style, &frame, &EffectParams::default())
            .iter()
            .map(|u| u.name)
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_uniform_sets() {
        insta::assert_snapshot!(
            names(Style::Ink),
            @"u_time,u_gate,u_aspect,u_intensity,u_scale,u_center,u_edgeSoft"
        );
        insta::assert_snapshot!(names(Style::Ripple), @"u_time,u_gate,u_aspect,u_center");
        insta::assert_snapshot!(names(Style::Pixelate), @"u_time,u_gate,u_aspect");
    }

    #[test]
    fn test_ink_extras_follow_params() {
        let params = EffectParams {
            intensity: 1.5,
            noise_scale: 9.0,
            ..EffectParams::default()
        };
        let frame = ShaderFrame {
            time: 0.25,
            gate: 1.0,
            aspect: 2.0,
        };
        let uniforms = frame_uniforms(Style::Ink, &frame, &params);

        assert!(uniforms.contains(&Uniform::float("u_intensity", 1.5)));
        assert!(uniforms.contains(&Uniform::float("u_scale", 9.0)));
        assert!(uniforms.contains(&Uniform::float("u_aspect", 2.0)));
        assert!(uniforms.contains(&Uniform::vec2("u_center", [0.5, 0.8])));
    }
}
