//! # Style 模块（视觉风格表）
//!
//! 风格名到着色器模板、uniform 集合、几何变换的**唯一映射**。
//!
//! ## 风格一览
//!
//! | 名称 | 着色器 | 专属 uniform | 轴心 |
//! |------|--------|--------------|------|
//! | `ink` | 噪声墨边 | `u_intensity` `u_scale` `u_center` `u_edgeSoft` | 居中 |
//! | `pixelate` | 像素化 | - | 居中 |
//! | `ripple` | 水波 | `u_center` | 居中 |
//! | `wobble` | 果冻 | - | 居中 |
//! | `genie` | 神灯收拢 | - | 底边居中 |
//!
//! 每个效果实例在挂载时读取一次风格，生命周期内不变。

mod motion;
pub mod shaders;
mod uniforms;

pub use motion::{MIN_SCALE_Y, motion};
pub use uniforms::{
    EFFECT_CENTER, INK_EDGE_SOFTNESS, ShaderFrame, Uniform, UniformValue, frame_uniforms,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::animation::{CloneTransform, Vec2};

/// 视觉风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// 墨迹溶解
    #[default]
    Ink,
    /// 像素化
    Pixelate,
    /// 水波
    Ripple,
    /// 果冻
    Wobble,
    /// 神灯
    Genie,
}

impl Style {
    /// 全部风格
    pub const ALL: [Style; 5] = [
        Style::Ink,
        Style::Pixelate,
        Style::Ripple,
        Style::Wobble,
        Style::Genie,
    ];

    /// 配置中使用的名称
    pub fn name(&self) -> &'static str {
        match self {
            Style::Ink => "ink",
            Style::Pixelate => "pixelate",
            Style::Ripple => "ripple",
            Style::Wobble => "wobble",
            Style::Genie => "genie",
        }
    }

    /// 解析风格名（大小写不敏感），未知名称返回 `None`
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name))
    }

    /// 解析风格名，未知名称降级为 `ink`
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(name = %name, "未知风格名，降级为 ink");
            Self::default()
        })
    }

    /// 片段着色器源码
    pub fn shader_source(&self) -> &'static str {
        match self {
            Style::Ink => shaders::INK,
            Style::Pixelate => shaders::PIXELATE,
            Style::Ripple => shaders::RIPPLE,
            Style::Wobble => shaders::WOBBLE,
            Style::Genie => shaders::GENIE,
        }
    }

    /// 克隆体缩放轴心
    pub fn pivot(&self) -> Vec2 {
        match self {
            Style::Genie => CloneTransform::BOTTOM_CENTER,
            _ => CloneTransform::CENTER,
        }
    }

    /// 着色器程序描述
    pub fn program(&self) -> ShaderProgram {
        ShaderProgram {
            style: *self,
            source: self.shader_source(),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("未知风格: {}", s))
    }
}

/// 交给渲染后端编译执行的片段着色器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProgram {
    pub style: Style,
    pub source: &'static str,
}
