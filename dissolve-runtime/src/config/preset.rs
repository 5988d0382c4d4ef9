//! # Preset
//!
//! 简单模式下的三档预设。

use serde::{Deserialize, Serialize};

/// 预设档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// 轻柔
    Subtle,
    /// 默认
    #[default]
    Default,
    /// 强烈
    Bold,
}

/// 预设展开后的具体数值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetValues {
    pub duration_ms: i64,
    pub noise_scale: f64,
    pub intensity: f64,
    pub reveal_hold: f64,
    pub shrink_min: f64,
    pub drift_px: i64,
}

impl Preset {
    /// 配置中使用的名称
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Subtle => "subtle",
            Preset::Default => "default",
            Preset::Bold => "bold",
        }
    }

    /// 解析预设名，未知名称降级为 `default`
    pub fn parse_or_default(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "subtle" => Preset::Subtle,
            "default" => Preset::Default,
            "bold" => Preset::Bold,
            _ => {
                tracing::warn!(name = %name, "未知预设名，使用 default");
                Preset::Default
            }
        }
    }

    /// 预设数值
    pub fn values(&self) -> PresetValues {
        match self {
            Preset::Subtle => PresetValues {
                duration_ms: 500,
                noise_scale: 5.5,
                intensity: 0.9,
                reveal_hold: 0.75,
                shrink_min: 0.88,
                drift_px: 28,
            },
            Preset::Default => PresetValues {
                duration_ms: 600,
                noise_scale: 6.0,
                intensity: 1.0,
                reveal_hold: 0.70,
                shrink_min: 0.85,
                drift_px: 40,
            },
            Preset::Bold => PresetValues {
                duration_ms: 750,
                noise_scale: 7.0,
                intensity: 1.2,
                reveal_hold: 0.65,
                shrink_min: 0.82,
                drift_px: 56,
            },
        }
    }
}
