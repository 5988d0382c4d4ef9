//! # Config 模块
//!
//! 效果配置管理。
//!
//! ## 两层结构
//!
//! - [`EffectConfig`]：按原样保存的设置值（可能缺失、越界）
//! - [`EffectParams`]：清洗后的快照，效果实例在挂载时复制一份，生命周期内只读
//!
//! ## 配置来源优先级
//!
//! 1. 简单模式下的预设（覆盖时长/噪声/强度/保持/收缩/下沉）
//! 2. 设置来源（[`SettingsProvider`] 或 JSON 文件）
//! 3. 默认值（最低）

mod flags;
mod preset;
mod settings;

pub use flags::{DEBUG_ENV, RuntimeFlags, SAFE_MODE_ENV, SAFE_MODE_FILE};
pub use preset::{Preset, PresetValues};
pub use settings::{JsonSettings, SettingsProvider, keys};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::style::Style;

/// 取值范围
pub mod limits {
    pub const DURATION_MS: (u64, u64) = (1, 10_000);
    pub const NOISE_SCALE: (f32, f32) = (2.0, 20.0);
    pub const INTENSITY: (f32, f32) = (0.3, 2.0);
    pub const REVEAL_HOLD: (f32, f32) = (0.0, 0.95);
    pub const SHRINK_MIN: (f32, f32) = (0.6, 0.95);
    pub const DRIFT_PX: (i64, i64) = (0, 80);
}

/// 效果配置（原始值）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectConfig {
    /// 时长（毫秒）
    #[serde(default = "default_duration_ms")]
    pub duration_ms: i64,

    /// 墨迹噪声缩放
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f64,

    /// 墨迹强度
    #[serde(default = "default_intensity")]
    pub intensity: f64,

    /// 还原时是否播放反向效果
    #[serde(default = "default_true")]
    pub reverse_on_restore: bool,

    /// 是否使用着色器
    #[serde(default = "default_true")]
    pub use_shader: bool,

    /// 风格名
    #[serde(default = "default_style")]
    pub style: String,

    /// 还原时覆盖层完全不透明的时间占比
    #[serde(default = "default_reveal_hold")]
    pub reveal_hold: f64,

    /// 最小化终点缩放
    #[serde(default = "default_shrink_min")]
    pub shrink_min: f64,

    /// 最小化下沉距离（像素）
    #[serde(default = "default_drift_px")]
    pub drift_px: i64,

    /// 预设名
    #[serde(default = "default_preset")]
    pub preset: String,

    /// 简单模式：使用预设数值
    #[serde(default)]
    pub simple_mode: bool,
}

// 默认值函数
fn default_duration_ms() -> i64 {
    600
}

fn default_noise_scale() -> f64 {
    6.0
}

fn default_intensity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_style() -> String {
    Style::default().name().to_string()
}

fn default_reveal_hold() -> f64 {
    0.70
}

fn default_shrink_min() -> f64 {
    0.85
}

fn default_drift_px() -> i64 {
    40
}

fn default_preset() -> String {
    Preset::default().name().to_string()
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            noise_scale: default_noise_scale(),
            intensity: default_intensity(),
            reverse_on_restore: true,
            use_shader: true,
            style: default_style(),
            reveal_hold: default_reveal_hold(),
            shrink_min: default_shrink_min(),
            drift_px: default_drift_px(),
            preset: default_preset(),
            simple_mode: false,
        }
    }
}

impl EffectConfig {
    /// 从设置来源读取，缺失的键使用默认值
    pub fn from_settings(settings: &dyn SettingsProvider) -> Self {
        let defaults = Self::default();
        Self {
            duration_ms: settings
                .get_int(keys::DURATION)
                .unwrap_or(defaults.duration_ms),
            noise_scale: settings
                .get_double(keys::NOISE_SCALE)
                .unwrap_or(defaults.noise_scale),
            intensity: settings
                .get_double(keys::INTENSITY)
                .unwrap_or(defaults.intensity),
            reverse_on_restore: settings
                .get_boolean(keys::REVERSE_ON_RESTORE)
                .unwrap_or(defaults.reverse_on_restore),
            use_shader: settings
                .get_boolean(keys::USE_SHADER)
                .unwrap_or(defaults.use_shader),
            style: settings.get_string(keys::STYLE).unwrap_or(defaults.style),
            reveal_hold: settings
                .get_double(keys::REVEAL_HOLD)
                .unwrap_or(defaults.reveal_hold),
            shrink_min: settings
                .get_double(keys::SHRINK_MIN)
                .unwrap_or(defaults.shrink_min),
            drift_px: settings.get_int(keys::DRIFT_PX).unwrap_or(defaults.drift_px),
            preset: settings.get_string(keys::PRESET).unwrap_or(defaults.preset),
            simple_mode: settings
                .get_boolean(keys::SIMPLE_MODE)
                .unwrap_or(defaults.simple_mode),
        }
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载配置文件，错误向上传递
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 写入预设数值并记录预设名
    pub fn apply_preset(&mut self, preset: Preset) {
        let v = preset.values();
        self.duration_ms = v.duration_ms;
        self.noise_scale = v.noise_scale;
        self.intensity = v.intensity;
        self.reveal_hold = v.reveal_hold;
        self.shrink_min = v.shrink_min;
        self.drift_px = v.drift_px;
        self.preset = preset.name().to_string();
    }

    /// 清洗为效果参数快照
    ///
    /// 越界值静默 clamp；非有限值或非正时长使用默认值。
    pub fn resolve(&self) -> EffectParams {
        let mut raw = self.clone();
        if raw.simple_mode {
            raw.apply_preset(Preset::parse_or_default(&raw.preset));
        }

        let duration_ms = if raw.duration_ms > 0 {
            (raw.duration_ms as u64).clamp(limits::DURATION_MS.0, limits::DURATION_MS.1)
        } else {
            debug!(value = raw.duration_ms, "时长无效，使用默认值");
            default_duration_ms() as u64
        };

        EffectParams {
            duration_ms,
            noise_scale: clamp_or(raw.noise_scale, limits::NOISE_SCALE, default_noise_scale()),
            intensity: clamp_or(raw.intensity, limits::INTENSITY, default_intensity()),
            reverse_on_restore: raw.reverse_on_restore,
            use_shader: raw.use_shader,
            style: Style::parse_or_default(&raw.style),
            reveal_hold: clamp_or(raw.reveal_hold, limits::REVEAL_HOLD, default_reveal_hold()),
            shrink_min: clamp_or(raw.shrink_min, limits::SHRINK_MIN, default_shrink_min()),
            drift_px: raw.drift_px.clamp(limits::DRIFT_PX.0, limits::DRIFT_PX.1) as f32,
        }
    }
}

/// 非有限值取默认，其余 clamp 到范围内
fn clamp_or(value: f64, (lo, hi): (f32, f32), default: f64) -> f32 {
    let value = if value.is_finite() {
        value
    } else {
        debug!(value = value, fallback = default, "配置值非有限，使用默认值");
        default
    };
    (value as f32).clamp(lo, hi)
}

/// 清洗后的效果参数
///
/// 效果实例挂载时复制一份，生命周期内不变。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectParams {
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 墨迹噪声缩放
    pub noise_scale: f32,
    /// 墨迹强度
    pub intensity: f32,
    /// 还原时是否播放反向效果
    pub reverse_on_restore: bool,
    /// 是否使用着色器
    pub use_shader: bool,
    /// 风格
    pub style: Style,
    /// 保持段占比 (0.0 - 0.95)
    pub reveal_hold: f32,
    /// 最小化终点缩放 (0.6 - 0.95)
    pub shrink_min: f32,
    /// 下沉距离（像素，0 - 80）
    pub drift_px: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        EffectConfig::default().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = EffectParams::default();
        assert_eq!(params.duration_ms, 600);
        assert_eq!(params.style, Style::Ink);
        assert_eq!(params.reveal_hold, 0.70);
        assert_eq!(params.shrink_min, 0.85);
        assert_eq!(params.drift_px, 40.0);
        assert!(params.use_shader);
        assert!(params.reverse_on_restore);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let config = EffectConfig {
            duration_ms: -5,
            reveal_hold: 1.4,
            shrink_min: 0.2,
            drift_px: 500,
            noise_scale: f64::NAN,
            intensity: 9.0,
            style: "sparkle".to_string(),
            ..EffectConfig::default()
        };
        let params = config.resolve();

        assert_eq!(params.duration_ms, 600);
        assert_eq!(params.reveal_hold, 0.95);
        assert_eq!(params.shrink_min, 0.6);
        assert_eq!(params.drift_px, 80.0);
        assert_eq!(params.noise_scale, 6.0);
        assert_eq!(params.intensity, 2.0);
        assert_eq!(params.style, Style::Ink);
    }

    #[test]
    fn test_simple_mode_applies_preset() {
        let config = EffectConfig {
            simple_mode: true,
            preset: "bold".to_string(),
            duration_ms: 1_500,
            ..EffectConfig::default()
        };
        let params = config.resolve();

        assert_eq!(params.duration_ms, 750);
        assert_eq!(params.drift_px, 56.0);
        assert_eq!(params.reveal_hold, 0.65);
    }

    #[test]
    fn test_from_settings_missing_keys() {
        let mut settings = JsonSettings::default();
        settings.set(keys::STYLE, "genie");
        settings.set(keys::REVEAL_HOLD, 0.5);

        let config = EffectConfig::from_settings(&settings);
        assert_eq!(config.style, "genie");
        assert_eq!(config.reveal_hold, 0.5);
        assert_eq!(config.duration_ms, 600);
        assert!(config.use_shader);
    }

    #[test]
    fn test_config_serialization() {
        let config = EffectConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"duration-ms\": 600"));

        let loaded: EffectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EffectConfig = serde_json::from_str(r#"{ "style": "ripple" }"#).unwrap();
        assert_eq!(config.style, "ripple");
        assert_eq!(config.duration_ms, 600);
        assert_eq!(config.resolve().style, Style::Ripple);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dissolve.json");

        let mut config = EffectConfig::default();
        config.apply_preset(Preset::Subtle);
        config.save(&path).unwrap();

        let loaded = EffectConfig::load(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.preset, "subtle");
    }

    #[test]
    fn test_load_missing_or_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            EffectConfig::load(dir.path().join("missing.json")),
            EffectConfig::default()
        );

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(EffectConfig::load(&broken), EffectConfig::default());
        assert!(EffectConfig::try_load(&broken).is_err());
    }
}
