//! # Settings
//!
//! 键值形式的设置来源。偏好设置界面负责写入，引擎只读。

use serde_json::{Map, Value};

/// 设置键名
pub mod keys {
    pub const DURATION: &str = "duration-ms";
    pub const NOISE_SCALE: &str = "noise-scale";
    pub const INTENSITY: &str = "intensity";
    pub const REVERSE_ON_RESTORE: &str = "reverse-on-restore";
    pub const USE_SHADER: &str = "use-shader";
    pub const SIMPLE_MODE: &str = "simple-mode";
    pub const PRESET: &str = "preset";
    pub const REVEAL_HOLD: &str = "reveal-hold";
    pub const SHRINK_MIN: &str = "shrink-min";
    pub const DRIFT_PX: &str = "drift-px";
    pub const STYLE: &str = "style";
}

/// 设置来源
///
/// 键不存在或类型不符时返回 `None`，由调用方使用默认值。
pub trait SettingsProvider {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn get_double(&self, key: &str) -> Option<f64>;
    fn get_boolean(&self, key: &str) -> Option<bool>;
    fn get_string(&self, key: &str) -> Option<String>;
}

/// 基于 JSON 对象的设置来源
#[derive(Debug, Clone, Default)]
pub struct JsonSettings {
    values: Map<String, Value>,
}

impl JsonSettings {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// 从 JSON 文本解析；顶层不是对象时视为空
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        })
    }

    /// 写入一个值
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }
}

impl SettingsProvider for JsonSettings {
    fn get_int(&self, key: &str) -> Option<i64> {
        let value = self.values.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.round() as i64))
    }

    fn get_double(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.as_f64()
    }

    fn get_boolean(&self, key: &str) -> Option<bool> {
        self.values.get(key)?.as_bool()
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key)?.as_str().map(str::to_string)
    }
}
