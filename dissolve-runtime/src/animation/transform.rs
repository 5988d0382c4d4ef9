//! # Transform 模块
//!
//! 二维几何类型与克隆体的每帧变换。

use serde::Serialize;

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// 两个分量是否都是有限值
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for (f32, f32) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

/// 屏幕空间矩形（变换后的位置与尺寸）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// 清洗无效数值：非有限坐标归零，非正尺寸取 1
    pub fn sanitized(self) -> Self {
        let fix_coord = |v: f32| if v.is_finite() { v } else { 0.0 };
        let fix_len = |v: f32| if v.is_finite() && v > 0.0 { v } else { 1.0 };
        Self {
            origin: Vec2::new(fix_coord(self.origin.x), fix_coord(self.origin.y)),
            size: Vec2::new(fix_len(self.size.x), fix_len(self.size.y)),
        }
    }

    /// 尺寸是否可用于计算宽高比
    pub fn has_area(&self) -> bool {
        self.size.is_finite() && self.size.x > 0.0 && self.size.y > 0.0
    }

    /// 宽高比，尺寸不可用时返回 `None`
    pub fn aspect(&self) -> Option<f32> {
        self.has_area().then(|| self.size.x / self.size.y)
    }
}

/// 克隆体每帧变换
///
/// 缩放以 `pivot`（归一化坐标）为中心，`translation` 单位为像素。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloneTransform {
    /// 缩放因子
    pub scale: Vec2,
    /// 平移（像素）
    pub translation: Vec2,
    /// 缩放中心（0..1）
    pub pivot: Vec2,
}

impl Default for CloneTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl CloneTransform {
    /// 居中轴心
    pub const CENTER: Vec2 = Vec2::new(0.5, 0.5);
    /// 底边居中轴心
    pub const BOTTOM_CENTER: Vec2 = Vec2::new(0.5, 1.0);

    /// 单位变换
    pub const fn identity() -> Self {
        Self {
            scale: Vec2::one(),
            translation: Vec2::zero(),
            pivot: Self::CENTER,
        }
    }

    /// 设置轴心
    pub fn with_pivot(mut self, pivot: Vec2) -> Self {
        self.pivot = pivot;
        self
    }

    /// 设置缩放
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }

    /// 设置垂直下沉
    pub fn with_drift(mut self, dy: f32) -> Self {
        self.translation = Vec2::new(0.0, dy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = CloneTransform::default();
        assert_eq!(t.scale, Vec2::one());
        assert_eq!(t.translation, Vec2::zero());
        assert_eq!(t.pivot, CloneTransform::CENTER);
    }

    #[test]
    fn test_rect_sanitized() {
        let r = Rect::new(f32::NAN, 20.0, 0.0, -5.0).sanitized();
        assert_eq!(r, Rect::new(0.0, 20.0, 1.0, 1.0));
    }

    #[test]
    fn test_rect_aspect() {
        assert_eq!(Rect::new(0.0, 0.0, 800.0, 400.0).aspect(), Some(2.0));
        assert_eq!(Rect::new(0.0, 0.0, 800.0, 0.0).aspect(), None);
    }
}
