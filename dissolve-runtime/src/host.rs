//! # Host 模块
//!
//! 合成器需要实现的能力接口。引擎只通过这里的 trait 访问渲染树，
//! 不持有任何窗口对象。
//!
//! - [`RenderTree`]：场景查询、代理对象创建、属性写入、着色器管理
//! - [`DefaultAnimations`]：屏蔽/恢复宿主自带的最小化与还原动画

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::animation::{Rect, Vec2};
use crate::error::RenderResult;
use crate::style::{ShaderProgram, Uniform};

/// 渲染树中的对象标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// 窗口标识
///
/// 窗口本身也是渲染树中的一个对象，见 [`WindowId::actor`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(pub u64);

impl WindowId {
    /// 窗口对应的渲染对象
    pub fn actor(self) -> ActorId {
        ActorId(self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// 着色器实例标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShaderId(pub u64);

/// 代理对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// 实时克隆：持续显示源对象的当前内容
    Live,
    /// 静态快照：创建时刻的内容
    Snapshot,
}

/// 宿主支持的能力，构造时查询一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostCapabilities {
    /// 支持实时克隆
    pub clones: bool,
    /// 支持静态快照
    pub snapshots: bool,
    /// 支持片段着色器
    pub shaders: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            clones: true,
            snapshots: true,
            shaders: true,
        }
    }
}

/// 窗口元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowInfo {
    /// 不在任务栏显示（弹出菜单、提示框等）
    pub skip_taskbar: bool,
}

/// 渲染树
///
/// 所有写操作都可能失败（对象已销毁、尚未 realize 等）；
/// 调用方按帧吞掉错误，不中断动画。
pub trait RenderTree {
    /// 能力查询
    fn capabilities(&self) -> HostCapabilities;

    /// 对象是否在场景中
    fn is_on_stage(&self, actor: ActorId) -> bool;

    /// 变换后的屏幕空间边界
    fn transformed_bounds(&self, actor: ActorId) -> RenderResult<Rect>;

    /// 父对象
    fn parent_of(&self, actor: ActorId) -> Option<ActorId>;

    /// 全局覆盖层（找不到父对象时使用）
    fn overlay_layer(&self) -> ActorId;

    /// 为 `source` 创建代理对象（尚未加入场景）
    fn create_proxy(&mut self, source: ActorId, kind: ProxyKind) -> RenderResult<ActorId>;

    /// 将 `actor` 加入 `parent`，堆叠在 `sibling` 之上；`sibling` 为空时置顶
    fn insert_above(
        &mut self,
        parent: ActorId,
        actor: ActorId,
        sibling: Option<ActorId>,
    ) -> RenderResult<()>;

    fn set_bounds(&mut self, actor: ActorId, bounds: Rect) -> RenderResult<()>;

    fn set_opacity(&mut self, actor: ActorId, opacity: u8) -> RenderResult<()>;

    fn set_scale(&mut self, actor: ActorId, scale: Vec2) -> RenderResult<()>;

    fn set_translation(&mut self, actor: ActorId, translation: Vec2) -> RenderResult<()>;

    /// 缩放中心（归一化坐标）
    fn set_pivot(&mut self, actor: ActorId, pivot: Vec2) -> RenderResult<()>;

    /// 从场景移除并销毁
    fn destroy_actor(&mut self, actor: ActorId) -> RenderResult<()>;

    /// 在 `target` 上挂载片段着色器
    fn attach_shader(
        &mut self,
        target: ActorId,
        program: &ShaderProgram,
    ) -> RenderResult<ShaderId>;

    fn detach_shader(&mut self, target: ActorId, shader: ShaderId) -> RenderResult<()>;

    /// 写入单个 uniform；着色器未声明该 uniform 时返回错误
    fn set_uniform(&mut self, shader: ShaderId, uniform: &Uniform) -> RenderResult<()>;

    /// 窗口元信息，窗口不存在时返回 `None`
    fn window_info(&self, window: WindowId) -> Option<WindowInfo>;

    /// 概览界面是否可见
    fn is_overview_visible(&self) -> bool;
}

/// 宿主与协调器共享的渲染树句柄
///
/// 协调器被丢弃时通过它销毁残留的覆盖层。
pub type SharedRenderTree = Rc<RefCell<dyn RenderTree>>;

/// 宿主自带的窗口过渡
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Minimize,
    Unminimize,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 2] = [TransitionKind::Minimize, TransitionKind::Unminimize];
}

/// 宿主默认动画开关
pub trait DefaultAnimations {
    /// 屏蔽该过渡的默认动画
    fn suppress(&mut self, kind: TransitionKind);

    /// 恢复该过渡的默认动画
    fn restore(&mut self, kind: TransitionKind);
}
