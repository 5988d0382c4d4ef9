//! # Dissolve Runtime
//!
//! 窗口最小化/还原覆盖层动画引擎。
//!
//! ## 架构概述
//!
//! `dissolve-runtime` 不依赖任何具体合成器。宿主实现 [`RenderTree`] 与
//! [`DefaultAnimations`]，在窗口事件和每一帧时调用 [`Coordinator`]：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── on_minimize / on_map ───────►│ 过滤 → 互斥 → 挂载效果
//!   │                                   │
//!   │──── tick(now_ms) ───────────────►│ 推进每个效果
//!   │◄─── RenderTree 属性写入 ──────────│
//!   │                                   │
//! ```
//!
//! 每个效果在窗口之上放一个克隆体，在克隆体上挂片段着色器并逐帧写入 uniform；
//! 克隆失败时着色器直接挂在窗口上，着色器不可用时只做几何变换。
//!
//! ## 使用示例
//!
//! ```ignore
//! use dissolve_runtime::{Coordinator, EffectConfig, RuntimeFlags};
//!
//! let params = EffectConfig::load("dissolve.json").resolve();
//! // tree: Rc<RefCell<impl RenderTree>>，宿主自己也保留一份
//! let mut coordinator = Coordinator::new(tree.clone(), params, RuntimeFlags::from_env());
//! coordinator.enable(Box::new(host_defaults));
//!
//! // 窗口事件
//! coordinator.on_minimize(window, now_ms);
//!
//! // 每帧
//! coordinator.tick(now_ms);
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：缓动、时间轴、几何类型
//! - [`style`]：风格表（着色器、uniform、几何变换）
//! - [`overlay`]：克隆体管理、单帧计算、效果状态机
//! - [`coordinator`]：事件调度与窗口绑定
//! - [`config`]：效果配置、预设、运行时开关
//! - [`host`]：宿主能力接口
//! - [`sim`]：内存渲染树
//! - [`error`]：错误类型定义

pub mod animation;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod overlay;
pub mod sim;
pub mod style;

// 重导出核心类型
pub use animation::{CloneTransform, Easing, Rect, Timeline, Vec2};
pub use config::{EffectConfig, EffectParams, JsonSettings, Preset, RuntimeFlags, SettingsProvider};
pub use coordinator::{
    Coordinator, Dispatch, EffectHandle, IgnoreReason, START_COOLDOWN_MS, SuppressionLease,
};
pub use error::{ConfigError, RenderError, RenderResult, SetupError};
pub use host::{
    ActorId, DefaultAnimations, HostCapabilities, ProxyKind, RenderTree, ShaderId,
    SharedRenderTree, TransitionKind, WindowId, WindowInfo,
};
pub use overlay::{EffectState, OverlayEffect, Phase};
pub use sim::{DefaultsProbe, SimulatedScene};
pub use style::Style;
