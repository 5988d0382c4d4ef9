//! # Error 模块
//!
//! 定义 dissolve-runtime 中使用的错误类型。
//!
//! 引擎内部的错误从不向用户暴露：
//! - `RenderError`：单帧内的宿主读写失败，吞掉并跳过本帧
//! - `SetupError`：克隆/着色器创建失败，降级运行
//! - `ConfigError`：配置文件读写失败，回退默认值

use thiserror::Error;

use crate::host::ActorId;

/// 渲染树操作错误
///
/// 由宿主的 `RenderTree` 实现返回，通常是瞬时的（例如目标暂未 realize）。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// 对象已不在场景中
    #[error("对象 {actor} 不在场景中")]
    Unrealized { actor: ActorId },

    /// 未知对象（已销毁或从未创建）
    #[error("未知对象 {actor}")]
    UnknownActor { actor: ActorId },

    /// 单个属性读写失败
    #[error("对象 {actor} 的属性 '{property}' 读写失败: {message}")]
    Property {
        actor: ActorId,
        property: &'static str,
        message: String,
    },

    /// 宿主不支持该操作
    #[error("宿主不支持操作: {operation}")]
    Unsupported { operation: &'static str },
}

/// 效果初始化错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    /// 实时克隆创建失败
    #[error("克隆创建失败: {0}")]
    Clone(#[source] RenderError),

    /// 静态快照创建失败
    #[error("快照创建失败: {0}")]
    Snapshot(#[source] RenderError),

    /// 着色器挂载失败
    #[error("着色器挂载失败: {0}")]
    Shader(#[source] RenderError),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化/反序列化失败
    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 类型别名
pub type RenderResult<T> = Result<T, RenderError>;
