//! # Clone
//!
//! 覆盖层克隆体的创建与销毁。
//!
//! 克隆体由效果独占，完成、取消、窗口销毁、协调器停用时都会销毁；
//! 忘记销毁的句柄在 drop 时记录警告。

use tracing::{debug, trace, warn};

use crate::animation::{CloneTransform, Rect, Vec2};
use crate::error::{RenderError, SetupError};
use crate::host::{ActorId, HostCapabilities, ProxyKind, RenderTree};

/// 克隆体句柄
#[derive(Debug)]
pub struct CloneHandle {
    actor: ActorId,
    source: ActorId,
    kind: ProxyKind,
    bounds: Rect,
    released: bool,
}

impl CloneHandle {
    /// 克隆体对象
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// 被克隆的源对象
    pub fn source(&self) -> ActorId {
        self.source
    }

    /// 实时克隆或静态快照
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// 最近一次写入的边界
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }
}

impl Drop for CloneHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!(clone = %self.actor, source = %self.source, "克隆体未释放就被丢弃");
        }
    }
}

/// 为 `source` 创建覆盖层克隆体
///
/// 实时克隆失败时（宿主支持的话）退回静态快照；两者都失败返回错误。
/// 克隆体放在源对象的父对象中、紧贴源对象之上，找不到父对象时放入全局覆盖层。
pub fn create_clone(
    tree: &mut dyn RenderTree,
    caps: HostCapabilities,
    source: ActorId,
) -> Result<CloneHandle, SetupError> {
    let bounds = tree
        .transformed_bounds(source)
        .unwrap_or_else(|e| {
            debug!(source = %source, error = %e, "读取源对象边界失败");
            Rect::default()
        })
        .sanitized();

    let (actor, kind) = create_proxy(tree, caps, source)?;

    if let Err(e) = place_above(tree, actor, source) {
        if let Err(destroy) = tree.destroy_actor(actor) {
            debug!(clone = %actor, error = %destroy, "放置失败后销毁克隆体失败");
        }
        return Err(SetupError::Clone(e));
    }

    let handle = CloneHandle {
        actor,
        source,
        kind,
        bounds,
        released: false,
    };
    reset_properties(tree, &handle);

    debug!(clone = %actor, source = %source, kind = ?kind, "克隆体已创建");
    Ok(handle)
}

/// 销毁克隆体，重复调用无副作用
pub fn destroy_clone(tree: &mut dyn RenderTree, slot: &mut Option<CloneHandle>) {
    let Some(mut handle) = slot.take() else {
        return;
    };
    handle.released = true;

    match tree.destroy_actor(handle.actor) {
        Ok(()) => trace!(clone = %handle.actor, "克隆体已销毁"),
        Err(e) => debug!(clone = %handle.actor, error = %e, "销毁克隆体失败"),
    }
}

fn create_proxy(
    tree: &mut dyn RenderTree,
    caps: HostCapabilities,
    source: ActorId,
) -> Result<(ActorId, ProxyKind), SetupError> {
    let live_error = if caps.clones {
        match tree.create_proxy(source, ProxyKind::Live) {
            Ok(actor) => return Ok((actor, ProxyKind::Live)),
            Err(e) => e,
        }
    } else {
        RenderError::Unsupported {
            operation: "create_proxy(live)",
        }
    };

    if !caps.snapshots {
        return Err(SetupError::Clone(live_error));
    }

    debug!(source = %source, error = %live_error, "实时克隆失败，改用静态快照");
    tree.create_proxy(source, ProxyKind::Snapshot)
        .map(|actor| (actor, ProxyKind::Snapshot))
        .map_err(SetupError::Snapshot)
}

fn place_above(
    tree: &mut dyn RenderTree,
    actor: ActorId,
    source: ActorId,
) -> Result<(), RenderError> {
    if let Some(parent) = tree.parent_of(source) {
        match tree.insert_above(parent, actor, Some(source)) {
            Ok(()) => return Ok(()),
            Err(e) => debug!(parent = %parent, error = %e, "加入父对象失败，改用覆盖层"),
        }
    }

    let layer = tree.overlay_layer();
    tree.insert_above(layer, actor, None)
}

fn reset_properties(tree: &mut dyn RenderTree, handle: &CloneHandle) {
    let actor = handle.actor;
    let identity = CloneTransform::identity();

    let results = [
        tree.set_bounds(actor, handle.bounds),
        tree.set_opacity(actor, u8::MAX),
        tree.set_pivot(actor, identity.pivot),
        tree.set_scale(actor, identity.scale),
        tree.set_translation(actor, Vec2::zero()),
    ];
    for e in results.into_iter().filter_map(Result::err) {
        trace!(clone = %actor, error = %e, "初始化克隆体属性失败");
    }
}
