//! # Coordinator 模块
//!
//! 窗口生命周期事件的调度中心。
//!
//! ## 职责
//!
//! - 过滤事件：安全模式、概览界面、还原开关、冷却、任务栏过滤
//! - 互斥：同一窗口同时最多一个最小化效果和一个还原效果，新阶段会取消相反阶段
//! - 推进：宿主每帧调用 [`Coordinator::tick`]，效果进入 Detached 后从侧表移除
//! - 默认动画：启用时获取 [`SuppressionLease`]，停用时释放
//! - 清理：协调器持有共享的渲染树句柄，停用或被丢弃时销毁全部覆盖层
//!
//! 协调器不做任何动画计算。

mod binding;
mod suppression;

pub use binding::WindowBinding;
pub use suppression::SuppressionLease;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::{EffectParams, RuntimeFlags};
use crate::host::{DefaultAnimations, HostCapabilities, RenderTree, SharedRenderTree, WindowId};
use crate::overlay::{OverlayEffect, Phase};

/// 同一窗口两次被接受的启动之间的最小间隔（毫秒），不区分阶段
pub const START_COOLDOWN_MS: u64 = 100;

/// 效果句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EffectHandle {
    pub window: WindowId,
    pub phase: Phase,
    serial: u64,
}

/// 事件被忽略的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReason {
    /// 安全模式
    SafeMode,
    /// 协调器未启用
    Disabled,
    /// 概览界面可见
    OverviewVisible,
    /// 关闭了还原效果，交给宿主默认行为
    RestoreDisabled,
    /// 窗口冷却中
    Cooldown,
    /// 目标不在场景中
    NotOnStage,
    /// 没有窗口元信息
    NoWindowInfo,
    /// 不在任务栏显示的窗口
    SkipTaskbar,
    /// 窗口已有效果在运行
    AlreadyAnimating,
}

/// 调度结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    Started(EffectHandle),
    Ignored(IgnoreReason),
}

impl Dispatch {
    pub fn handle(&self) -> Option<EffectHandle> {
        match self {
            Dispatch::Started(handle) => Some(*handle),
            Dispatch::Ignored(_) => None,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started(_))
    }
}

/// 调度中心
///
/// 所有入口都会短暂借用渲染树，宿主不要在持有借用时调用。
pub struct Coordinator {
    tree: SharedRenderTree,
    params: EffectParams,
    flags: RuntimeFlags,
    caps: HostCapabilities,
    bindings: HashMap<WindowId, WindowBinding>,
    lease: Option<SuppressionLease>,
    enabled: bool,
    next_serial: u64,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("params", &self.params)
            .field("flags", &self.flags)
            .field("caps", &self.caps)
            .field("bindings", &self.bindings)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// 创建协调器
    ///
    /// 宿主能力在这里查询一次，之后所有效果共用。
    pub fn new(tree: SharedRenderTree, params: EffectParams, flags: RuntimeFlags) -> Self {
        let caps = tree.borrow().capabilities();
        if flags.debug {
            debug!(params = ?params, caps = ?caps, "协调器已创建");
        }
        Self {
            tree,
            params,
            flags,
            caps,
            bindings: HashMap::new(),
            lease: None,
            enabled: false,
            next_serial: 0,
        }
    }

    /// 替换配置快照，只影响之后挂载的效果
    pub fn set_config(&mut self, params: EffectParams) {
        debug!(params = ?params, "配置已更新");
        self.params = params;
    }

    /// 当前配置快照
    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    pub fn flags(&self) -> RuntimeFlags {
        self.flags
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.caps
    }

    /// 启用：屏蔽默认动画，开始响应事件
    ///
    /// 安全模式下不获取租约，也不启用。
    pub fn enable(&mut self, defaults: Box<dyn DefaultAnimations>) {
        if self.flags.safe_mode {
            warn!("安全模式已开启，不接管窗口动画");
            return;
        }
        if self.lease.is_none() {
            self.lease = Some(SuppressionLease::acquire(defaults));
        }
        self.enabled = true;
        info!("协调器已启用");
    }

    /// 停用：取消全部效果，恢复默认动画
    pub fn disable(&mut self) {
        let shared = Rc::clone(&self.tree);
        let count = self.cancel_everything(&mut *shared.borrow_mut());
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
        self.enabled = false;
        info!(windows = count, "协调器已停用");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 是否持有默认动画屏蔽租约
    pub fn holds_lease(&self) -> bool {
        self.lease.as_ref().is_some_and(SuppressionLease::is_held)
    }

    /// 窗口最小化
    pub fn on_minimize(&mut self, window: WindowId, now_ms: u64) -> Dispatch {
        let shared = Rc::clone(&self.tree);
        let mut tree = shared.borrow_mut();
        if let Err(reason) = self.check_event(&*tree) {
            return self.ignored(window, Phase::Minimizing, reason);
        }
        self.start(&mut *tree, window, Phase::Minimizing, now_ms)
    }

    /// 窗口还原
    pub fn on_unminimize(&mut self, window: WindowId, now_ms: u64) -> Dispatch {
        let shared = Rc::clone(&self.tree);
        let mut tree = shared.borrow_mut();
        if let Err(reason) = self.check_reveal(&*tree) {
            return self.ignored(window, Phase::Unminimizing, reason);
        }
        self.start(&mut *tree, window, Phase::Unminimizing, now_ms)
    }

    /// 窗口映射（新窗口出现），按还原效果处理
    pub fn on_map(&mut self, window: WindowId, now_ms: u64) -> Dispatch {
        let phase = Phase::Unminimizing;
        let shared = Rc::clone(&self.tree);
        let mut tree = shared.borrow_mut();
        if let Err(reason) = self.check_reveal(&*tree) {
            return self.ignored(window, phase, reason);
        }
        if !tree.is_on_stage(window.actor()) {
            return self.ignored(window, phase, IgnoreReason::NotOnStage);
        }
        match tree.window_info(window) {
            None => return self.ignored(window, phase, IgnoreReason::NoWindowInfo),
            Some(info) if info.skip_taskbar => {
                return self.ignored(window, phase, IgnoreReason::SkipTaskbar);
            }
            Some(_) => {}
        }
        if self.bindings.get(&window).is_some_and(WindowBinding::is_active) {
            return self.ignored(window, phase, IgnoreReason::AlreadyAnimating);
        }
        self.start(&mut *tree, window, phase, now_ms)
    }

    /// 窗口销毁：取消全部效果并移除绑定
    pub fn on_window_destroyed(&mut self, window: WindowId) {
        if let Some(mut binding) = self.bindings.remove(&window) {
            binding.cancel_all(&mut *self.tree.borrow_mut());
            debug!(window = %window, "窗口已销毁，绑定已移除");
        }
    }

    /// 直接挂载效果（跳过概览与还原开关检查，仍遵守冷却与互斥）
    pub fn attach(&mut self, window: WindowId, phase: Phase, now_ms: u64) -> Option<EffectHandle> {
        if let Err(reason) = self.check_enabled() {
            return self.ignored(window, phase, reason).handle();
        }
        let shared = Rc::clone(&self.tree);
        let mut tree = shared.borrow_mut();
        self.start(&mut *tree, window, phase, now_ms).handle()
    }

    /// 提前取消；句柄已失效时返回 `false`
    pub fn cancel_early(&mut self, handle: EffectHandle) -> bool {
        let Some(binding) = self.bindings.get_mut(&handle.window) else {
            return false;
        };
        if binding.slot(handle.phase).map(|slot| slot.serial) != Some(handle.serial) {
            return false;
        }
        binding.cancel(&mut *self.tree.borrow_mut(), handle.phase)
    }

    /// 窗口在该阶段是否有效果在运行
    pub fn is_active(&self, window: WindowId, phase: Phase) -> bool {
        self.bindings
            .get(&window)
            .is_some_and(|binding| binding.is_phase_active(phase))
    }

    /// 句柄对应的效果
    pub fn effect(&self, handle: EffectHandle) -> Option<&OverlayEffect> {
        self.bindings
            .get(&handle.window)?
            .slot(handle.phase)
            .filter(|slot| slot.serial == handle.serial)
            .map(|slot| &slot.effect)
    }

    /// 推进全部效果，返回仍在运行的数量
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let mut tree = self.tree.borrow_mut();
        let mut running = 0;
        for binding in self.bindings.values_mut() {
            running += binding.advance(&mut *tree, now_ms);
        }
        self.bindings.retain(|_, binding| !binding.is_idle(now_ms));
        running
    }

    /// 侧表中的窗口数
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// 取消全部效果并清空侧表，返回涉及的窗口数
    fn cancel_everything(&mut self, tree: &mut dyn RenderTree) -> usize {
        let count = self.bindings.len();
        for (_, mut binding) in self.bindings.drain() {
            binding.cancel_all(tree);
        }
        count
    }

    fn check_enabled(&self) -> Result<(), IgnoreReason> {
        if self.flags.safe_mode {
            return Err(IgnoreReason::SafeMode);
        }
        if !self.enabled {
            return Err(IgnoreReason::Disabled);
        }
        Ok(())
    }

    fn check_event(&self, tree: &dyn RenderTree) -> Result<(), IgnoreReason> {
        self.check_enabled()?;
        if tree.is_overview_visible() {
            return Err(IgnoreReason::OverviewVisible);
        }
        Ok(())
    }

    fn check_reveal(&self, tree: &dyn RenderTree) -> Result<(), IgnoreReason> {
        self.check_event(tree)?;
        if !self.params.reverse_on_restore {
            return Err(IgnoreReason::RestoreDisabled);
        }
        Ok(())
    }

    fn ignored(&self, window: WindowId, phase: Phase, reason: IgnoreReason) -> Dispatch {
        debug!(window = %window, phase = %phase, reason = ?reason, "事件已忽略");
        Dispatch::Ignored(reason)
    }

    /// 冷却检查、互斥处理、挂载新效果
    ///
    /// 冷却按窗口计算：任一阶段被接受的启动都会让之后 100ms 内的事件被忽略。
    fn start(
        &mut self,
        tree: &mut dyn RenderTree,
        window: WindowId,
        phase: Phase,
        now_ms: u64,
    ) -> Dispatch {
        if self
            .bindings
            .get(&window)
            .is_some_and(|binding| binding.in_cooldown(now_ms))
        {
            return self.ignored(window, phase, IgnoreReason::Cooldown);
        }

        let binding = self.bindings.entry(window).or_default();
        if binding.cancel(tree, phase.opposite()) {
            debug!(window = %window, phase = %phase.opposite(), "相反阶段的效果已取消");
        }
        binding.cancel(tree, phase);

        let effect =
            OverlayEffect::attach(tree, self.caps, window, phase, self.params.clone(), now_ms);
        if effect.is_detached() {
            return self.ignored(window, phase, IgnoreReason::NotOnStage);
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        binding.insert(serial, effect);
        binding.record_start(now_ms);

        debug!(window = %window, phase = %phase, style = %self.params.style, "效果已启动");
        Dispatch::Started(EffectHandle {
            window,
            phase,
            serial,
        })
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if self.bindings.is_empty() {
            return;
        }
        let shared = Rc::clone(&self.tree);
        match shared.try_borrow_mut() {
            Ok(mut tree) => {
                let count = self.cancel_everything(&mut *tree);
                debug!(windows = count, "协调器被丢弃，覆盖层已清理");
            }
            Err(_) => warn!(
                windows = self.bindings.len(),
                "协调器被丢弃时渲染树正被借用，覆盖层未能清理"
            ),
        };
    }
}
