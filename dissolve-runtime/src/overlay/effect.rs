//! # Effect
//!
//! 单个窗口、单个阶段的覆盖层效果状态机。
//!
//! 宿主每帧调用一次 [`OverlayEffect::advance`]，效果根据传入的时间戳推进；
//! 任何单帧的渲染树读写失败都只记录日志，动画不会中途中止。
//!
//! uniform 写入间隔至少 [`UNIFORM_THROTTLE_MS`]，唯一的例外是终帧（进度 1.0）：
//! 即使距上次写入不足间隔也会写入，保证着色器停在终点值上。

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::clone::{CloneHandle, create_clone, destroy_clone};
use super::frame::{Frame, compute_frame};
use super::Phase;
use crate::animation::{Timeline, ease_out_quad};
use crate::config::EffectParams;
use crate::error::SetupError;
use crate::host::{ActorId, HostCapabilities, RenderTree, ShaderId, WindowId};
use crate::style::frame_uniforms;

/// 完成后淡出时长（毫秒）
pub const END_FADE_MS: u64 = 120;
/// 淡出结束到清理之间的余量（毫秒）
pub const END_FADE_GRACE_MS: u64 = 30;
/// 两次 uniform 写入的最小间隔（毫秒）
pub const UNIFORM_THROTTLE_MS: u64 = 16;

/// 完成后的淡出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndFade {
    /// 进入 Finished 的时间戳
    pub started_ms: u64,
    /// 淡出起始不透明度
    pub from: u8,
}

impl EndFade {
    /// `now_ms` 时刻的不透明度
    pub fn opacity_at(&self, now_ms: u64) -> u8 {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        let t = (elapsed as f32 / END_FADE_MS as f32).min(1.0);
        (f32::from(self.from) * (1.0 - ease_out_quad(t)))
            .round()
            .clamp(0.0, 255.0) as u8
    }

    /// 清理时刻
    pub fn deadline_ms(&self) -> u64 {
        self.started_ms + END_FADE_MS + END_FADE_GRACE_MS
    }
}

/// 效果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EffectState {
    /// 已创建，克隆体/着色器已尝试挂载
    Attached,
    /// 播放中
    Running,
    /// 正在取消
    Cancelling,
    /// 播放完成，克隆体淡出中
    Finished { fade: EndFade },
    /// 已清理，不再响应任何调用
    Detached,
}

impl EffectState {
    pub fn is_detached(&self) -> bool {
        matches!(self, EffectState::Detached)
    }
}

/// 已挂载的着色器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShaderBinding {
    id: ShaderId,
    target: ActorId,
    /// 克隆失败时直接挂在真实窗口上
    on_window: bool,
}

/// 覆盖层效果
#[derive(Debug)]
pub struct OverlayEffect {
    window: WindowId,
    phase: Phase,
    params: EffectParams,
    timeline: Timeline,
    clone: Option<CloneHandle>,
    shader: Option<ShaderBinding>,
    last_uniform_ms: Option<u64>,
    last_opacity: u8,
    state: EffectState,
}

impl OverlayEffect {
    /// 挂载效果并启动时间轴
    ///
    /// 目标不在场景中时直接进入 Detached。克隆体或着色器创建失败只降低效果，
    /// 不影响挂载结果。
    pub fn attach(
        tree: &mut dyn RenderTree,
        caps: HostCapabilities,
        window: WindowId,
        phase: Phase,
        params: EffectParams,
        now_ms: u64,
    ) -> Self {
        let mut effect = Self {
            window,
            phase,
            timeline: Timeline::new(params.duration_ms),
            params,
            clone: None,
            shader: None,
            last_uniform_ms: None,
            last_opacity: u8::MAX,
            state: EffectState::Attached,
        };

        let source = window.actor();
        if !tree.is_on_stage(source) {
            debug!(window = %window, phase = %phase, "目标不在场景中，放弃挂载");
            effect.state = EffectState::Detached;
            return effect;
        }

        effect.clone = match create_clone(tree, caps, source) {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!(window = %window, error = %e, "克隆体不可用，效果降级");
                None
            }
        };

        if effect.params.use_shader && caps.shaders {
            effect.shader = effect.attach_shader(tree);
        }

        effect.timeline.start(now_ms);
        debug!(
            window = %window,
            phase = %phase,
            style = %effect.params.style,
            clone = effect.clone.is_some(),
            shader = effect.shader.is_some(),
            "效果已挂载"
        );
        effect
    }

    fn attach_shader(&self, tree: &mut dyn RenderTree) -> Option<ShaderBinding> {
        let (target, on_window) = match &self.clone {
            Some(clone) => (clone.actor(), false),
            None => (self.window.actor(), true),
        };

        match tree.attach_shader(target, &self.params.style.program()) {
            Ok(id) => Some(ShaderBinding {
                id,
                target,
                on_window,
            }),
            Err(e) => {
                let e = SetupError::Shader(e);
                debug!(window = %self.window, error = %e, "着色器不可用，仅使用几何变换");
                None
            }
        }
    }

    /// 推进到 `now_ms`，返回推进后的状态
    pub fn advance(&mut self, tree: &mut dyn RenderTree, now_ms: u64) -> EffectState {
        match self.state {
            EffectState::Attached | EffectState::Running => {
                self.state = EffectState::Running;

                if !tree.is_on_stage(self.window.actor()) {
                    debug!(window = %self.window, "目标已离开场景，取消效果");
                    self.cancel(tree);
                    return self.state;
                }

                let progress = self.timeline.advance(now_ms);
                self.render(tree, progress, now_ms);

                if self.timeline.is_completed() {
                    self.finish(tree, now_ms);
                }
            }
            EffectState::Finished { fade } => {
                if now_ms >= fade.deadline_ms() {
                    self.cleanup(tree);
                } else if let Some(clone) = &self.clone {
                    let opacity = fade.opacity_at(now_ms);
                    if let Err(e) = tree.set_opacity(clone.actor(), opacity) {
                        trace!(error = %e, "淡出写入失败");
                    }
                    self.last_opacity = opacity;
                }
            }
            EffectState::Cancelling => self.cleanup(tree),
            EffectState::Detached => {}
        }
        self.state
    }

    /// 提前取消：停止时间轴并立即清理，不淡出。重复调用无副作用。
    pub fn cancel(&mut self, tree: &mut dyn RenderTree) {
        if self.state.is_detached() {
            return;
        }
        debug!(window = %self.window, phase = %self.phase, "取消效果");
        self.timeline.stop();
        self.state = EffectState::Cancelling;
        self.cleanup(tree);
    }

    fn finish(&mut self, tree: &mut dyn RenderTree, now_ms: u64) {
        // 挂在真实窗口上的着色器不能留到淡出
        if self.shader.is_some_and(|s| s.on_window) {
            self.detach_shader(tree);
        }

        if self.clone.is_none() {
            self.cleanup(tree);
            return;
        }

        self.state = EffectState::Finished {
            fade: EndFade {
                started_ms: now_ms,
                from: self.last_opacity,
            },
        };
        trace!(window = %self.window, "效果完成，开始淡出");
    }

    fn cleanup(&mut self, tree: &mut dyn RenderTree) {
        self.detach_shader(tree);
        destroy_clone(tree, &mut self.clone);
        self.state = EffectState::Detached;
        debug!(window = %self.window, phase = %self.phase, "效果已清理");
    }

    fn detach_shader(&mut self, tree: &mut dyn RenderTree) {
        let Some(binding) = self.shader.take() else {
            return;
        };
        if let Err(e) = tree.detach_shader(binding.target, binding.id) {
            trace!(shader_target = %binding.target, error = %e, "卸载着色器失败");
        }
    }

    fn render(&mut self, tree: &mut dyn RenderTree, progress: f32, now_ms: u64) {
        let frame = compute_frame(self.phase, progress, &self.params, self.clone.is_some());

        if let Some(clone) = self.clone.as_mut() {
            apply_to_clone(tree, self.window, self.phase, clone, &frame);
        }
        if let Some(opacity) = frame.opacity {
            self.last_opacity = opacity;
        }

        let Some(binding) = self.shader else {
            return;
        };
        let due = self
            .last_uniform_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= UNIFORM_THROTTLE_MS);
        // 终帧不节流
        if !due && progress < 1.0 {
            return;
        }

        let shader_frame = frame.shader_frame(self.aspect(tree));
        for uniform in frame_uniforms(self.params.style, &shader_frame, &self.params) {
            if let Err(e) = tree.set_uniform(binding.id, &uniform) {
                trace!(uniform = uniform.name, error = %e, "写入 uniform 失败");
            }
        }
        self.last_uniform_ms = Some(now_ms);
    }

    /// 宽高比：克隆体尺寸，其次窗口尺寸，都不可用时为 1.0
    fn aspect(&self, tree: &dyn RenderTree) -> f32 {
        self.clone
            .as_ref()
            .and_then(|clone| clone.bounds().aspect())
            .or_else(|| {
                tree.transformed_bounds(self.window.actor())
                    .ok()
                    .and_then(|bounds| bounds.aspect())
            })
            .unwrap_or(1.0)
    }

    /// 所属窗口
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// 阶段
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 当前状态
    pub fn state(&self) -> EffectState {
        self.state
    }

    /// 当前进度
    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    /// 挂载时的参数快照
    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    /// 克隆体
    pub fn clone_handle(&self) -> Option<&CloneHandle> {
        self.clone.as_ref()
    }

    /// 着色器所在对象
    pub fn shader_target(&self) -> Option<ActorId> {
        self.shader.map(|s| s.target)
    }

    pub fn is_detached(&self) -> bool {
        self.state.is_detached()
    }
}

impl Drop for OverlayEffect {
    fn drop(&mut self) {
        if !self.state.is_detached() {
            warn!(window = %self.window, phase = %self.phase, "效果未清理就被丢弃");
        }
    }
}

fn apply_to_clone(
    tree: &mut dyn RenderTree,
    window: WindowId,
    phase: Phase,
    clone: &mut CloneHandle,
    frame: &Frame,
) {
    let actor = clone.actor();

    // 还原时跟随窗口的实时位置；最小化保持初始位置
    if phase == Phase::Unminimizing {
        match tree.transformed_bounds(window.actor()) {
            Ok(bounds) => {
                let bounds = bounds.sanitized();
                match tree.set_bounds(actor, bounds) {
                    Ok(()) => clone.set_bounds(bounds),
                    Err(e) => trace!(error = %e, "同步克隆体边界失败"),
                }
            }
            Err(e) => trace!(error = %e, "读取窗口边界失败"),
        }
    }

    let mut results = vec![
        tree.set_pivot(actor, frame.transform.pivot),
        tree.set_scale(actor, frame.transform.scale),
        tree.set_translation(actor, frame.transform.translation),
    ];
    if let Some(opacity) = frame.opacity {
        results.push(tree.set_opacity(actor, opacity));
    }
    for e in results.into_iter().filter_map(Result::err) {
        trace!(clone = %actor, error = %e, "克隆体属性写入失败");
    }
}
