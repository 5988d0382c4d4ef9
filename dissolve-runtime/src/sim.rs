//! # Sim 模块
//!
//! 无界面的内存渲染树，供测试和命令行使用。
//!
//! 支持故障注入：克隆失败、快照失败、着色器不可用、属性写入失败、目标离开场景。
//! 着色器记录在卸载后仍然保留，便于检查 uniform 写入历史。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::animation::{Rect, Vec2};
use crate::error::{RenderError, RenderResult};
use crate::host::{
    ActorId, DefaultAnimations, HostCapabilities, ProxyKind, RenderTree, ShaderId,
    TransitionKind, WindowId, WindowInfo,
};
use crate::style::{ShaderProgram, Uniform, UniformValue};

/// 模拟对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimActorKind {
    /// 分组（窗口组、覆盖层）
    Group,
    /// 窗口
    Window,
    /// 代理对象
    Proxy { source: ActorId, kind: ProxyKind },
}

#[derive(Debug, Clone)]
struct SimActor {
    kind: SimActorKind,
    parent: Option<ActorId>,
    children: Vec<ActorId>,
    on_stage: bool,
    bounds: Rect,
    opacity: u8,
    scale: Vec2,
    translation: Vec2,
    pivot: Vec2,
    info: WindowInfo,
}

impl SimActor {
    fn new(kind: SimActorKind, bounds: Rect) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            on_stage: false,
            bounds,
            opacity: u8::MAX,
            scale: Vec2::one(),
            translation: Vec2::zero(),
            pivot: Vec2::zero(),
            info: WindowInfo::default(),
        }
    }
}

/// 模拟着色器
#[derive(Debug, Clone)]
pub struct SimShader {
    /// 挂载对象，卸载后为 `None`
    pub target: Option<ActorId>,
    pub program: ShaderProgram,
    /// 每个 uniform 的最新值
    pub uniforms: BTreeMap<&'static str, UniformValue>,
    /// 每个 uniform 的写入次数
    pub writes: BTreeMap<&'static str, usize>,
}

/// 故障注入开关
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Failures {
    pub clone: bool,
    pub snapshot: bool,
    pub shader: bool,
    pub property_writes: bool,
    /// 代理对象无法放入任何父对象
    pub placement: bool,
}

/// 内存渲染树
#[derive(Debug)]
pub struct SimulatedScene {
    actors: HashMap<ActorId, SimActor>,
    shaders: BTreeMap<u64, SimShader>,
    window_group: ActorId,
    overlay: ActorId,
    caps: HostCapabilities,
    failures: Failures,
    overview_visible: bool,
    next_id: u64,
}

impl Default for SimulatedScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedScene {
    /// 创建空场景（窗口组 + 覆盖层）
    pub fn new() -> Self {
        Self::with_capabilities(HostCapabilities::default())
    }

    pub fn with_capabilities(caps: HostCapabilities) -> Self {
        let mut scene = Self {
            actors: HashMap::new(),
            shaders: BTreeMap::new(),
            window_group: ActorId(0),
            overlay: ActorId(0),
            caps,
            failures: Failures::default(),
            overview_visible: false,
            next_id: 1,
        };

        let mut group = SimActor::new(SimActorKind::Group, Rect::default());
        group.on_stage = true;

        scene.window_group = scene.spawn(group.clone());
        scene.overlay = scene.spawn(group);
        scene
    }

    fn spawn(&mut self, actor: SimActor) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.insert(id, actor);
        id
    }

    /// 添加窗口
    pub fn add_window(&mut self, width: f32, height: f32) -> WindowId {
        let offset = 40.0 * self.window_count() as f32;
        self.add_window_at(Rect::new(100.0 + offset, 80.0 + offset, width, height))
    }

    /// 在指定位置添加窗口
    pub fn add_window_at(&mut self, bounds: Rect) -> WindowId {
        let mut actor = SimActor::new(SimActorKind::Window, bounds);
        actor.pivot = Vec2::new(0.5, 0.5);
        let id = self.spawn(actor);
        let group = self.window_group;
        self.attach_child(group, id, None);
        WindowId(id.0)
    }

    fn window_count(&self) -> usize {
        self.actors
            .values()
            .filter(|a| a.kind == SimActorKind::Window)
            .count()
    }

    pub fn set_window_info(&mut self, window: WindowId, info: WindowInfo) {
        if let Some(actor) = self.actors.get_mut(&window.actor()) {
            actor.info = info;
        }
    }

    /// 移动/缩放窗口
    pub fn set_window_bounds(&mut self, window: WindowId, bounds: Rect) {
        if let Some(actor) = self.actors.get_mut(&window.actor()) {
            actor.bounds = bounds;
        }
    }

    /// 让窗口离开场景（仍保留对象）
    pub fn remove_from_stage(&mut self, window: WindowId) {
        let id = window.actor();
        self.detach_child(id);
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.on_stage = false;
        }
    }

    /// 销毁窗口对象
    pub fn destroy_window(&mut self, window: WindowId) {
        let _ = self.destroy_actor(window.actor());
    }

    pub fn set_overview_visible(&mut self, visible: bool) {
        self.overview_visible = visible;
    }

    pub fn failures_mut(&mut self) -> &mut Failures {
        &mut self.failures
    }

    pub fn window_group(&self) -> ActorId {
        self.window_group
    }

    /// 场景中现存的代理对象数量
    pub fn live_clone_count(&self) -> usize {
        self.actors
            .values()
            .filter(|a| matches!(a.kind, SimActorKind::Proxy { .. }))
            .count()
    }

    /// 某窗口的代理对象
    pub fn clones_of(&self, window: WindowId) -> Vec<ActorId> {
        let mut ids: Vec<_> = self
            .actors
            .iter()
            .filter(|(_, a)| {
                matches!(a.kind, SimActorKind::Proxy { source, .. } if source == window.actor())
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn kind(&self, actor: ActorId) -> Option<SimActorKind> {
        self.actors.get(&actor).map(|a| a.kind)
    }

    pub fn opacity(&self, actor: ActorId) -> Option<u8> {
        self.actors.get(&actor).map(|a| a.opacity)
    }

    pub fn scale(&self, actor: ActorId) -> Option<Vec2> {
        self.actors.get(&actor).map(|a| a.scale)
    }

    pub fn translation(&self, actor: ActorId) -> Option<Vec2> {
        self.actors.get(&actor).map(|a| a.translation)
    }

    pub fn pivot(&self, actor: ActorId) -> Option<Vec2> {
        self.actors.get(&actor).map(|a| a.pivot)
    }

    pub fn bounds(&self, actor: ActorId) -> Option<Rect> {
        self.actors.get(&actor).map(|a| a.bounds)
    }

    /// 子对象（按堆叠顺序，从下到上）
    pub fn children(&self, parent: ActorId) -> Vec<ActorId> {
        self.actors
            .get(&parent)
            .map(|a| a.children.clone())
            .unwrap_or_default()
    }

    /// 挂在某对象上的着色器
    pub fn shader_on(&self, actor: ActorId) -> Option<ShaderId> {
        self.shaders
            .iter()
            .find(|(_, s)| s.target == Some(actor))
            .map(|(id, _)| ShaderId(*id))
    }

    /// 仍处于挂载状态的着色器数量
    pub fn attached_shader_count(&self) -> usize {
        self.shaders.values().filter(|s| s.target.is_some()).count()
    }

    /// 着色器记录（含已卸载的）
    pub fn shader(&self, id: ShaderId) -> Option<&SimShader> {
        self.shaders.get(&id.0)
    }

    /// 最近创建的着色器
    pub fn last_shader(&self) -> Option<(ShaderId, &SimShader)> {
        self.shaders
            .iter()
            .next_back()
            .map(|(id, s)| (ShaderId(*id), s))
    }

    fn attach_child(&mut self, parent: ActorId, child: ActorId, above: Option<ActorId>) {
        let parent_on_stage = match self.actors.get_mut(&parent) {
            Some(p) => {
                let index = above
                    .and_then(|sibling| p.children.iter().position(|c| *c == sibling))
                    .map_or(p.children.len(), |i| i + 1);
                p.children.insert(index, child);
                p.on_stage
            }
            None => false,
        };
        if let Some(c) = self.actors.get_mut(&child) {
            c.parent = Some(parent);
            c.on_stage = parent_on_stage;
        }
    }

    fn detach_child(&mut self, child: ActorId) {
        let parent = self.actors.get_mut(&child).and_then(|c| c.parent.take());
        if let Some(p) = parent.and_then(|p| self.actors.get_mut(&p)) {
            p.children.retain(|c| *c != child);
        }
    }

    fn actor_mut(&mut self, actor: ActorId, property: &'static str) -> RenderResult<&mut SimActor> {
        if self.failures.property_writes {
            return Err(RenderError::Property {
                actor,
                property,
                message: "模拟写入失败".to_string(),
            });
        }
        self.actors
            .get_mut(&actor)
            .ok_or(RenderError::UnknownActor { actor })
    }
}

impl RenderTree for SimulatedScene {
    fn capabilities(&self) -> HostCapabilities {
        self.caps
    }

    fn is_on_stage(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.on_stage)
    }

    fn transformed_bounds(&self, actor: ActorId) -> RenderResult<Rect> {
        let a = self
            .actors
            .get(&actor)
            .ok_or(RenderError::UnknownActor { actor })?;
        if !a.on_stage {
            return Err(RenderError::Unrealized { actor });
        }
        Ok(a.bounds)
    }

    fn parent_of(&self, actor: ActorId) -> Option<ActorId> {
        self.actors.get(&actor)?.parent
    }

    fn overlay_layer(&self) -> ActorId {
        self.overlay
    }

    fn create_proxy(&mut self, source: ActorId, kind: ProxyKind) -> RenderResult<ActorId> {
        let failing = match kind {
            ProxyKind::Live => self.failures.clone || !self.caps.clones,
            ProxyKind::Snapshot => self.failures.snapshot || !self.caps.snapshots,
        };
        if failing {
            return Err(RenderError::Property {
                actor: source,
                property: "content",
                message: format!("模拟 {:?} 代理创建失败", kind),
            });
        }

        let bounds = self
            .actors
            .get(&source)
            .ok_or(RenderError::UnknownActor { actor: source })?
            .bounds;
        Ok(self.spawn(SimActor::new(SimActorKind::Proxy { source, kind }, bounds)))
    }

    fn insert_above(
        &mut self,
        parent: ActorId,
        actor: ActorId,
        sibling: Option<ActorId>,
    ) -> RenderResult<()> {
        if self.failures.placement {
            return Err(RenderError::Property {
                actor,
                property: "parent",
                message: "模拟放置失败".to_string(),
            });
        }
        if !self.actors.contains_key(&parent) {
            return Err(RenderError::UnknownActor { actor: parent });
        }
        if !self.actors.contains_key(&actor) {
            return Err(RenderError::UnknownActor { actor });
        }
        self.detach_child(actor);
        self.attach_child(parent, actor, sibling);
        Ok(())
    }

    fn set_bounds(&mut self, actor: ActorId, bounds: Rect) -> RenderResult<()> {
        self.actor_mut(actor, "bounds")?.bounds = bounds;
        Ok(())
    }

    fn set_opacity(&mut self, actor: ActorId, opacity: u8) -> RenderResult<()> {
        self.actor_mut(actor, "opacity")?.opacity = opacity;
        Ok(())
    }

    fn set_scale(&mut self, actor: ActorId, scale: Vec2) -> RenderResult<()> {
        self.actor_mut(actor, "scale")?.scale = scale;
        Ok(())
    }

    fn set_translation(&mut self, actor: ActorId, translation: Vec2) -> RenderResult<()> {
        self.actor_mut(actor, "translation")?.translation = translation;
        Ok(())
    }

    fn set_pivot(&mut self, actor: ActorId, pivot: Vec2) -> RenderResult<()> {
        self.actor_mut(actor, "pivot")?.pivot = pivot;
        Ok(())
    }

    fn destroy_actor(&mut self, actor: ActorId) -> RenderResult<()> {
        if !self.actors.contains_key(&actor) {
            return Err(RenderError::UnknownActor { actor });
        }
        self.detach_child(actor);
        self.actors.remove(&actor);
        for shader in self.shaders.values_mut() {
            if shader.target == Some(actor) {
                shader.target = None;
            }
        }
        Ok(())
    }

    fn attach_shader(&mut self, target: ActorId, program: &ShaderProgram) -> RenderResult<ShaderId> {
        if !self.caps.shaders || self.failures.shader {
            return Err(RenderError::Unsupported {
                operation: "attach_shader",
            });
        }
        if !self.actors.contains_key(&target) {
            return Err(RenderError::UnknownActor { actor: target });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.shaders.insert(
            id,
            SimShader {
                target: Some(target),
                program: *program,
                uniforms: BTreeMap::new(),
                writes: BTreeMap::new(),
            },
        );
        Ok(ShaderId(id))
    }

    fn detach_shader(&mut self, target: ActorId, shader: ShaderId) -> RenderResult<()> {
        match self.shaders.get_mut(&shader.0) {
            Some(s) if s.target == Some(target) => {
                s.target = None;
                Ok(())
            }
            _ => Err(RenderError::UnknownActor { actor: target }),
        }
    }

    fn set_uniform(&mut self, shader: ShaderId, uniform: &Uniform) -> RenderResult<()> {
        let s = self
            .shaders
            .get_mut(&shader.0)
            .ok_or(RenderError::Unsupported {
                operation: "set_uniform",
            })?;
        let Some(target) = s.target else {
            return Err(RenderError::Unsupported {
                operation: "set_uniform",
            });
        };
        if !s.program.source.contains(uniform.name) {
            return Err(RenderError::Property {
                actor: target,
                property: uniform.name,
                message: "着色器未声明该 uniform".to_string(),
            });
        }

        s.uniforms.insert(uniform.name, uniform.value);
        *s.writes.entry(uniform.name).or_default() += 1;
        Ok(())
    }

    fn window_info(&self, window: WindowId) -> Option<WindowInfo> {
        self.actors
            .get(&window.actor())
            .filter(|a| a.kind == SimActorKind::Window)
            .map(|a| a.info)
    }

    fn is_overview_visible(&self) -> bool {
        self.overview_visible
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    suppressed: HashSet<TransitionKind>,
    suppress_calls: usize,
    restore_calls: usize,
}

/// 记录默认动画开关状态的探针，克隆后共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct DefaultsProbe {
    state: Rc<RefCell<ProbeState>>,
}

impl DefaultsProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self, kind: TransitionKind) -> bool {
        self.state.borrow().suppressed.contains(&kind)
    }

    pub fn suppress_count(&self) -> usize {
        self.state.borrow().suppress_calls
    }

    pub fn restore_count(&self) -> usize {
        self.state.borrow().restore_calls
    }
}

impl DefaultAnimations for DefaultsProbe {
    fn suppress(&mut self, kind: TransitionKind) {
        let mut state = self.state.borrow_mut();
        state.suppressed.insert(kind);
        state.suppress_calls += 1;
    }

    fn restore(&mut self, kind: TransitionKind) {
        let mut state = self.state.borrow_mut();
        state.suppressed.remove(&kind);
        state.restore_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn test_window_on_stage() {
        let mut scene = SimulatedScene::new();
        let window = scene.add_window(640.0, 480.0);

        assert!(scene.is_on_stage(window.actor()));
        assert_eq!(scene.parent_of(window.actor()), Some(scene.window_group()));
        assert_eq!(
            scene.transformed_bounds(window.actor()).unwrap().size,
            Vec2::new(640.0, 480.0)
        );

        scene.remove_from_stage(window);
        assert!(!scene.is_on_stage(window.actor()));
        assert!(scene.transformed_bounds(window.actor()).is_err());
    }

    #[test]
    fn test_insert_above_sibling() {
        let mut scene = SimulatedScene::new();
        let a = scene.add_window(100.0, 100.0);
        let b = scene.add_window(100.0, 100.0);
        let proxy = scene.create_proxy(a.actor(), ProxyKind::Live).unwrap();
        assert!(!scene.is_on_stage(proxy));

        let group = scene.window_group();
        scene.insert_above(group, proxy, Some(a.actor())).unwrap();
        assert_eq!(scene.children(group), vec![a.actor(), proxy, b.actor()]);
        assert!(scene.is_on_stage(proxy));
    }

    #[test]
    fn test_undeclared_uniform_rejected() {
        let mut scene = SimulatedScene::new();
        let window = scene.add_window(100.0, 100.0);
        let shader = scene
            .attach_shader(window.actor(), &Style::Genie.program())
            .unwrap();

        assert!(scene.set_uniform(shader, &Uniform::float("u_gate", 0.5)).is_ok());
        assert!(
            scene
                .set_uniform(shader, &Uniform::float("u_aspect", 1.0))
                .is_err()
        );
    }

    #[test]
    fn test_destroy_detaches_shader() {
        let mut scene = SimulatedScene::new();
        let window = scene.add_window(100.0, 100.0);
        let proxy = scene.create_proxy(window.actor(), ProxyKind::Snapshot).unwrap();
        scene.attach_shader(proxy, &Style::Ink.program()).unwrap();
        assert_eq!(scene.attached_shader_count(), 1);

        scene.destroy_actor(proxy).unwrap();
        assert_eq!(scene.attached_shader_count(), 0);
        assert!(scene.destroy_actor(proxy).is_err());
    }
}
