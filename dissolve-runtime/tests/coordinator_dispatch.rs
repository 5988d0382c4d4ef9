//! # 调度集成测试
//!
//! 测试 Coordinator 对窗口事件的过滤、互斥、冷却，以及启用/停用时的资源释放。

use std::cell::RefCell;
use std::rc::Rc;

use dissolve_runtime::host::{TransitionKind, WindowInfo};
use dissolve_runtime::{
    Coordinator, DefaultsProbe, Dispatch, EffectParams, IgnoreReason, Phase, RuntimeFlags,
    SimulatedScene, START_COOLDOWN_MS, WindowId,
};

struct Fixture {
    scene: Rc<RefCell<SimulatedScene>>,
    coordinator: Coordinator,
    probe: DefaultsProbe,
    window: WindowId,
}

fn fixture_with(params: EffectParams, flags: RuntimeFlags) -> Fixture {
    let scene = Rc::new(RefCell::new(SimulatedScene::new()));
    let window = scene.borrow_mut().add_window(800.0, 600.0);
    let probe = DefaultsProbe::new();
    let mut coordinator = Coordinator::new(scene.clone(), params, flags);
    coordinator.enable(Box::new(probe.clone()));
    Fixture {
        scene,
        coordinator,
        probe,
        window,
    }
}

fn fixture() -> Fixture {
    fixture_with(EffectParams::default(), RuntimeFlags::default())
}

/// 挂载后立即取消：不留下任何克隆体，窗口不再处于活动状态
#[test]
fn test_attach_cancel_round_trip() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    let handle = coordinator
        .attach(window, Phase::Minimizing, 0)
        .expect("应当挂载成功");
    assert!(coordinator.is_active(window, Phase::Minimizing));
    assert_eq!(scene.borrow().live_clone_count(), 1);

    assert!(coordinator.cancel_early(handle));
    assert!(!coordinator.is_active(window, Phase::Minimizing));
    assert_eq!(scene.borrow().live_clone_count(), 0);
    assert_eq!(scene.borrow().attached_shader_count(), 0);

    // 重复取消无副作用
    assert!(!coordinator.cancel_early(handle));
    assert_eq!(scene.borrow().live_clone_count(), 0);
}

/// 还原会取消进行中的最小化
#[test]
fn test_phases_are_mutually_exclusive() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    assert!(coordinator.on_minimize(window, 0).is_started());
    let reveal = coordinator.on_unminimize(window, 150);
    assert!(reveal.is_started());

    assert!(!coordinator.is_active(window, Phase::Minimizing));
    assert!(coordinator.is_active(window, Phase::Unminimizing));
    assert_eq!(scene.borrow().live_clone_count(), 1);

    // 再次最小化取消还原
    assert!(coordinator.on_minimize(window, 300).is_started());
    assert!(coordinator.is_active(window, Phase::Minimizing));
    assert!(!coordinator.is_active(window, Phase::Unminimizing));
    assert_eq!(scene.borrow().live_clone_count(), 1);
}

/// 冷却期内的重复事件被忽略，只保留一个效果
#[test]
fn test_repeat_minimize_cooldown() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    let first = coordinator.on_minimize(window, 1_000);
    assert!(first.is_started());
    assert_eq!(
        coordinator.on_minimize(window, 1_050),
        Dispatch::Ignored(IgnoreReason::Cooldown)
    );
    assert_eq!(scene.borrow().live_clone_count(), 1);
    assert!(coordinator.effect(first.handle().unwrap()).is_some());

    // 冷却结束后替换旧效果
    let second = coordinator.on_minimize(window, 1_000 + START_COOLDOWN_MS);
    assert!(second.is_started());
    assert_eq!(scene.borrow().live_clone_count(), 1);
    assert!(coordinator.effect(first.handle().unwrap()).is_none());
    assert!(coordinator.effect(second.handle().unwrap()).is_some());
}

/// 冷却不区分阶段：映射后紧接着的最小化被忽略
#[test]
fn test_cooldown_spans_phases() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    let reveal = coordinator.on_map(window, 1_000);
    assert!(reveal.is_started());
    assert_eq!(
        coordinator.on_minimize(window, 1_050),
        Dispatch::Ignored(IgnoreReason::Cooldown)
    );
    assert!(coordinator.is_active(window, Phase::Unminimizing));
    assert!(!coordinator.is_active(window, Phase::Minimizing));
    assert!(coordinator.effect(reveal.handle().unwrap()).is_some());
    assert_eq!(scene.borrow().live_clone_count(), 1);

    // 直接挂载同样受冷却约束
    assert_eq!(coordinator.attach(window, Phase::Minimizing, 1_099), None);

    // 冷却结束后最小化接管
    assert!(coordinator.on_minimize(window, 1_100).is_started());
    assert!(!coordinator.is_active(window, Phase::Unminimizing));
    assert!(coordinator.is_active(window, Phase::Minimizing));
    assert_eq!(
        coordinator.on_unminimize(window, 1_150),
        Dispatch::Ignored(IgnoreReason::Cooldown)
    );
    assert_eq!(scene.borrow().live_clone_count(), 1);
}

/// 完整播放：完成后淡出，清理后窗口不再活动
#[test]
fn test_tick_runs_to_completion() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    coordinator.on_minimize(window, 0);
    for now in (0..600).step_by(16) {
        assert_eq!(coordinator.tick(now), 1);
    }

    // 完成，进入淡出
    assert_eq!(coordinator.tick(600), 1);
    assert!(coordinator.is_active(window, Phase::Minimizing));
    assert_eq!(coordinator.tick(700), 1);

    assert_eq!(coordinator.tick(750), 0);
    assert!(!coordinator.is_active(window, Phase::Minimizing));
    assert_eq!(scene.borrow().live_clone_count(), 0);
    assert_eq!(coordinator.binding_count(), 0);
}

/// 关闭还原效果时交给宿主默认行为
#[test]
fn test_restore_disabled() {
    let params = EffectParams {
        reverse_on_restore: false,
        ..EffectParams::default()
    };
    let Fixture {
        mut coordinator,
        window,
        ..
    } = fixture_with(params, RuntimeFlags::default());

    assert_eq!(
        coordinator.on_unminimize(window, 0),
        Dispatch::Ignored(IgnoreReason::RestoreDisabled)
    );
    assert_eq!(
        coordinator.on_map(window, 0),
        Dispatch::Ignored(IgnoreReason::RestoreDisabled)
    );
    assert!(coordinator.on_minimize(window, 0).is_started());
}

/// 映射事件的过滤规则
#[test]
fn test_map_filters() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    let popup = scene.borrow_mut().add_window(200.0, 100.0);
    scene.borrow_mut().set_window_info(popup, WindowInfo { skip_taskbar: true });
    assert_eq!(
        coordinator.on_map(popup, 0),
        Dispatch::Ignored(IgnoreReason::SkipTaskbar)
    );

    // 在场景中但没有窗口元信息（窗口组容器）
    let group = WindowId(scene.borrow().window_group().0);
    assert_eq!(
        coordinator.on_map(group, 0),
        Dispatch::Ignored(IgnoreReason::NoWindowInfo)
    );

    let hidden = scene.borrow_mut().add_window(200.0, 100.0);
    scene.borrow_mut().remove_from_stage(hidden);
    assert_eq!(
        coordinator.on_map(hidden, 0),
        Dispatch::Ignored(IgnoreReason::NotOnStage)
    );

    let mapped = coordinator.on_map(window, 0);
    assert!(mapped.is_started());
    assert!(coordinator.is_active(window, Phase::Unminimizing));
    assert_eq!(
        coordinator.on_map(window, 500),
        Dispatch::Ignored(IgnoreReason::AlreadyAnimating)
    );
    assert_eq!(scene.borrow().live_clone_count(), 1);
}

/// 安全模式：不屏蔽默认动画，也不运行效果
#[test]
fn test_safe_mode() {
    let flags = RuntimeFlags {
        safe_mode: true,
        debug: false,
    };
    let Fixture {
        scene,
        mut coordinator,
        probe,
        window,
    } = fixture_with(EffectParams::default(), flags);

    assert_eq!(probe.suppress_count(), 0);
    assert!(!coordinator.is_enabled());
    assert!(!coordinator.holds_lease());
    assert_eq!(
        coordinator.on_minimize(window, 0),
        Dispatch::Ignored(IgnoreReason::SafeMode)
    );
    assert_eq!(coordinator.attach(window, Phase::Unminimizing, 0), None);
    assert_eq!(scene.borrow().live_clone_count(), 0);
}

/// 窗口销毁：取消全部效果并移除绑定
#[test]
fn test_window_destroyed_mid_flight() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    coordinator.on_minimize(window, 0);
    coordinator.tick(200);

    coordinator.on_window_destroyed(window);
    scene.borrow_mut().destroy_window(window);
    assert_eq!(scene.borrow().live_clone_count(), 0);
    assert_eq!(coordinator.binding_count(), 0);
    assert!(!coordinator.is_active(window, Phase::Minimizing));

    // 之后的事件和推进都安全
    assert_eq!(coordinator.tick(300), 0);
    assert_eq!(
        coordinator.on_unminimize(window, 400),
        Dispatch::Ignored(IgnoreReason::NotOnStage)
    );
}

/// 宿主没有通知销毁，效果在下一帧发现目标消失
#[test]
fn test_window_vanishes_without_notification() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();

    coordinator.on_unminimize(window, 0);
    coordinator.tick(100);
    scene.borrow_mut().destroy_window(window);

    assert_eq!(coordinator.tick(116), 0);
    assert!(!coordinator.is_active(window, Phase::Unminimizing));
    assert_eq!(scene.borrow().live_clone_count(), 0);
}

/// 停用：释放全部覆盖层并恢复默认动画
#[test]
fn test_disable_releases_everything() {
    let Fixture {
        scene,
        mut coordinator,
        probe,
        window,
    } = fixture();
    assert!(probe.is_suppressed(TransitionKind::Minimize));
    assert!(probe.is_suppressed(TransitionKind::Unminimize));
    assert!(coordinator.holds_lease());

    let other = scene.borrow_mut().add_window(400.0, 300.0);
    coordinator.on_minimize(window, 0);
    coordinator.on_unminimize(other, 0);
    assert_eq!(scene.borrow().live_clone_count(), 2);

    coordinator.disable();
    assert_eq!(scene.borrow().live_clone_count(), 0);
    assert_eq!(scene.borrow().attached_shader_count(), 0);
    assert_eq!(coordinator.binding_count(), 0);
    assert!(!coordinator.holds_lease());
    assert!(!probe.is_suppressed(TransitionKind::Minimize));
    assert!(!probe.is_suppressed(TransitionKind::Unminimize));

    assert_eq!(
        coordinator.on_minimize(window, 1_000),
        Dispatch::Ignored(IgnoreReason::Disabled)
    );
}

/// 协调器被丢弃时也会恢复默认动画
#[test]
fn test_drop_restores_defaults() {
    let Fixture {
        coordinator, probe, ..
    } = fixture();
    drop(coordinator);
    assert!(!probe.is_suppressed(TransitionKind::Minimize));
    assert_eq!(probe.restore_count(), 2);
}

/// 协调器未停用就被丢弃：覆盖层同样被销毁
#[test]
fn test_drop_mid_flight_destroys_overlays() {
    let Fixture {
        scene,
        mut coordinator,
        probe,
        window,
    } = fixture();
    let other = scene.borrow_mut().add_window(400.0, 300.0);

    coordinator.on_minimize(window, 0);
    coordinator.on_unminimize(other, 0);
    coordinator.tick(100);
    assert_eq!(scene.borrow().live_clone_count(), 2);
    assert_eq!(scene.borrow().attached_shader_count(), 2);

    drop(coordinator);
    assert_eq!(scene.borrow().live_clone_count(), 0);
    assert_eq!(scene.borrow().attached_shader_count(), 0);
    assert!(!probe.is_suppressed(TransitionKind::Minimize));
    assert!(!probe.is_suppressed(TransitionKind::Unminimize));
}

/// 概览界面可见时不接管
#[test]
fn test_overview_visible() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();
    scene.borrow_mut().set_overview_visible(true);

    assert_eq!(
        coordinator.on_unminimize(window, 0),
        Dispatch::Ignored(IgnoreReason::OverviewVisible)
    );
    // attach 不检查概览
    assert!(
        coordinator
            .attach(window, Phase::Unminimizing, 0)
            .is_some()
    );
    coordinator.disable();
}

/// 配置更新只影响之后挂载的效果
#[test]
fn test_config_snapshot_per_effect() {
    let Fixture {
        scene,
        mut coordinator,
        window,
        ..
    } = fixture();
    let other = scene.borrow_mut().add_window(400.0, 300.0);

    let first = coordinator.on_minimize(window, 0).handle().unwrap();
    coordinator.set_config(EffectParams {
        duration_ms: 1_000,
        ..EffectParams::default()
    });
    let second = coordinator.on_minimize(other, 0).handle().unwrap();

    assert_eq!(coordinator.effect(first).unwrap().params().duration_ms, 600);
    assert_eq!(coordinator.effect(second).unwrap().params().duration_ms, 1_000);

    // 第一个效果按自己的时长完成
    coordinator.tick(600);
    coordinator.tick(750);
    assert!(!coordinator.is_active(window, Phase::Minimizing));
    assert!(coordinator.is_active(other, Phase::Minimizing));
    coordinator.disable();
}
