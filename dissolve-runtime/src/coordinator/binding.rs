//! # Window Binding
//!
//! 协调器侧表中每个窗口的记录：两个阶段槽位和上一次启动记录。
//! 只引用窗口标识，不持有窗口。

use super::START_COOLDOWN_MS;
use crate::host::RenderTree;
use crate::overlay::{OverlayEffect, Phase};

/// 槽位中的效果
#[derive(Debug)]
pub(crate) struct Slot {
    pub serial: u64,
    pub effect: OverlayEffect,
}

/// 窗口绑定
#[derive(Debug, Default)]
pub struct WindowBinding {
    minimize: Option<Slot>,
    unminimize: Option<Slot>,
    /// 上一次被接受的启动时间戳，任一阶段
    last_start_ms: Option<u64>,
}

impl WindowBinding {
    pub(crate) fn slot(&self, phase: Phase) -> Option<&Slot> {
        match phase {
            Phase::Minimizing => self.minimize.as_ref(),
            Phase::Unminimizing => self.unminimize.as_ref(),
        }
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Option<Slot> {
        match phase {
            Phase::Minimizing => &mut self.minimize,
            Phase::Unminimizing => &mut self.unminimize,
        }
    }

    /// 放入效果，返回原先占用该槽位的效果
    pub(crate) fn insert(&mut self, serial: u64, effect: OverlayEffect) -> Option<Slot> {
        let phase = effect.phase();
        self.slot_mut(phase).replace(Slot { serial, effect })
    }

    pub(crate) fn take(&mut self, phase: Phase) -> Option<Slot> {
        self.slot_mut(phase).take()
    }

    /// 取出并取消该阶段的效果
    pub(crate) fn cancel(&mut self, tree: &mut dyn RenderTree, phase: Phase) -> bool {
        match self.take(phase) {
            Some(mut slot) => {
                slot.effect.cancel(tree);
                true
            }
            None => false,
        }
    }

    /// 取消全部效果
    pub(crate) fn cancel_all(&mut self, tree: &mut dyn RenderTree) {
        self.cancel(tree, Phase::Minimizing);
        self.cancel(tree, Phase::Unminimizing);
    }

    /// 推进两个槽位，移除已进入 Detached 的效果，返回仍在运行的数量
    pub(crate) fn advance(&mut self, tree: &mut dyn RenderTree, now_ms: u64) -> usize {
        let mut running = 0;
        for phase in [Phase::Minimizing, Phase::Unminimizing] {
            let slot = self.slot_mut(phase);
            let detached = match slot.as_mut() {
                Some(current) => current.effect.advance(tree, now_ms).is_detached(),
                None => continue,
            };
            if detached {
                *slot = None;
            } else {
                running += 1;
            }
        }
        running
    }

    /// 记录一次被接受的启动
    pub(crate) fn record_start(&mut self, now_ms: u64) {
        self.last_start_ms = Some(now_ms);
    }

    /// 距上一次被接受的启动是否不足冷却间隔
    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        self.last_start_ms
            .is_some_and(|at| now_ms.saturating_sub(at) < START_COOLDOWN_MS)
    }

    /// 是否有效果在运行
    pub fn is_active(&self) -> bool {
        self.minimize.is_some() || self.unminimize.is_some()
    }

    /// 指定阶段是否有效果在运行
    pub fn is_phase_active(&self, phase: Phase) -> bool {
        self.slot(phase).is_some()
    }

    /// 可以从侧表移除：没有效果，冷却也已结束
    pub(crate) fn is_idle(&self, now_ms: u64) -> bool {
        !self.is_active() && !self.in_cooldown(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_is_per_window() {
        let mut binding = WindowBinding::default();
        assert!(!binding.in_cooldown(0));

        binding.record_start(1_000);
        assert!(binding.in_cooldown(1_050));
        assert!(binding.in_cooldown(1_099));
        assert!(!binding.in_cooldown(1_100));
    }

    #[test]
    fn test_idle_after_cooldown() {
        let mut binding = WindowBinding::default();
        assert!(binding.is_idle(0));

        binding.record_start(500);
        assert!(!binding.is_idle(550));
        assert!(binding.is_idle(600));
    }
}
