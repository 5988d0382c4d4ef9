//! # Suppression Lease
//!
//! 宿主默认最小化/还原动画的屏蔽租约。获取时屏蔽，释放或 drop 时恢复。

use std::fmt;
use tracing::info;

use crate::host::{DefaultAnimations, TransitionKind};

/// 默认动画屏蔽租约
pub struct SuppressionLease {
    defaults: Option<Box<dyn DefaultAnimations>>,
}

impl SuppressionLease {
    /// 屏蔽全部默认过渡
    pub fn acquire(mut defaults: Box<dyn DefaultAnimations>) -> Self {
        for kind in TransitionKind::ALL {
            defaults.suppress(kind);
        }
        info!("已屏蔽默认最小化/还原动画");
        Self {
            defaults: Some(defaults),
        }
    }

    /// 释放租约，恢复默认动画
    pub fn release(mut self) {
        self.restore();
    }

    /// 是否仍持有
    pub fn is_held(&self) -> bool {
        self.defaults.is_some()
    }

    fn restore(&mut self) {
        if let Some(mut defaults) = self.defaults.take() {
            for kind in TransitionKind::ALL {
                defaults.restore(kind);
            }
            info!("已恢复默认最小化/还原动画");
        }
    }
}

impl Drop for SuppressionLease {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for SuppressionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuppressionLease")
            .field("held", &self.is_held())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::DefaultsProbe;

    #[test]
    fn test_release_restores() {
        let probe = DefaultsProbe::new();
        let lease = SuppressionLease::acquire(Box::new(probe.clone()));
        assert!(probe.is_suppressed(TransitionKind::Minimize));
        assert!(probe.is_suppressed(TransitionKind::Unminimize));

        lease.release();
        assert!(!probe.is_suppressed(TransitionKind::Minimize));
        assert!(!probe.is_suppressed(TransitionKind::Unminimize));
        assert_eq!(probe.restore_count(), 2);
    }

    #[test]
    fn test_drop_restores_once() {
        let probe = DefaultsProbe::new();
        {
            let _lease = SuppressionLease::acquire(Box::new(probe.clone()));
        }
        assert!(!probe.is_suppressed(TransitionKind::Minimize));
        assert_eq!(probe.restore_count(), 2);
    }
}
