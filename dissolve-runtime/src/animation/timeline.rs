//! # Timeline 模块
//!
//! 效果时间轴。进度由 `(now - start) / duration` 计算，与帧率无关。
//!
//! 时间戳统一为宿主事件循环提供的毫秒值。

/// 时间轴状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineState {
    /// 已创建，尚未启动
    #[default]
    Idle,
    /// 正在播放
    Playing,
    /// 已停止（提前取消）
    Stopped,
    /// 已完成
    Completed,
}

impl TimelineState {
    /// 是否需要继续更新
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// 时间轴
#[derive(Debug, Clone)]
pub struct Timeline {
    /// 时长（毫秒）
    duration_ms: u64,
    /// 启动时间戳
    started_at_ms: u64,
    /// 当前状态
    state: TimelineState,
    /// 当前进度 (0.0 - 1.0)，单调不减
    progress: f32,
}

impl Timeline {
    /// 创建时间轴（时长至少 1ms，避免除零）
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms: duration_ms.max(1),
            started_at_ms: 0,
            state: TimelineState::Idle,
            progress: 0.0,
        }
    }

    /// 启动
    pub fn start(&mut self, now_ms: u64) {
        self.started_at_ms = now_ms;
        self.progress = 0.0;
        self.state = TimelineState::Playing;
    }

    /// 停止（之后的 `advance` 不再推进）
    pub fn stop(&mut self) {
        if self.state == TimelineState::Playing || self.state == TimelineState::Idle {
            self.state = TimelineState::Stopped;
        }
    }

    /// 推进到 `now_ms`，返回当前进度
    ///
    /// 时钟回退时保持上一次的进度，保证单调。
    pub fn advance(&mut self, now_ms: u64) -> f32 {
        if !self.state.is_active() {
            return self.progress;
        }

        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        let raw = elapsed as f64 / self.duration_ms as f64;
        let progress = (raw.min(1.0) as f32).max(self.progress);
        self.progress = progress;

        if raw >= 1.0 {
            self.progress = 1.0;
            self.state = TimelineState::Completed;
        }
        self.progress
    }

    /// 当前进度
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 当前状态
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// 是否已完成
    pub fn is_completed(&self) -> bool {
        self.state == TimelineState::Completed
    }
}
