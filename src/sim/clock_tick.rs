//! 时钟滴答去抖
//!
//! 保存最近两次设置的时钟值。只有当较旧的值严格小于较新的值时，才说明较旧时刻的
//! 所有事件都已处理完，此时把较旧的（已稳定的）时间通知给监听者。

use super::time::SimTime;

#[derive(Debug, Default)]
pub(crate) struct ClockTickWindow {
    older: Option<SimTime>,
    newer: Option<SimTime>,
    last_notified: Option<SimTime>,
}

impl ClockTickWindow {
    /// 推入新的时钟值；返回需要通知的已稳定时间。
    pub(crate) fn push(&mut self, now: SimTime) -> Option<SimTime> {
        self.older = self.newer;
        self.newer = Some(now);
        match (self.older, self.newer) {
            (Some(older), Some(newer)) if older < newer => self.mark(older),
            _ => None,
        }
    }

    /// 仿真结束时最后一个时刻也已稳定。
    pub(crate) fn flush(&mut self) -> Option<SimTime> {
        let newer = self.newer?;
        self.mark(newer)
    }

    fn mark(&mut self, settled: SimTime) -> Option<SimTime> {
        if self.last_notified.is_some_and(|t| t >= settled) {
            return None;
        }
        self.last_notified = Some(settled);
        Some(settled)
    }
}
