//! 未来事件队列的排序键

use crate::sim::SimTime;
use std::cmp::Ordering;

/// 排序键：先比较时间，再比较优先级档位，最后比较入队序号。
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventKey {
    pub(crate) at: SimTime,
    /// 0 = 优先/插队事件，1 = 普通事件
    pub(crate) rank: u8,
    pub(crate) seq: u64,
}

// BTreeMap 按升序遍历，第一个键就是下一条要处理的事件。
impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| self.rank.cmp(&other.rank))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}
