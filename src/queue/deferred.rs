//! 延迟队列
//!
//! 已经到达目标实体、但目标当前无法消费的事件。按到达顺序保存，保证 `select` 可复现。

use crate::entity::EntityId;
use crate::sim::SimEvent;

#[derive(Debug, Default)]
pub struct DeferredQueue {
    q: Vec<SimEvent>,
}

impl DeferredQueue {
    pub fn push(&mut self, ev: SimEvent) {
        self.q.push(ev);
    }

    /// 取出发往 `dest` 且满足条件的最早到达事件。
    pub fn select(&mut self, dest: EntityId, pred: impl Fn(&SimEvent) -> bool) -> Option<SimEvent> {
        let idx = self
            .q
            .iter()
            .position(|ev| ev.destination() == dest && pred(ev))?;
        Some(self.q.remove(idx))
    }

    /// 丢弃发往 `dest` 的所有事件，返回丢弃数量。
    pub fn remove_for(&mut self, dest: EntityId) -> usize {
        let before = self.q.len();
        self.q.retain(|ev| ev.destination() != dest);
        before - self.q.len()
    }

    pub fn count_for(&self, dest: EntityId) -> usize {
        self.q.iter().filter(|ev| ev.destination() == dest).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.q.iter()
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let n = self.q.len();
        self.q.clear();
        n
    }
}
