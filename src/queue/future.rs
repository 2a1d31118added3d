//! 未来事件队列
//!
//! 按 `(time, rank, serial)` 升序保存尚未到期的事件。优先事件（负标签）与
//! `insert_first` 插入的事件落在 rank 0，排在同一时刻的普通事件之前。

use std::collections::BTreeMap;

use super::event_key::EventKey;
use crate::sim::{Predicate, SimEvent, SimTime};

#[derive(Debug, Default)]
pub struct FutureQueue {
    next_seq: u64,
    max_len: usize,
    q: BTreeMap<EventKey, SimEvent>,
}

impl FutureQueue {
    /// 按时间顺序插入；负标签自动提升到同一时刻的最前面。
    pub fn insert(&mut self, ev: SimEvent) -> u64 {
        let rank = if ev.tag().is_priority() { 0 } else { 1 };
        self.push(ev, rank)
    }

    /// 插队：排在同一时刻所有普通事件之前。
    pub fn insert_first(&mut self, ev: SimEvent) -> u64 {
        self.push(ev, 0)
    }

    fn push(&mut self, mut ev: SimEvent, rank: u8) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        ev.serial = seq;
        let key = EventKey {
            at: ev.time,
            rank,
            seq,
        };
        self.q.insert(key, ev);
        self.max_len = self.max_len.max(self.q.len());
        seq
    }

    pub fn first(&self) -> Option<&SimEvent> {
        self.q.values().next()
    }

    pub fn first_time(&self) -> Option<SimTime> {
        self.q.keys().next().map(|k| k.at)
    }

    /// 若队首事件恰好在 `at` 时刻，则弹出它。
    pub fn pop_at(&mut self, at: SimTime) -> Option<SimEvent> {
        let entry = self.q.first_entry()?;
        if entry.key().at != at {
            return None;
        }
        Some(entry.remove())
    }

    pub fn pop_first(&mut self) -> Option<SimEvent> {
        self.q.pop_first().map(|(_, ev)| ev)
    }

    /// 删除队列顺序中第一条满足条件的事件。
    pub fn remove_first(&mut self, pred: impl Fn(&SimEvent) -> bool) -> Option<SimEvent> {
        let key = self
            .q
            .iter()
            .find(|(_, ev)| pred(*ev))
            .map(|(k, _)| *k)?;
        self.q.remove(&key)
    }

    /// 删除所有满足条件的事件，按队列顺序返回。
    pub fn remove_all(&mut self, pred: impl Fn(&SimEvent) -> bool) -> Vec<SimEvent> {
        let keys: Vec<EventKey> = self
            .q
            .iter()
            .filter(|(_, ev)| pred(*ev))
            .map(|(k, _)| *k)
            .collect();
        keys.into_iter().filter_map(|k| self.q.remove(&k)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.q.values()
    }

    pub fn filter<'a>(&'a self, pred: &'a Predicate) -> impl Iterator<Item = &'a SimEvent> + 'a {
        self.q.values().filter(move |ev| pred.matches(ev))
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// 运行过程中队列达到过的最大长度
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn clear(&mut self) -> usize {
        let n = self.q.len();
        self.q.clear();
        n
    }
}
