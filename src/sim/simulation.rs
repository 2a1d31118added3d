//! 仿真引擎
//!
//! 独占时钟、未来事件队列、延迟队列和实体名册；实体只能通过这里的调度接口
//! 间接修改它们，单一所有者保证了无锁的确定性。

use std::collections::BTreeMap;

use super::clock_tick::ClockTickWindow;
use super::config::SimConfig;
use super::control::SimControl;
use super::event::{EventKind, Payload, SimEvent};
use super::listener::{self, Listeners};
use super::predicate::Predicate;
use super::stats::SimStats;
use super::tag::Tag;
use super::time::SimTime;
use crate::directory::EntityDirectory;
use crate::entity::{EntityId, EntityInfo, EntityRecord, EntityState, SimEntity};
use crate::error::{SimError, SimResult};
use crate::queue::{DeferredQueue, FutureQueue};
use tracing::{debug, info, trace, warn};

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle,
    Running,
    Paused,
    Finished,
    Aborted,
}

/// 离散事件仿真引擎。
pub struct Simulation {
    pub(super) cfg: SimConfig,
    pub(super) clock: SimTime,
    pub(super) state: SimState,
    pub(super) future: FutureQueue,
    pub(super) deferred: DeferredQueue,
    pub(super) entities: BTreeMap<EntityId, EntityRecord>,
    pub(super) next_entity_id: usize,
    pub(super) directory: EntityId,
    pub(super) termination_time: Option<SimTime>,
    pub(super) pause_at: Option<SimTime>,
    pub(super) control: SimControl,
    pub(super) ticks: ClockTickWindow,
    pub(super) listeners: Listeners,
    pub(super) stats: SimStats,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimConfig::default())
    }
}

impl Simulation {
    /// 按配置创建仿真，并注册目录实体。
    pub fn new(cfg: SimConfig) -> SimResult<Self> {
        cfg.validate()?;
        Ok(Self::build(cfg))
    }

    fn build(cfg: SimConfig) -> Self {
        let termination_time = cfg.termination_time;
        let pause_at = cfg.pause_at;
        let mut sim = Self {
            cfg,
            clock: SimTime::ZERO,
            state: SimState::Idle,
            future: FutureQueue::default(),
            deferred: DeferredQueue::default(),
            entities: BTreeMap::new(),
            next_entity_id: 0,
            directory: EntityId(0),
            termination_time: None,
            pause_at: None,
            control: SimControl::default(),
            ticks: ClockTickWindow::default(),
            listeners: Listeners::default(),
            stats: SimStats::default(),
        };
        sim.directory = sim.register(Box::new(EntityDirectory::new("directory")));
        if let Some(t) = termination_time {
            sim.terminate_at(SimTime(t));
        }
        if let Some(t) = pause_at {
            sim.pause_at(SimTime(t));
        }
        sim
    }

    /// 获取当前仿真时间
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SimState::Running | SimState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == SimState::Paused
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            max_future_queue_len: self.future.max_len(),
            ..self.stats.clone()
        }
    }

    /// 可跨线程使用的控制句柄
    pub fn control(&self) -> SimControl {
        self.control.clone()
    }

    pub fn directory_id(&self) -> EntityId {
        self.directory
    }

    pub fn termination_time(&self) -> Option<SimTime> {
        self.termination_time
    }

    pub fn pause_requested_at(&self) -> Option<SimTime> {
        self.pause_at
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn future_events(&self) -> impl Iterator<Item = &SimEvent> {
        self.future.iter()
    }

    pub fn future_events_matching<'a>(
        &'a self,
        pred: &'a Predicate,
    ) -> impl Iterator<Item = &'a SimEvent> + 'a {
        self.future.filter(pred)
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// 延迟队列中发往 `id` 的事件数量
    pub fn deferred_count_for(&self, id: EntityId) -> usize {
        self.deferred.count_for(id)
    }

    // ── 实体查询 ──────────────────────────────────────────

    pub fn is_registered(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity_state(&self, id: EntityId) -> Option<EntityState> {
        self.entities.get(&id).map(|r| r.state)
    }

    pub fn entity_info(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.get(&id).map(EntityRecord::info)
    }

    /// 当前名册中（尚未结束）的实体
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// 按具体类型访问实体；实体正在运行或类型不符时返回 `None`。
    pub fn entity_mut<T: SimEntity + 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities
            .get_mut(&id)?
            .entity
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    // ── 调度接口 ──────────────────────────────────────────

    /// 在 `clock + max(delay, 0)` 时刻向 `dest` 发送事件。
    ///
    /// 目标未注册或已结束时记录警告并丢弃，返回 `Ok(false)`。
    pub fn schedule(
        &mut self,
        src: Option<EntityId>,
        dest: EntityId,
        delay: f64,
        tag: Tag,
        data: Option<Payload>,
    ) -> SimResult<bool> {
        self.enqueue(EventKind::Send, src, dest, delay, tag, data, false)
    }

    pub fn schedule_now(
        &mut self,
        src: Option<EntityId>,
        dest: EntityId,
        tag: Tag,
        data: Option<Payload>,
    ) -> SimResult<bool> {
        self.schedule(src, dest, 0.0, tag, data)
    }

    /// 插队发送：排在同一时刻所有普通事件之前。
    pub fn schedule_first(
        &mut self,
        src: Option<EntityId>,
        dest: EntityId,
        delay: f64,
        tag: Tag,
        data: Option<Payload>,
    ) -> SimResult<bool> {
        self.enqueue(EventKind::Send, src, dest, delay, tag, data, true)
    }

    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(level = "trace", skip(self, data), fields(now = %self.clock))]
    pub(super) fn enqueue(
        &mut self,
        kind: EventKind,
        src: Option<EntityId>,
        dest: EntityId,
        delay: f64,
        tag: Tag,
        data: Option<Payload>,
        first: bool,
    ) -> SimResult<bool> {
        if !delay.is_finite() {
            return Err(SimError::InvalidDelay { delay });
        }
        let alive = self
            .entities
            .get(&dest)
            .is_some_and(|r| r.state != EntityState::Finished);
        if !alive {
            warn!(?src, dest = %dest, tag = %tag, "目标实体不存在或已结束，事件被丢弃");
            self.stats.dropped_events += 1;
            return Ok(false);
        }

        let ev = SimEvent::new(kind, self.clock.plus(delay), src, dest, tag, data);
        let seq = if first {
            self.future.insert_first(ev)
        } else {
            self.future.insert(ev)
        };
        trace!(seq, queue_size = self.future.len(), "事件已加入未来队列");
        Ok(true)
    }

    /// 撤回 `src` 发出、尚未分发的第一条匹配事件；没有匹配时返回 `None`。
    pub fn cancel(&mut self, src: Option<EntityId>, pred: &Predicate) -> Option<SimEvent> {
        let ev = self
            .future
            .remove_first(|ev| ev.source() == src && pred.matches(ev))?;
        self.stats.canceled_events += 1;
        debug!(serial = ev.serial(), tag = %ev.tag(), "事件已撤回");
        Some(ev)
    }

    pub fn cancel_all(&mut self, src: Option<EntityId>, pred: &Predicate) -> Vec<SimEvent> {
        let evs = self
            .future
            .remove_all(|ev| ev.source() == src && pred.matches(ev));
        self.stats.canceled_events += evs.len() as u64;
        if !evs.is_empty() {
            debug!(count = evs.len(), "批量撤回事件");
        }
        evs
    }

    /// 从延迟队列取出发往 `id` 的下一条匹配事件。
    pub fn select(&mut self, id: EntityId, pred: &Predicate) -> Option<SimEvent> {
        self.deferred.select(id, |ev| pred.matches(ev))
    }

    // ── 控制接口 ──────────────────────────────────────────

    /// 请求在当前时刻暂停。
    pub fn pause(&mut self) -> bool {
        self.pause_at(self.clock)
    }

    /// 请求在时钟到达 `at` 时暂停；`at` 已经过去则拒绝。
    pub fn pause_at(&mut self, at: SimTime) -> bool {
        if !at.is_finite() || at < self.clock {
            warn!(at = %at, now = %self.clock, "暂停时刻已经过去，忽略");
            return false;
        }
        if matches!(self.state, SimState::Finished | SimState::Aborted) {
            return false;
        }
        self.pause_at = Some(at);
        info!(at = %at, "已请求暂停");
        true
    }

    /// 恢复暂停中的仿真。
    pub fn resume(&mut self) -> bool {
        let was_paused = self.control.resume();
        if self.state == SimState::Paused {
            self.state = SimState::Running;
            info!(at = %self.clock, "▶️  仿真恢复");
            return true;
        }
        was_paused
    }

    /// 运行中则请求停止主循环；之后仍执行正常的结束流程。
    pub fn terminate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        info!(at = %self.clock, "已请求终止仿真");
        self.control.terminate();
        true
    }

    /// 请求在 `at` 时刻终止；`at` 必须严格大于当前时钟。
    pub fn terminate_at(&mut self, at: SimTime) -> bool {
        if !at.is_finite() || at <= self.clock {
            warn!(at = %at, now = %self.clock, "终止时刻必须晚于当前时钟，忽略");
            return false;
        }
        self.termination_time = Some(at);
        info!(at = %at, "已设置终止时刻");
        true
    }

    /// 立即中止。跳过所有实体的正常结束流程，中止后的状态不保证一致。
    pub fn abort(&mut self) {
        warn!(at = %self.clock, "已请求中止仿真");
        self.control.abort();
    }

    // ── 监听者 ────────────────────────────────────────────

    /// 每个已稳定（该时刻所有事件均已处理）的时间通知一次。
    pub fn add_on_clock_tick_listener(&mut self, f: impl FnMut(SimTime) + Send + 'static) {
        self.listeners.clock_tick.push(Box::new(f));
    }

    pub fn add_on_event_processing_listener(
        &mut self,
        f: impl FnMut(&SimEvent) + Send + 'static,
    ) {
        self.listeners.event_processing.push(Box::new(f));
    }

    pub fn add_on_pause_listener(&mut self, f: impl FnMut(SimTime) + Send + 'static) {
        self.listeners.pause.push(Box::new(f));
    }

    pub fn add_on_start_listener(&mut self, f: impl FnMut(SimTime) + Send + 'static) {
        self.listeners.start.push(Box::new(f));
    }

    pub fn add_on_finish_listener(&mut self, f: impl FnMut(SimTime) + Send + 'static) {
        self.listeners.finish.push(Box::new(f));
    }

    /// 绕过调度检查直接入队，只用于构造非法队列状态。
    #[cfg(test)]
    pub(crate) fn inject_raw(&mut self, ev: SimEvent) -> u64 {
        self.future.insert(ev)
    }

    pub(super) fn set_clock(&mut self, now: SimTime) {
        self.clock = now;
        if let Some(settled) = self.ticks.push(now) {
            trace!(settled = %settled, "时钟滴答");
            listener::fire(&mut self.listeners.clock_tick, settled);
        }
    }
}
