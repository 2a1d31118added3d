//! 仿真引擎：主循环
//!
//! 每一轮：执行可运行实体 → 取出最早时刻的全部事件并分发 → 必要时为等待终止
//! 时刻推进时钟 → 检查暂停 → 判断是否停止。

use super::event::{EventKind, SimEvent};
use super::listener;
use super::simulation::{SimState, Simulation};
use super::tag::Tag;
use super::time::SimTime;
use crate::entity::{EntityId, EntityState};
use crate::error::{SimError, SimResult};
use tracing::{debug, info, trace, warn};

/// 单轮循环的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    /// 处理了事件或推进了时钟
    Continue,
    /// `until` 之前没有可处理的工作，但仿真尚未结束
    Idle,
    /// 满足停止条件
    Stop,
}

impl Simulation {
    /// 启动并一直运行到停止条件满足，返回最终时钟。暂停时阻塞等待 `resume`。
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> SimResult<SimTime> {
        self.start_sync()?;
        loop {
            match self.step(SimTime::MAX)? {
                Step::Continue => {}
                Step::Idle | Step::Stop => break,
            }
            if self.state == SimState::Paused {
                self.block_until_resumed();
            }
        }
        self.complete()?;
        Ok(self.clock)
    }

    /// 只启动实体，不进入主循环；之后用 `run_for` 逐步推进。
    pub fn start_sync(&mut self) -> SimResult<()> {
        match self.state {
            SimState::Idle => {}
            SimState::Finished | SimState::Aborted => return Err(SimError::AlreadyFinished),
            SimState::Running | SimState::Paused => return Err(SimError::AlreadyStarted),
        }
        self.state = SimState::Running;
        info!(
            entities = self.entities.len(),
            queue_size = self.future.len(),
            "▶️  开始运行仿真"
        );
        listener::fire(&mut self.listeners.start, self.clock);

        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            if self.is_registered(id) {
                self.start_entity(id)?;
            }
        }
        Ok(())
    }

    /// 处理 `[clock, clock + interval]` 内的全部事件后返回当前时钟。
    ///
    /// 尚未启动时先启动；暂停时直接返回；满足停止条件时执行结束流程。
    pub fn run_for(&mut self, interval: f64) -> SimResult<SimTime> {
        if interval.is_nan() {
            return Err(SimError::InvalidDelay { delay: interval });
        }
        match self.state {
            SimState::Idle => self.start_sync()?,
            SimState::Running => {}
            SimState::Paused => {
                if self.control.is_paused() {
                    return Ok(self.clock);
                }
                self.state = SimState::Running;
            }
            SimState::Finished | SimState::Aborted => return Ok(self.clock),
        }

        let mut until = self.clock.plus(interval);
        if let Some(p) = self.pause_at {
            until = until.min(p);
        }
        loop {
            match self.step(until)? {
                Step::Continue => {
                    if self.state == SimState::Paused {
                        return Ok(self.clock);
                    }
                }
                Step::Idle => {
                    if until.is_finite() && until > self.clock {
                        self.set_clock(until);
                    }
                    self.check_pause();
                    return Ok(self.clock);
                }
                Step::Stop => {
                    self.complete()?;
                    return Ok(self.clock);
                }
            }
        }
    }

    /// 终止时刻加上两倍最小事件间隔的宽限窗口
    fn termination_horizon(&self) -> Option<SimTime> {
        self.termination_time
            .map(|t| t.plus(2.0 * self.cfg.min_time_between_events))
    }

    fn stop_requested(&self) -> bool {
        self.control.is_abort_requested() || self.control.is_terminate_requested()
    }

    pub(super) fn step(&mut self, until: SimTime) -> SimResult<Step> {
        if self.stop_requested() {
            return Ok(Step::Stop);
        }
        let horizon = self.termination_horizon();
        let bound = horizon.map_or(until, |h| until.min(h));

        self.run_runnable_entities(bound)?;
        // 实体可能刚刚请求了终止或暂停，必须在处理下一批事件之前生效。
        if self.stop_requested() {
            return Ok(Step::Stop);
        }
        if self.check_pause() {
            return Ok(Step::Continue);
        }

        // 宽限窗口之外的事件永远不会被处理。
        let pending = self
            .future
            .first_time()
            .filter(|t| horizon.is_none_or(|h| *t <= h));
        match pending {
            Some(at) if at <= bound => self.process_batch(at)?,
            Some(_) => return Ok(Step::Idle),
            None => match self.termination_time {
                Some(t) if self.clock < t => {
                    // 队列为空但还没到终止时刻：推进时钟，继续等待动态注入的工作。
                    let target = self
                        .clock
                        .plus(self.min_scheduling_interval())
                        .min(t)
                        .min(until);
                    if target <= self.clock {
                        return Ok(Step::Idle);
                    }
                    trace!(from = %self.clock, to = %target, "等待终止时刻，推进时钟");
                    self.set_clock(target);
                }
                _ => return Ok(Step::Stop),
            },
        }

        // 暂停检查留到下一轮实体执行之后，保证暂停前本时刻的事件都已被消费。
        if self.stop_requested() {
            return Ok(Step::Stop);
        }
        Ok(Step::Continue)
    }

    /// 依次处理所有时间等于 `at` 的事件（时钟只前进一次）。
    fn process_batch(&mut self, at: SimTime) -> SimResult<()> {
        while let Some(ev) = self.future.pop_at(at) {
            self.process_event(ev)?;
        }
        Ok(())
    }

    fn process_event(&mut self, ev: SimEvent) -> SimResult<()> {
        if ev.time() < self.clock {
            return Err(SimError::PastEvent {
                event_time: ev.time(),
                clock: self.clock,
            });
        }
        self.set_clock(ev.time());
        self.stats.processed_events += 1;
        debug!(
            event_num = self.stats.processed_events,
            now = %self.clock,
            serial = ev.serial(),
            tag = %ev.tag(),
            kind = ?ev.kind(),
            dest = %ev.destination(),
            remaining_queue = self.future.len(),
            "执行事件"
        );
        self.listeners.fire_event(&ev);

        match ev.kind() {
            EventKind::Send => self.dispatch(ev),
            EventKind::Create => {
                let id = ev.destination();
                if !self.is_registered(id) {
                    warn!(entity = %id, "待创建的实体已不在名册中");
                    self.stats.dropped_events += 1;
                    return Ok(());
                }
                self.start_entity(id).map(|_| ())
            }
            EventKind::HoldDone => self.wake_holder(ev.destination()),
        }
    }

    /// 目标正在等待且谓词匹配（或没有谓词）时直接送达，否则放入延迟队列。
    fn dispatch(&mut self, ev: SimEvent) -> SimResult<()> {
        let dest = ev.destination();
        let Some(rec) = self.entities.get_mut(&dest) else {
            warn!(dest = %dest, tag = %ev.tag(), "目标实体已不在名册中，拒绝送达");
            self.stats.dropped_events += 1;
            return Ok(());
        };
        match rec.state {
            EntityState::Finished => {
                warn!(dest = %dest, tag = %ev.tag(), "目标实体已结束，拒绝送达");
                self.stats.dropped_events += 1;
            }
            EntityState::Waiting => {
                let accept = ev.tag() == Tag::END_OF_SIMULATION
                    || rec.wait.as_ref().is_none_or(|p| p.matches(&ev));
                if accept {
                    trace!(dest = %dest, serial = ev.serial(), "直接送达等待中的实体");
                    rec.wait = None;
                    rec.buffer = Some(ev);
                    rec.transition(EntityState::Runnable)?;
                } else {
                    self.deferred.push(ev);
                }
            }
            EntityState::Runnable | EntityState::Holding => self.deferred.push(ev),
        }
        Ok(())
    }

    fn wake_holder(&mut self, id: EntityId) -> SimResult<()> {
        match self.entities.get_mut(&id) {
            Some(rec) if rec.state == EntityState::Holding => {
                trace!(entity = %id, "hold 到期，实体恢复 Runnable");
                rec.transition(EntityState::Runnable)
            }
            Some(rec) => Err(SimError::InvalidTransition {
                entity: id,
                from: rec.state,
                to: EntityState::Runnable,
            }),
            None => {
                warn!(entity = %id, "hold 到期但实体已不在名册中");
                self.stats.dropped_events += 1;
                Ok(())
            }
        }
    }

    /// 检查是否到了暂停时刻；到了则进入 `Paused` 并通知监听者。
    pub(super) fn check_pause(&mut self) -> bool {
        let Some(at) = self.pause_at else {
            return false;
        };
        let due = match self.future.first_time() {
            Some(next) => next >= at && self.clock <= at,
            None => self.clock >= at,
        };
        if !due {
            return false;
        }
        self.pause_at = None;
        if self.clock < at {
            self.set_clock(at);
        }
        self.control.set_paused();
        self.state = SimState::Paused;
        info!(at = %self.clock, "⏸️  仿真暂停");
        listener::fire(&mut self.listeners.pause, self.clock);
        true
    }

    fn block_until_resumed(&mut self) {
        debug!(at = %self.clock, "等待恢复");
        self.control.wait_while_paused();
        self.state = SimState::Running;
        info!(at = %self.clock, "▶️  仿真恢复");
    }

    /// 停止后的收尾：中止时直接返回，否则执行正常的结束流程。
    fn complete(&mut self) -> SimResult<()> {
        if self.control.is_abort_requested() {
            self.state = SimState::Aborted;
            warn!(
                at = %self.clock,
                pending = self.future.len(),
                entities = self.entities.len(),
                "⛔ 仿真已中止，跳过实体结束流程"
            );
            return Ok(());
        }
        self.finish()
    }

    /// 向所有存活实体广播结束信号，处理当前时刻剩余的事件，然后结束所有实体。
    fn finish(&mut self) -> SimResult<()> {
        let living: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in living {
            self.enqueue(EventKind::Send, None, id, 0.0, Tag::END_OF_SIMULATION, None, false)?;
        }
        self.drain_current_instant()?;

        let remaining: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in remaining {
            self.shutdown_entity(id)?;
        }

        let leftover_future = self.future.clear();
        let leftover_deferred = self.deferred.clear();
        if leftover_future > 0 || leftover_deferred > 0 {
            debug!(leftover_future, leftover_deferred, "丢弃未处理的事件");
        }
        if let Some(settled) = self.ticks.flush() {
            listener::fire(&mut self.listeners.clock_tick, settled);
        }

        self.state = SimState::Finished;
        info!(
            total_events = self.stats.processed_events,
            final_time = %self.clock,
            "✅ 仿真完成"
        );
        listener::fire(&mut self.listeners.finish, self.clock);
        Ok(())
    }

    /// 反复执行实体并处理当前时刻的事件，直到当前时刻没有新工作。
    fn drain_current_instant(&mut self) -> SimResult<()> {
        let now = self.clock;
        loop {
            self.run_runnable_entities(now)?;
            match self.future.first_time() {
                Some(at) if at <= now => self.process_batch(at)?,
                _ => return Ok(()),
            }
        }
    }
}
