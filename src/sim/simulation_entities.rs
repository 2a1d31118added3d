//! 仿真引擎：实体生命周期
//!
//! 注册、启动、执行、等待/挂起以及结束后移出名册。

use super::event::EventKind;
use super::simulation::{SimState, Simulation};
use super::tag::Tag;
use super::time::SimTime;
use crate::entity::{EntityContext, EntityId, EntityRecord, EntityState, SimEntity};
use crate::error::{SimError, SimResult};
use crate::sim::Predicate;
use tracing::{debug, info, trace};

impl EntityRecord {
    pub(crate) fn transition(&mut self, to: EntityState) -> SimResult<()> {
        if !self.state.can_transition_to(to) {
            return Err(SimError::InvalidTransition {
                entity: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

impl Simulation {
    /// 加入实体。运行前加入的实体在 `start` 时启动；运行中加入的实体通过一条
    /// `Create` 事件在当前时刻启动。
    pub fn add_entity(&mut self, entity: impl SimEntity + 'static) -> SimResult<EntityId> {
        self.add_boxed_entity(Box::new(entity))
    }

    pub fn add_boxed_entity(&mut self, entity: Box<dyn SimEntity>) -> SimResult<EntityId> {
        match self.state {
            SimState::Finished | SimState::Aborted => Err(SimError::AlreadyFinished),
            SimState::Idle => Ok(self.register(entity)),
            SimState::Running | SimState::Paused => {
                let id = self.register(entity);
                self.enqueue(EventKind::Create, None, id, 0.0, Tag::ENTITY_CREATE, None, false)?;
                Ok(id)
            }
        }
    }

    pub(super) fn register(&mut self, entity: Box<dyn SimEntity>) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        let rec = EntityRecord::new(id, entity);
        info!(entity = %id, name = %rec.name, "注册实体");
        self.entities.insert(id, rec);
        id
    }

    /// 启动实体并记录启动时间；已经启动过则返回 `false`。
    pub fn start_entity(&mut self, id: EntityId) -> SimResult<bool> {
        let now = self.clock;
        let rec = self
            .entities
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        if rec.started {
            return Ok(false);
        }
        rec.started = true;
        rec.start_time = Some(now);
        self.stats.entities_started += 1;
        debug!(entity = %id, at = %now, "启动实体");

        let Some(mut entity) = rec.entity.take() else {
            return Ok(true);
        };
        let result = {
            let mut ctx = EntityContext::new(self, id);
            entity.start_entity(&mut ctx)
        };
        self.restore(id, entity);
        result.map(|()| true)
    }

    /// 结束实体：进入 `Finished`、记录结束时间并移出名册。重复调用返回 `false`。
    ///
    /// 若实体此刻正在执行，则在它返回后再移出名册。
    pub fn shutdown_entity(&mut self, id: EntityId) -> SimResult<bool> {
        let now = self.clock;
        let Some(rec) = self.entities.get_mut(&id) else {
            return Ok(false);
        };
        if rec.state == EntityState::Finished {
            return Ok(false);
        }
        rec.transition(EntityState::Finished)?;
        rec.shutdown_time = Some(now);
        rec.wait = None;
        if rec.buffer.take().is_some() {
            self.stats.dropped_events += 1;
        }
        debug!(entity = %id, at = %now, "实体进入 Finished");

        if let Some(entity) = rec.entity.take() {
            self.purge(id, entity);
        }
        Ok(true)
    }

    pub(crate) fn request_wait(&mut self, id: EntityId, pred: Option<Predicate>) -> SimResult<()> {
        let rec = self
            .entities
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        rec.transition(EntityState::Waiting)?;
        rec.wait = pred;
        trace!(entity = %id, "实体进入 Waiting");
        Ok(())
    }

    pub(crate) fn request_hold(&mut self, id: EntityId, delay: f64) -> SimResult<()> {
        if !delay.is_finite() {
            return Err(SimError::InvalidDelay { delay });
        }
        let rec = self
            .entities
            .get_mut(&id)
            .ok_or(SimError::UnknownEntity(id))?;
        rec.transition(EntityState::Holding)?;
        trace!(entity = %id, delay, "实体进入 Holding");
        self.enqueue(EventKind::HoldDone, Some(id), id, delay, Tag::HOLD_DONE, None, false)?;
        Ok(())
    }

    /// 执行所有已启动且处于 `Runnable` 的实体（按标识符顺序）。
    pub(super) fn run_runnable_entities(&mut self, until: SimTime) -> SimResult<()> {
        let ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|r| r.started && r.state == EntityState::Runnable)
            .map(|r| r.id)
            .collect();
        for id in ids {
            self.run_entity(id, until)?;
        }
        Ok(())
    }

    /// 实体的执行步：依次取出缓冲区或延迟队列中 `time <= until` 的事件交给实体处理，
    /// 实体离开 `Runnable` 时提前停止。
    pub(super) fn run_entity(&mut self, id: EntityId, until: SimTime) -> SimResult<()> {
        let Some(rec) = self.entities.get_mut(&id) else {
            return Ok(());
        };
        if !rec.started || rec.state != EntityState::Runnable {
            return Ok(());
        }
        // 暂时把实体取出来，避免 &mut self 与 &mut entity 的重叠借用。
        let Some(mut entity) = rec.entity.take() else {
            return Ok(());
        };
        let mut next = rec.buffer.take();
        if next.is_none() {
            next = self.deferred.select(id, |ev| ev.time() <= until);
        }

        let mut result = Ok(());
        while let Some(ev) = next {
            trace!(entity = %id, serial = ev.serial(), tag = %ev.tag(), "实体处理事件");
            let mut ctx = EntityContext::new(self, id);
            if let Err(e) = entity.process_event(ev, &mut ctx) {
                result = Err(e);
                break;
            }
            if self.entity_state(id) != Some(EntityState::Runnable) {
                break;
            }
            next = self.deferred.select(id, |ev| ev.time() <= until);
        }

        self.restore(id, entity);
        result
    }

    /// 把执行完的实体放回名册；若它已结束则移出名册。
    fn restore(&mut self, id: EntityId, entity: Box<dyn SimEntity>) {
        let Some(rec) = self.entities.get_mut(&id) else {
            return;
        };
        if rec.state != EntityState::Finished {
            rec.entity = Some(entity);
            return;
        }
        self.purge(id, entity);
    }

    fn purge(&mut self, id: EntityId, mut entity: Box<dyn SimEntity>) {
        {
            let mut ctx = EntityContext::new(self, id);
            entity.shutdown_entity(&mut ctx);
        }
        let dropped = self.deferred.remove_for(id);
        self.stats.dropped_events += dropped as u64;
        self.stats.entities_finished += 1;
        if let Some(rec) = self.entities.remove(&id) {
            info!(
                entity = %id,
                name = %rec.name,
                start_time = ?rec.start_time,
                shutdown_time = ?rec.shutdown_time,
                dropped_deferred = dropped,
                "实体已结束，移出名册"
            );
        }
    }

    /// 所有存活实体中最小的周期调度间隔；没有则退回最小事件间隔。
    pub(super) fn min_scheduling_interval(&self) -> f64 {
        self.entities
            .values()
            .filter_map(|r| r.entity.as_ref()?.scheduling_interval())
            .map(SimTime::as_secs)
            .filter(|s| s.is_finite() && *s > 0.0)
            .min_by(f64::total_cmp)
            .unwrap_or(self.cfg.min_time_between_events)
    }
}
