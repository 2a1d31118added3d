//! 实体执行上下文
//!
//! 实体在 `start_entity` / `process_event` / `shutdown_entity` 中拿到的句柄，
//! 所有调度请求都以当前实体为源，经由引擎完成。

use super::id::EntityId;
use super::state::EntityState;
use super::traits::SimEntity;
use crate::error::SimResult;
use crate::sim::{Payload, Predicate, SimEvent, SimTime, Simulation, Tag};

pub struct EntityContext<'a> {
    sim: &'a mut Simulation,
    id: EntityId,
}

impl<'a> EntityContext<'a> {
    pub(crate) fn new(sim: &'a mut Simulation, id: EntityId) -> Self {
        Self { sim, id }
    }

    /// 当前实体的标识符
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn now(&self) -> SimTime {
        self.sim.clock()
    }

    pub fn state(&self) -> Option<EntityState> {
        self.sim.entity_state(self.id)
    }

    /// 目录实体的标识符
    pub fn directory(&self) -> EntityId {
        self.sim.directory_id()
    }

    /// 访问整个仿真（暂停、终止、查询其他实体等）。
    pub fn sim(&mut self) -> &mut Simulation {
        &mut *self.sim
    }

    pub fn schedule(
        &mut self,
        dest: EntityId,
        delay: f64,
        tag: Tag,
        data: Option<Payload>,
    ) -> SimResult<bool> {
        self.sim.schedule(Some(self.id), dest, delay, tag, data)
    }

    pub fn schedule_now(&mut self, dest: EntityId, tag: Tag, data: Option<Payload>) -> SimResult<bool> {
        self.schedule(dest, 0.0, tag, data)
    }

    /// 插队发送：排在同一时刻所有普通事件之前。
    pub fn schedule_first(
        &mut self,
        dest: EntityId,
        delay: f64,
        tag: Tag,
        data: Option<Payload>,
    ) -> SimResult<bool> {
        self.sim.schedule_first(Some(self.id), dest, delay, tag, data)
    }

    /// 给自己发送事件
    pub fn schedule_self(&mut self, delay: f64, tag: Tag, data: Option<Payload>) -> SimResult<bool> {
        self.schedule(self.id, delay, tag, data)
    }

    /// 撤回本实体发出、尚未分发的第一条匹配事件。
    pub fn cancel(&mut self, pred: &Predicate) -> Option<SimEvent> {
        self.sim.cancel(Some(self.id), pred)
    }

    pub fn cancel_all(&mut self, pred: &Predicate) -> Vec<SimEvent> {
        self.sim.cancel_all(Some(self.id), pred)
    }

    /// 从延迟队列中取出下一条发给本实体、满足条件的事件。
    pub fn next_event(&mut self, pred: &Predicate) -> Option<SimEvent> {
        self.sim.select(self.id, pred)
    }

    /// 进入 `Waiting`，直到满足条件的事件到达。
    pub fn wait(&mut self, pred: Predicate) -> SimResult<()> {
        self.sim.request_wait(self.id, Some(pred))
    }

    /// 进入 `Waiting`，任何事件都可以唤醒。
    pub fn wait_any(&mut self) -> SimResult<()> {
        self.sim.request_wait(self.id, None)
    }

    /// 进入 `Holding`，`delay` 秒后被唤醒。
    pub fn hold(&mut self, delay: f64) -> SimResult<()> {
        self.sim.request_hold(self.id, delay)
    }

    /// 结束本实体；处理完当前事件后实体被移出名册。
    pub fn shutdown(&mut self) -> SimResult<bool> {
        self.sim.shutdown_entity(self.id)
    }

    pub fn add_entity(&mut self, entity: impl SimEntity + 'static) -> SimResult<EntityId> {
        self.sim.add_entity(entity)
    }
}
