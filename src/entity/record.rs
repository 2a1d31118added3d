//! 引擎侧的实体记录

use super::id::EntityId;
use super::state::EntityState;
use super::traits::SimEntity;
use crate::sim::{Predicate, SimEvent, SimTime};

/// 名册中的一项。`entity` 在实体运行期间被临时取出。
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) state: EntityState,
    pub(crate) started: bool,
    pub(crate) start_time: Option<SimTime>,
    pub(crate) shutdown_time: Option<SimTime>,
    pub(crate) wait: Option<Predicate>,
    /// 直接送达给等待中实体的单槽缓冲
    pub(crate) buffer: Option<SimEvent>,
    pub(crate) entity: Option<Box<dyn SimEntity>>,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId, entity: Box<dyn SimEntity>) -> Self {
        Self {
            id,
            name: entity.name().to_string(),
            state: EntityState::Runnable,
            started: false,
            start_time: None,
            shutdown_time: None,
            wait: None,
            buffer: None,
            entity: Some(entity),
        }
    }

    pub(crate) fn info(&self) -> EntityInfo {
        EntityInfo {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
            started: self.started,
            start_time: self.start_time,
            shutdown_time: self.shutdown_time,
        }
    }
}

/// 实体的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub state: EntityState,
    pub started: bool,
    pub start_time: Option<SimTime>,
    pub shutdown_time: Option<SimTime>,
}
