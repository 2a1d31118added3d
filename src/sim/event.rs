//! 仿真事件
//!
//! 定义实体之间传递的带时间戳消息。

use super::tag::Tag;
use super::time::SimTime;
use crate::entity::EntityId;
use std::any::Any;
use std::fmt;

/// 事件携带的任意数据。
pub type Payload = Box<dyn Any + Send>;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// 发往目标实体的普通消息
    Send,
    /// 运行中动态加入的实体在此刻启动
    Create,
    /// `hold` 到期，唤醒源实体
    HoldDone,
}

/// 一条事件。入队后 `time` 不再改变，因此字段只在 crate 内可写。
pub struct SimEvent {
    pub(crate) time: SimTime,
    pub(crate) serial: u64,
    pub(crate) tag: Tag,
    pub(crate) source: Option<EntityId>,
    pub(crate) destination: EntityId,
    pub(crate) kind: EventKind,
    pub(crate) data: Option<Payload>,
}

impl SimEvent {
    pub(crate) fn new(
        kind: EventKind,
        time: SimTime,
        source: Option<EntityId>,
        destination: EntityId,
        tag: Tag,
        data: Option<Payload>,
    ) -> Self {
        Self {
            time,
            serial: 0,
            tag,
            source,
            destination,
            kind,
            data,
        }
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// 入队序号，同一时刻事件的确定性排序依据。
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// 发送方；`None` 表示由外部应用直接注入。
    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    pub fn destination(&self) -> EntityId {
        self.destination
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// 按具体类型借用数据；类型不符或没有数据时返回 `None`。
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref()?.downcast_ref::<T>()
    }

    /// 取出数据。类型不符时数据保留在事件中。
    pub fn take_data<T: Any>(&mut self) -> Option<T> {
        let data = self.data.take()?;
        match data.downcast::<T>() {
            Ok(v) => Some(*v),
            Err(data) => {
                self.data = Some(data);
                None
            }
        }
    }
}

impl fmt::Debug for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimEvent")
            .field("time", &self.time)
            .field("serial", &self.serial)
            .field("tag", &self.tag)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("kind", &self.kind)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}
