//! 目录实体
//!
//! 一个普通实体：业务实体向它登记自己，其他实体向它查询当前登记表；
//! 收到仿真结束信号时，把结束信号转发给所有登记的实体和对等目录，然后清空登记表。

use std::any::Any;

use crate::entity::{EntityContext, EntityId, SimEntity};
use crate::error::SimResult;
use crate::sim::{SimEvent, Tag};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct EntityDirectory {
    name: String,
    registry: Vec<EntityId>,
    peers: Vec<EntityId>,
}

impl EntityDirectory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: Vec::new(),
            peers: Vec::new(),
        }
    }

    /// 已登记的实体（按登记顺序）
    pub fn registered(&self) -> &[EntityId] {
        &self.registry
    }

    pub fn peers(&self) -> &[EntityId] {
        &self.peers
    }

    pub fn register(&mut self, id: EntityId) -> bool {
        if self.registry.contains(&id) {
            return false;
        }
        self.registry.push(id);
        true
    }

    pub fn deregister(&mut self, id: EntityId) -> bool {
        let before = self.registry.len();
        self.registry.retain(|e| *e != id);
        before != self.registry.len()
    }

    pub fn add_peer(&mut self, id: EntityId) -> bool {
        if self.peers.contains(&id) {
            return false;
        }
        self.peers.push(id);
        true
    }

    /// 事件数据中的实体标识符；没有数据时使用事件源。
    fn subject(ev: &mut SimEvent) -> Option<EntityId> {
        ev.take_data::<EntityId>().or(ev.source())
    }

    fn notify_shutdown(&mut self, ctx: &mut EntityContext<'_>) -> SimResult<()> {
        let targets: Vec<EntityId> = self
            .registry
            .iter()
            .chain(self.peers.iter())
            .copied()
            .filter(|id| *id != ctx.id())
            .collect();
        info!(
            directory = %self.name,
            registered = self.registry.len(),
            peers = self.peers.len(),
            "📣 转发仿真结束信号"
        );
        self.registry.clear();
        self.peers.clear();
        for id in targets {
            ctx.schedule_now(id, Tag::END_OF_SIMULATION, None)?;
        }
        Ok(())
    }
}

impl SimEntity for EntityDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[tracing::instrument(skip(self, ev, ctx), fields(directory = %self.name, tag = %ev.tag(), src = ?ev.source()))]
    fn process_event(&mut self, mut ev: SimEvent, ctx: &mut EntityContext<'_>) -> SimResult<()> {
        match ev.tag() {
            Tag::REGISTER_ENTITY => match Self::subject(&mut ev) {
                Some(id) => {
                    if self.register(id) {
                        debug!(entity = %id, "登记实体");
                    }
                }
                None => warn!("登记请求缺少实体标识符"),
            },
            Tag::DEREGISTER_ENTITY => {
                if let Some(id) = Self::subject(&mut ev) {
                    self.deregister(id);
                }
            }
            Tag::REGISTER_DIRECTORY => match Self::subject(&mut ev) {
                Some(id) => {
                    self.add_peer(id);
                }
                None => warn!("对等目录登记缺少标识符"),
            },
            Tag::REGISTRY_REQUEST => match ev.source() {
                Some(src) => {
                    let sim = ctx.sim();
                    let alive: Vec<EntityId> = self
                        .registry
                        .iter()
                        .copied()
                        .filter(|id| sim.is_registered(*id))
                        .collect();
                    ctx.schedule_now(src, Tag::REGISTRY_LIST, Some(Box::new(alive)))?;
                }
                None => warn!("登记表查询没有发送方，无法回复"),
            },
            Tag::END_OF_SIMULATION => self.notify_shutdown(ctx)?,
            other => debug!(tag = %other, "目录忽略未知事件"),
        }
        Ok(())
    }
}
