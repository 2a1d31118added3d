//! 演示代码
//!
//! 一对对互相发送 PING / PONG 的实体，用于演示和端到端测试内核。

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entity::{EntityContext, EntityId, SimEntity};
use crate::error::{SimError, SimResult};
use crate::sim::{SimEvent, Simulation, Tag};
use tracing::{debug, info};

pub const PING: Tag = Tag(100);
pub const PONG: Tag = Tag(101);

/// Ping-pong 配置选项
#[derive(Debug, Clone)]
pub struct PingPongOpts {
    pub pairs: usize,
    pub rounds: u64,
    /// 每次回复的延迟（秒）
    pub delay: f64,
}

impl Default for PingPongOpts {
    fn default() -> Self {
        Self {
            pairs: 1,
            rounds: 3,
            delay: 1.0,
        }
    }
}

/// 一个 ping-pong 参与者。发起方在启动时发出第一个 PING。
#[derive(Debug)]
pub struct PingPong {
    name: String,
    peer: Option<EntityId>,
    initiator: bool,
    rounds_left: u64,
    delay: f64,
    completed: Arc<AtomicU64>,
}

impl PingPong {
    pub fn new(name: impl Into<String>, rounds: u64, delay: f64, completed: Arc<AtomicU64>) -> Self {
        Self {
            name: name.into(),
            peer: None,
            initiator: false,
            rounds_left: rounds,
            delay,
            completed,
        }
    }

    pub fn set_peer(&mut self, peer: EntityId, initiator: bool) {
        self.peer = Some(peer);
        self.initiator = initiator;
    }

    pub fn rounds_left(&self) -> u64 {
        self.rounds_left
    }
}

impl SimEntity for PingPong {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn start_entity(&mut self, ctx: &mut EntityContext<'_>) -> SimResult<()> {
        let dir = ctx.directory();
        ctx.schedule_now(dir, Tag::REGISTER_ENTITY, None)?;
        if let (true, Some(peer)) = (self.initiator, self.peer) {
            if self.rounds_left > 0 {
                ctx.schedule(peer, self.delay, PING, None)?;
            }
        }
        Ok(())
    }

    fn process_event(&mut self, ev: SimEvent, ctx: &mut EntityContext<'_>) -> SimResult<()> {
        match ev.tag() {
            PING => {
                let Some(src) = ev.source() else {
                    return Ok(());
                };
                debug!(entity = %self.name, from = %src, now = %ctx.now(), "收到 PING");
                ctx.schedule(src, self.delay, PONG, None)?;
            }
            PONG => {
                self.rounds_left = self.rounds_left.saturating_sub(1);
                self.completed.fetch_add(1, Ordering::Relaxed);
                if self.rounds_left > 0 {
                    let peer = self.peer.or(ev.source()).ok_or(SimError::UnknownEntity(ctx.id()))?;
                    ctx.schedule(peer, self.delay, PING, None)?;
                } else {
                    info!(entity = %self.name, now = %ctx.now(), "所有回合完成");
                }
            }
            Tag::END_OF_SIMULATION => {
                debug!(entity = %self.name, rounds_left = self.rounds_left, "收到仿真结束信号");
            }
            _ => {}
        }
        Ok(())
    }
}

/// 构建 `opts.pairs` 对 ping-pong 实体，返回所有实体标识符。
///
/// `completed` 统计所有发起方完成的回合数。
pub fn build_ping_pong(
    sim: &mut Simulation,
    opts: &PingPongOpts,
    completed: &Arc<AtomicU64>,
) -> SimResult<Vec<EntityId>> {
    let mut ids = Vec::with_capacity(opts.pairs.saturating_mul(2));
    for i in 0..opts.pairs {
        let a = sim.add_entity(PingPong::new(
            format!("ping{i}"),
            opts.rounds,
            opts.delay,
            Arc::clone(completed),
        ))?;
        let mut pong = PingPong::new(format!("pong{i}"), 0, opts.delay, Arc::clone(completed));
        pong.set_peer(a, false);
        let b = sim.add_entity(pong)?;
        if let Some(ping) = sim.entity_mut::<PingPong>(a) {
            ping.set_peer(b, true);
        }
        ids.push(a);
        ids.push(b);
    }
    Ok(ids)
}
