//! 实体接口

use super::context::EntityContext;
use crate::error::SimResult;
use crate::sim::{SimEvent, SimTime};
use std::any::Any;

/// 仿真实体：由业务层实现（例如数据中心、代理、调度器等）。
///
/// 生命周期状态由引擎维护；实体只通过 [`EntityContext`] 请求 `wait` / `hold` / `shutdown`。
pub trait SimEntity: Send {
    /// 获取实体名称
    fn name(&self) -> &str;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 实体启动时调用一次
    fn start_entity(&mut self, _ctx: &mut EntityContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// 处理一条送达的事件
    fn process_event(&mut self, ev: SimEvent, ctx: &mut EntityContext<'_>) -> SimResult<()>;

    /// 实体进入 `Finished` 后、移出名册前调用
    fn shutdown_entity(&mut self, _ctx: &mut EntityContext<'_>) {}

    /// 周期性调度间隔。仿真在等待终止时刻时按所有实体中最小的间隔推进时钟。
    fn scheduling_interval(&self) -> Option<SimTime> {
        None
    }
}
