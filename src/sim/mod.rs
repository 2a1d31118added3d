//! 仿真核心模块
//!
//! 此模块包含离散事件仿真内核的核心组件：仿真时间、事件、标签、谓词、
//! 时钟滴答去抖、控制句柄以及仿真引擎。

// 子模块声明
mod clock_tick;
mod config;
mod control;
mod event;
mod listener;
mod predicate;
mod simulation;
mod simulation_entities;
mod simulation_loop;
mod stats;
mod tag;
mod time;

// 重新导出公共接口
pub use config::SimConfig;
pub use control::SimControl;
pub use event::{EventKind, Payload, SimEvent};
pub use listener::{EventListener, TimeListener};
pub use predicate::Predicate;
pub use simulation::{SimState, Simulation};
pub use stats::SimStats;
pub use tag::Tag;
pub use time::SimTime;

#[cfg(test)]
pub(crate) use clock_tick::ClockTickWindow;
