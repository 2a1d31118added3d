//! 错误类型
//!
//! 内核中所有可失败的公共 API 都返回 `SimResult<T>`。

use crate::entity::{EntityId, EntityState};
use crate::sim::SimTime;

/// 仿真内核错误。
///
/// `PastEvent` / `InvalidDelay` / `InvalidTransition` 属于编程错误：一旦在主循环中出现，
/// 会沿调用链向上传播并终止本次仿真。
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("past event detected: event at {event_time} but clock is already {clock}")]
    PastEvent { event_time: SimTime, clock: SimTime },

    #[error("invalid delay {delay}: delays must be finite")]
    InvalidDelay { delay: f64 },

    #[error("entity {entity} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        entity: EntityId,
        from: EntityState,
        to: EntityState,
    },

    #[error("entity {0} is not registered")]
    UnknownEntity(EntityId),

    #[error("simulation was already started")]
    AlreadyStarted,

    #[error("simulation has already finished")]
    AlreadyFinished,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
