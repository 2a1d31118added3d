//! 仿真实体
//!
//! 实体接口、标识符、生命周期状态以及实体在运行时使用的上下文。

mod context;
mod id;
mod record;
mod state;
mod traits;

pub use context::EntityContext;
pub use id::EntityId;
pub(crate) use record::EntityRecord;
pub use record::EntityInfo;
pub use state::EntityState;
pub use traits::SimEntity;
