//! 事件队列
//!
//! - `FutureQueue`：尚未到期的事件，按时间排序
//! - `DeferredQueue`：已送达但目标实体还未消费的事件

mod deferred;
mod event_key;
mod future;

pub use deferred::DeferredQueue;
pub use future::FutureQueue;
