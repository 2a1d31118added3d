//! 统计信息
//!
//! 定义仿真运行统计数据结构。

use serde::Serialize;

/// 仿真统计信息
#[derive(Debug, Default, Clone, Serialize)]
pub struct SimStats {
    pub processed_events: u64,
    pub dropped_events: u64,
    pub canceled_events: u64,
    pub max_future_queue_len: usize,
    pub entities_started: u64,
    pub entities_finished: u64,
}
