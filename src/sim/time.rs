//! 仿真时间类型
//!
//! 仿真时钟以秒为单位的 `f64` 表示；通过 `total_cmp` 提供全序，便于作为队列键。

use std::cmp::Ordering;
use std::fmt;

/// 仿真时间（秒）。
#[derive(Debug, Clone, Copy, Default)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);
    /// 没有上界的时间点，用于 "一直运行"。
    pub const MAX: SimTime = SimTime(f64::INFINITY);

    pub fn from_secs(s: f64) -> SimTime {
        SimTime(s)
    }
    pub fn from_millis(ms: f64) -> SimTime {
        SimTime(ms / 1_000.0)
    }
    pub fn from_micros(us: f64) -> SimTime {
        SimTime(us / 1_000_000.0)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// 当前时间之后 `delay` 秒的时间点；负的延迟按 0 处理。
    pub fn plus(self, delay: f64) -> SimTime {
        SimTime(self.0 + delay.max(0.0))
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}
