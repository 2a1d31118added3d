use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{SimError, SimResult};

/// 仿真配置。所有字段都有默认值，JSON 中可以只写需要覆盖的部分。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 两个事件之间的最小时间粒度（秒），同时决定终止后的宽限窗口（两倍）。
    pub min_time_between_events: f64,
    /// 在此时刻请求终止仿真
    pub termination_time: Option<f64>,
    /// 在此时刻请求暂停仿真
    pub pause_at: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_time_between_events: 0.1,
            termination_time: None,
            pause_at: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(raw: &str) -> SimResult<Self> {
        let cfg: SimConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.min_time_between_events.is_finite() || self.min_time_between_events <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "min_time_between_events must be finite and > 0, got {}",
                self.min_time_between_events
            )));
        }
        for (name, v) in [
            ("termination_time", self.termination_time),
            ("pause_at", self.pause_at),
        ] {
            if let Some(v) = v {
                if !v.is_finite() || v < 0.0 {
                    return Err(SimError::InvalidConfig(format!(
                        "{name} must be finite and >= 0, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }
}
