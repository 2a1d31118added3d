//! 实体生命周期状态

/// 实体状态。`Finished` 是终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Runnable,
    Waiting,
    Holding,
    Finished,
}

impl EntityState {
    /// 状态机允许的转移。
    pub fn can_transition_to(self, to: EntityState) -> bool {
        use EntityState::*;
        match (self, to) {
            (Finished, _) => false,
            (_, Finished) => true,
            (Runnable, Waiting | Holding) => true,
            (Waiting | Holding, Runnable) => true,
            _ => false,
        }
    }
}
