//! 仿真控制句柄
//!
//! 可以克隆并跨线程传递，用于在主循环之外恢复、终止或中止仿真。
//! 暂停等待基于条件变量，而不是轮询睡眠。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
struct ControlState {
    paused: Mutex<bool>,
    resumed: Condvar,
    terminate_requested: AtomicBool,
    abort_requested: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct SimControl {
    inner: Arc<ControlState>,
}

impl SimControl {
    /// 清除暂停标志并唤醒阻塞中的主循环。
    pub fn resume(&self) -> bool {
        let mut paused = self
            .inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let was_paused = *paused;
        *paused = false;
        self.inner.resumed.notify_all();
        was_paused
    }

    pub fn is_paused(&self) -> bool {
        *self
            .inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// 请求主循环在下一批事件之后停止（仍执行正常的结束流程）。
    pub fn terminate(&self) {
        self.inner.terminate_requested.store(true, Ordering::SeqCst);
        self.resume();
    }

    /// 立即中止，不执行正常的结束流程。
    pub fn abort(&self) {
        self.inner.abort_requested.store(true, Ordering::SeqCst);
        self.resume();
    }

    pub fn is_terminate_requested(&self) -> bool {
        self.inner.terminate_requested.load(Ordering::SeqCst)
    }

    pub fn is_abort_requested(&self) -> bool {
        self.inner.abort_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn set_paused(&self) {
        *self
            .inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
    }

    /// 阻塞直到 `resume` 被调用。
    pub(crate) fn wait_while_paused(&self) {
        let paused = self
            .inner
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .inner
            .resumed
            .wait_while(paused, |p| *p)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
