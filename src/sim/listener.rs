//! 监听者集合
//!
//! 由仿真引擎持有，按注册顺序同步调用。

use super::event::SimEvent;
use super::time::SimTime;

pub type TimeListener = Box<dyn FnMut(SimTime) + Send>;
pub type EventListener = Box<dyn FnMut(&SimEvent) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) clock_tick: Vec<TimeListener>,
    pub(crate) event_processing: Vec<EventListener>,
    pub(crate) pause: Vec<TimeListener>,
    pub(crate) start: Vec<TimeListener>,
    pub(crate) finish: Vec<TimeListener>,
}

pub(crate) fn fire(listeners: &mut [TimeListener], at: SimTime) {
    for l in listeners.iter_mut() {
        l(at);
    }
}

impl Listeners {
    pub(crate) fn fire_event(&mut self, ev: &SimEvent) {
        for l in self.event_processing.iter_mut() {
            l(ev);
        }
    }
}
