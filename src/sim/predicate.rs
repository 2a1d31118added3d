//! 事件过滤谓词
//!
//! 用于 `wait` / `next_event` / `cancel`。

use super::event::{EventKind, SimEvent};
use super::tag::Tag;
use crate::entity::EntityId;
use std::fmt;
use std::sync::Arc;

/// 可克隆的事件谓词。
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&SimEvent) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&SimEvent) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// 匹配任意事件
    pub fn any() -> Self {
        Self::new(|_| true)
    }

    pub fn tag(tag: Tag) -> Self {
        Self::new(move |ev| ev.tag() == tag)
    }

    pub fn from_source(src: EntityId) -> Self {
        Self::new(move |ev| ev.source() == Some(src))
    }

    pub fn kind(kind: EventKind) -> Self {
        Self::new(move |ev| ev.kind() == kind)
    }

    pub fn and(self, other: Predicate) -> Self {
        Self::new(move |ev| self.matches(ev) && other.matches(ev))
    }

    pub fn matches(&self, ev: &SimEvent) -> bool {
        (self.0)(ev)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
