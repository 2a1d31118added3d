//! 事件标签
//!
//! 负数标签表示优先事件；`9000..=9999` 保留给内核自身的控制标签，其余范围留给业务层。

use std::fmt;

/// 事件标签：区分事件用途的整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub i64);

impl Tag {
    /// 仿真结束广播（优先事件）。
    pub const END_OF_SIMULATION: Tag = Tag(-1);

    pub const ENTITY_CREATE: Tag = Tag(9000);
    pub const HOLD_DONE: Tag = Tag(9001);
    pub const REGISTER_ENTITY: Tag = Tag(9002);
    pub const DEREGISTER_ENTITY: Tag = Tag(9003);
    pub const REGISTER_DIRECTORY: Tag = Tag(9004);
    pub const REGISTRY_REQUEST: Tag = Tag(9005);
    pub const REGISTRY_LIST: Tag = Tag(9006);

    pub const RESERVED_MIN: i64 = 9000;
    pub const RESERVED_MAX: i64 = 9999;

    /// 优先事件会排在同一时刻的普通事件之前。
    pub fn is_priority(self) -> bool {
        self.0 < 0
    }

    /// 是否为内核保留的控制标签。
    pub fn is_reserved(self) -> bool {
        self == Self::END_OF_SIMULATION || (Self::RESERVED_MIN..=Self::RESERVED_MAX).contains(&self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tag::END_OF_SIMULATION => write!(f, "END_OF_SIMULATION"),
            Tag::ENTITY_CREATE => write!(f, "ENTITY_CREATE"),
            Tag::HOLD_DONE => write!(f, "HOLD_DONE"),
            Tag::REGISTER_ENTITY => write!(f, "REGISTER_ENTITY"),
            Tag::DEREGISTER_ENTITY => write!(f, "DEREGISTER_ENTITY"),
            Tag::REGISTER_DIRECTORY => write!(f, "REGISTER_DIRECTORY"),
            Tag::REGISTRY_REQUEST => write!(f, "REGISTRY_REQUEST"),
            Tag::REGISTRY_LIST => write!(f, "REGISTRY_LIST"),
            Tag(n) => write!(f, "{n}"),
        }
    }
}
