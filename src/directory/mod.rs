//! 实体目录（发现服务）
//!
//! 每个 `Simulation` 创建时都会注册一个目录实体，通过 `Simulation::directory_id` 获取。

mod entity_directory;

pub use entity_directory::EntityDirectory;
