pub mod demo;
pub mod directory;
pub mod entity;
pub mod error;
pub mod queue;
pub mod sim;

pub use error::{SimError, SimResult};

#[cfg(test)]
mod test;
