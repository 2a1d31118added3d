
mod clock_tick;
mod config;
mod entity_lifecycle;
