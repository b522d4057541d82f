//! Harvestvale library crate: the farming/mining simulation core.
//!
//! The binary crate (`main.rs`) runs a scripted headless week. This
//! library exposes the same modules so that `tests/` integration tests can
//! drive the plugins without a window or GPU.

pub mod shared;
pub mod config;
pub mod calendar;
pub mod world;
pub mod skills;
pub mod economy;
pub mod farming;
pub mod mining;
pub mod save;
pub mod sim;
