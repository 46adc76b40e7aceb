#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod plugin;
pub mod sweep;

pub use config::SweepConfig;
pub use error::RetentionError;
pub use plugin::RetentionSweep;
pub use sweep::{SweepReport, select_expired, sweep};
