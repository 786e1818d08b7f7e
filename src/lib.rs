pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{engine_for, LocalEngine, StandaloneEngine};
pub use config::{ConfigLayer, Settings};
pub use crate::core::{job::SmokeTest, report::JobReport};
pub use utils::error::{Result, SmokeError};
