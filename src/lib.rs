pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::LocalStorage;
pub use app::{run_stage, run_stages, Stage};
pub use config::ParamsConfig;
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
