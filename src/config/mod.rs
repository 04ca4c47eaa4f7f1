#[cfg(feature = "cli")]
pub mod cli;
pub mod params;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use params::{IngestionSettings, ParamsConfig, PreprocessingSettings};
