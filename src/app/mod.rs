pub mod pipelines;
pub mod runner;

pub use runner::{run_stage, run_stages, Stage};
