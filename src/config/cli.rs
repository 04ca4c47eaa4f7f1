use crate::app::runner::Stage;
use crate::config::params::ParamsConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

pub const DEFAULT_PARAMS_FILE: &str = "params.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "fakenews-etl")]
#[command(about = "Fake news classification pipeline: ingest, preprocess, train, evaluate")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Path to params.toml (defaults to ./params.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log CPU and memory usage per phase
    #[arg(long, global = true)]
    pub monitor: bool,

    #[arg(long, global = true)]
    pub fake_source: Option<String>,

    #[arg(long, global = true)]
    pub true_source: Option<String>,

    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    #[arg(long, global = true)]
    pub test_size: Option<f64>,

    /// Seed for the stratified split
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[arg(long, global = true)]
    pub max_features: Option<usize>,

    #[arg(long, global = true)]
    pub min_df: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Load both corpora, filter dates, encode labels and split into data/raw
    Ingest,
    /// Clean text and vectorize into data/processed
    Preprocess,
    /// Fit the logistic regression model into models/model.json
    Train,
    /// Score the model on the test split into metrics/eval_metrics.json
    Evaluate,
    /// Run every stage in order
    Run,
}

impl Command {
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Command::Ingest => &[Stage::Ingestion],
            Command::Preprocess => &[Stage::Preprocessing],
            Command::Train => &[Stage::ModelBuilding],
            Command::Evaluate => &[Stage::Evaluation],
            Command::Run => &Stage::ALL,
        }
    }
}

impl CliConfig {
    /// 讀取 params.toml 並套用命令列覆蓋設定
    pub fn load_params(&self) -> Result<ParamsConfig> {
        let mut params = match &self.config {
            Some(path) => ParamsConfig::from_file(path)?,
            None if Path::new(DEFAULT_PARAMS_FILE).is_file() => {
                ParamsConfig::from_file(DEFAULT_PARAMS_FILE)?
            }
            None => {
                tracing::warn!(
                    "⚠️ No {} found, relying on command line options",
                    DEFAULT_PARAMS_FILE
                );
                ParamsConfig::default()
            }
        };
        self.apply_overrides(&mut params);
        Ok(params)
    }

    pub fn apply_overrides(&self, params: &mut ParamsConfig) {
        let overrides: [(&str, Option<String>, &mut Option<String>); 3] = [
            ("paths.fake_source", self.fake_source.clone(), &mut params.paths.fake_source),
            ("paths.true_source", self.true_source.clone(), &mut params.paths.true_source),
            ("paths.output_dir", self.output_dir.clone(), &mut params.paths.output_dir),
        ];
        for (field, value, slot) in overrides {
            if let Some(value) = value {
                tracing::info!("🔧 {} overridden to: {}", field, value);
                *slot = Some(value);
            }
        }

        if let Some(test_size) = self.test_size {
            tracing::info!("🔧 dataingestion.test_size overridden to: {}", test_size);
            params.dataingestion.test_size = Some(test_size);
        }
        if let Some(seed) = self.seed {
            tracing::info!("🔧 dataingestion.random_state overridden to: {}", seed);
            params.dataingestion.random_state = Some(seed);
        }
        if let Some(max_features) = self.max_features {
            tracing::info!("🔧 preprocessing.max_features overridden to: {}", max_features);
            params.preprocessing.max_features = Some(max_features);
        }
        if let Some(min_df) = self.min_df {
            tracing::info!("🔧 preprocessing.min_df overridden to: {}", min_df);
            params.preprocessing.min_df = Some(min_df);
        }
    }

    pub fn monitor_enabled(&self, params: &ParamsConfig) -> bool {
        self.monitor || params.monitoring_enabled()
    }
}
