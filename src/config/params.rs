use crate::core::classifier::LogisticRegressionParams;
use crate::core::splitter::SplitConfig;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_fraction, validate_path, validate_positive_number,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_INGESTION_SEED: u64 = 33;
pub const DEFAULT_MAX_FEATURES: usize = 500;
pub const DEFAULT_MIN_DF: usize = 2;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// params.toml 的內容；所有欄位皆為選填，由各 stage 取用時再檢查
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamsConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub dataingestion: DataIngestionConfig,
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    #[serde(default)]
    pub modelbuilding: ModelBuildingConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub fake_source: Option<String>,
    pub true_source: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataIngestionConfig {
    pub test_size: Option<f64>,
    pub random_state: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    pub max_features: Option<usize>,
    pub min_df: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelBuildingConfig {
    pub random_state: Option<u64>,
    pub max_iter: Option<usize>,
    pub learning_rate: Option<f64>,
    pub batch_size: Option<usize>,
    pub c: Option<f64>,
    pub tol: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionSettings {
    pub fake_source: PathBuf,
    pub true_source: PathBuf,
    pub split: SplitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessingSettings {
    pub max_features: usize,
    pub min_df: usize,
}

impl ParamsConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EtlError::MissingSourceError {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| {
            EtlError::invalid_config("params.toml", e.message(), format!("TOML parsing error: {}", e))
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn output_dir(&self) -> &str {
        self.paths.output_dir.as_deref().unwrap_or(".")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn ingestion(&self) -> Result<IngestionSettings> {
        let fake_source = validate_required_field("paths.fake_source", &self.paths.fake_source)?;
        let true_source = validate_required_field("paths.true_source", &self.paths.true_source)?;
        validate_path("paths.fake_source", fake_source)?;
        validate_path("paths.true_source", true_source)?;
        validate_file_extensions(
            "paths",
            &[fake_source.as_str(), true_source.as_str()],
            &["csv"],
        )?;

        let test_size =
            *validate_required_field("dataingestion.test_size", &self.dataingestion.test_size)?;
        validate_fraction("dataingestion.test_size", test_size)?;

        Ok(IngestionSettings {
            fake_source: PathBuf::from(fake_source),
            true_source: PathBuf::from(true_source),
            split: SplitConfig {
                test_size,
                seed: self
                    .dataingestion
                    .random_state
                    .unwrap_or(DEFAULT_INGESTION_SEED),
            },
        })
    }

    pub fn preprocessing(&self) -> Result<PreprocessingSettings> {
        let max_features = self
            .preprocessing
            .max_features
            .unwrap_or(DEFAULT_MAX_FEATURES);
        let min_df = self.preprocessing.min_df.unwrap_or(DEFAULT_MIN_DF);
        validate_positive_number("preprocessing.max_features", max_features, 1)?;
        validate_positive_number("preprocessing.min_df", min_df, 1)?;
        Ok(PreprocessingSettings {
            max_features,
            min_df,
        })
    }

    pub fn model_building(&self) -> Result<LogisticRegressionParams> {
        let section = &self.modelbuilding;
        let random_state =
            *validate_required_field("modelbuilding.random_state", &section.random_state)?;
        let max_iter = *validate_required_field("modelbuilding.max_iter", &section.max_iter)?;

        let defaults = LogisticRegressionParams::new(random_state, max_iter);
        let params = LogisticRegressionParams {
            learning_rate: section.learning_rate.unwrap_or(defaults.learning_rate),
            batch_size: section.batch_size.unwrap_or(defaults.batch_size),
            c: section.c.unwrap_or(defaults.c),
            tol: section.tol.unwrap_or(defaults.tol),
            ..defaults
        };
        params.validate()?;
        Ok(params)
    }
}

impl Validate for ParamsConfig {
    /// 各 stage 共用的設定；stage 專屬的鍵由 ingestion() 等取用時檢查
    fn validate(&self) -> Result<()> {
        validate_path("paths.output_dir", self.output_dir())
    }
}
