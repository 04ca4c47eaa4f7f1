use crate::app::pipelines::{
    EvaluationPipeline, IngestionPipeline, ModelBuildingPipeline, PreprocessingPipeline,
};
use crate::config::params::ParamsConfig;
use crate::core::etl::EtlEngine;
use crate::core::Storage;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Preprocessing,
    ModelBuilding,
    Evaluation,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Ingestion,
        Stage::Preprocessing,
        Stage::ModelBuilding,
        Stage::Evaluation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Ingestion => "data_ingestion",
            Stage::Preprocessing => "data_preprocessing",
            Stage::ModelBuilding => "model_building",
            Stage::Evaluation => "model_evaluation",
        }
    }

    /// 在任何 I/O 之前確認此 stage 需要的設定
    pub fn check_params(self, params: &ParamsConfig) -> Result<()> {
        match self {
            Stage::Ingestion => params.ingestion().map(|_| ()),
            Stage::Preprocessing => params.preprocessing().map(|_| ()),
            Stage::ModelBuilding => params.model_building().map(|_| ()),
            Stage::Evaluation => Ok(()),
        }
    }
}

pub fn run_stage<S: Storage>(
    stage: Stage,
    storage: S,
    params: &ParamsConfig,
    monitor_enabled: bool,
) -> Result<String> {
    match stage {
        Stage::Ingestion => {
            let pipeline = IngestionPipeline::new(storage, params.ingestion()?);
            EtlEngine::new_with_monitoring(pipeline, monitor_enabled).run()
        }
        Stage::Preprocessing => {
            let pipeline = PreprocessingPipeline::new(storage, params.preprocessing()?);
            EtlEngine::new_with_monitoring(pipeline, monitor_enabled).run()
        }
        Stage::ModelBuilding => {
            let pipeline = ModelBuildingPipeline::new(storage, params.model_building()?);
            EtlEngine::new_with_monitoring(pipeline, monitor_enabled).run()
        }
        Stage::Evaluation => {
            EtlEngine::new_with_monitoring(EvaluationPipeline::new(storage), monitor_enabled).run()
        }
    }
}

/// 依序執行多個 stage；任一失敗即停止，先前產物保留
pub fn run_stages<S: Storage + Clone>(
    stages: &[Stage],
    storage: &S,
    params: &ParamsConfig,
    monitor_enabled: bool,
) -> Result<Vec<String>> {
    params.validate()?;
    for stage in stages {
        stage.check_params(params)?;
    }

    let mut outputs = Vec::with_capacity(stages.len());
    for (i, stage) in stages.iter().enumerate() {
        tracing::info!("▶️ [{}/{}] {}", i + 1, stages.len(), stage.name());
        outputs.push(run_stage(*stage, storage.clone(), params, monitor_enabled)?);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::artifacts;
    use crate::app::pipelines::testing::MemoryStorage;
    use crate::utils::error::EtlError;

    #[test]
    fn test_params_checked_before_any_stage_runs() {
        let storage = MemoryStorage::default();
        let params = ParamsConfig::default();

        let err = run_stages(&Stage::ALL, &storage, &params, false).unwrap_err();
        assert!(matches!(err, EtlError::InvalidConfigError { .. }));
        assert!(storage.get_file(artifacts::RAW_TRAIN).is_none());
    }

    #[test]
    fn test_empty_output_dir_rejected_before_running() {
        let storage = MemoryStorage::default();
        let mut params = ParamsConfig::default();
        params.paths.output_dir = Some(String::new());

        let err = run_stages(&[Stage::Evaluation], &storage, &params, false).unwrap_err();
        match err {
            EtlError::InvalidConfigError { field, .. } => assert_eq!(field, "paths.output_dir"),
            other => panic!("expected InvalidConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_stage_names_match_pipelines() {
        assert_eq!(Stage::Ingestion.name(), "data_ingestion");
        assert!(Stage::Evaluation.check_params(&ParamsConfig::default()).is_ok());
    }
}
