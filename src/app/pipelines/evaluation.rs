use crate::app::pipelines::{artifacts, read_json, read_matrix, read_table, write_json};
use crate::core::classifier::LogisticRegressionModel;
use crate::core::labels::decode_labels;
use crate::core::metrics::{classification_report, ClassificationReport};
use crate::core::sparse::CsrMatrix;
use crate::core::{Label, Pipeline, Storage};
use crate::utils::error::Result;

pub struct EvaluationInput {
    pub model: LogisticRegressionModel,
    pub features: CsrMatrix,
    pub labels: Vec<Label>,
}

pub struct EvaluationPipeline<S: Storage> {
    storage: S,
}

impl<S: Storage> EvaluationPipeline<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: Storage> Pipeline for EvaluationPipeline<S> {
    type Extracted = EvaluationInput;
    type Transformed = ClassificationReport;

    fn name(&self) -> &str {
        "model_evaluation"
    }

    fn extract(&self) -> Result<EvaluationInput> {
        Ok(EvaluationInput {
            model: read_json(&self.storage, artifacts::MODEL)?,
            features: read_matrix(&self.storage, artifacts::TEST_MATRIX)?,
            labels: decode_labels(&read_table(&self.storage, artifacts::RAW_TEST, "test")?)?,
        })
    }

    fn transform(&self, input: EvaluationInput) -> Result<ClassificationReport> {
        let predictions = input.model.predict(&input.features)?;
        let report = classification_report(&input.labels, &predictions)?;

        tracing::info!("Model accuracy: {:.4}", report.accuracy);
        for line in report.to_string().lines() {
            tracing::info!("{}", line);
        }
        Ok(report)
    }

    fn load(&self, report: ClassificationReport) -> Result<String> {
        write_json(&self.storage, artifacts::METRICS, &report.to_eval_metrics())?;
        Ok(self.storage.display_path(artifacts::METRICS))
    }
}
