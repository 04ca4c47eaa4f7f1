use crate::app::pipelines::{artifacts, read_matrix, read_table, write_json};
use crate::core::classifier::{LogisticRegression, LogisticRegressionModel, LogisticRegressionParams};
use crate::core::labels::decode_labels;
use crate::core::sparse::CsrMatrix;
use crate::core::{Label, Pipeline, Storage};
use crate::utils::error::Result;

pub struct ModelBuildingPipeline<S: Storage> {
    storage: S,
    params: LogisticRegressionParams,
}

impl<S: Storage> ModelBuildingPipeline<S> {
    pub fn new(storage: S, params: LogisticRegressionParams) -> Self {
        Self { storage, params }
    }
}

impl<S: Storage> Pipeline for ModelBuildingPipeline<S> {
    type Extracted = (CsrMatrix, Vec<Label>);
    type Transformed = LogisticRegressionModel;

    fn name(&self) -> &str {
        "model_building"
    }

    fn extract(&self) -> Result<(CsrMatrix, Vec<Label>)> {
        let features = read_matrix(&self.storage, artifacts::TRAIN_MATRIX)?;
        let labels = decode_labels(&read_table(&self.storage, artifacts::RAW_TRAIN, "train")?)?;
        tracing::debug!(
            "Loaded {}x{} training matrix and {} labels",
            features.n_rows(),
            features.n_cols(),
            labels.len()
        );
        Ok((features, labels))
    }

    fn transform(&self, (features, labels): (CsrMatrix, Vec<Label>)) -> Result<LogisticRegressionModel> {
        tracing::info!(
            "Training logistic regression (random_state={}, max_iter={})",
            self.params.random_state,
            self.params.max_iter
        );
        LogisticRegression::new(self.params)?.fit(&features, &labels)
    }

    fn load(&self, model: LogisticRegressionModel) -> Result<String> {
        write_json(&self.storage, artifacts::MODEL, &model)?;
        Ok(self.storage.display_path(artifacts::MODEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::MemoryStorage;
    use crate::app::pipelines::{read_json, write_matrix};
    use crate::utils::error::EtlError;

    fn seeded_storage(rows: usize) -> MemoryStorage {
        let storage = MemoryStorage::default();
        let mut csv = String::from("title,label\n");
        let mut matrix_rows = Vec::new();
        for i in 0..rows {
            let label = i % 2;
            csv.push_str(&format!("t{},{}\n", i, label));
            matrix_rows.push(vec![(label, 2)]);
        }
        storage.put_file(artifacts::RAW_TRAIN, csv.as_bytes());
        write_matrix(&storage, artifacts::TRAIN_MATRIX, &CsrMatrix::from_sorted_rows(2, matrix_rows)).unwrap();
        storage
    }

    fn params() -> LogisticRegressionParams {
        LogisticRegressionParams {
            learning_rate: 0.5,
            batch_size: 4,
            ..LogisticRegressionParams::new(42, 100)
        }
    }

    #[test]
    fn test_trains_and_saves_model() {
        let storage = seeded_storage(12);
        let stage = ModelBuildingPipeline::new(storage.clone(), params());
        let model = stage.transform(stage.extract().unwrap()).unwrap();
        assert_eq!(model.n_features(), 2);
        assert!(model.coefficients[1] > model.coefficients[0]);

        assert_eq!(stage.load(model.clone()).unwrap(), "memory://models/model.json");
        let saved: LogisticRegressionModel = read_json(&storage, artifacts::MODEL).unwrap();
        assert_eq!(saved.coefficients.len(), model.coefficients.len());
    }

    #[test]
    fn test_label_count_must_match_rows() {
        let storage = seeded_storage(6);
        storage.put_file(artifacts::RAW_TRAIN, b"title,label\nt0,0\nt1,1\n");
        let stage = ModelBuildingPipeline::new(storage, params());
        let err = stage.transform(stage.extract().unwrap()).unwrap_err();
        assert!(matches!(err, EtlError::DimensionMismatchError { .. }));
    }
}
