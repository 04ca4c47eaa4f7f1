pub mod evaluation;
pub mod ingestion;
pub mod model_building;
pub mod preprocessing;

pub use evaluation::EvaluationPipeline;
pub use ingestion::IngestionPipeline;
pub use model_building::ModelBuildingPipeline;
pub use preprocessing::PreprocessingPipeline;

use crate::core::sparse::CsrMatrix;
use crate::core::table_io;
use crate::domain::model::Table;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

/// 各 stage 產物的相對路徑（相對於 output_dir）
pub mod artifacts {
    pub const RAW_DIR: &str = "data/raw";
    pub const RAW_TRAIN: &str = "data/raw/train.csv";
    pub const RAW_TEST: &str = "data/raw/test.csv";
    pub const PROCESSED_DIR: &str = "data/processed";
    pub const PROCESSED_TRAIN_TEXT: &str = "data/processed/train_processed_text.csv";
    pub const PROCESSED_TEST_TEXT: &str = "data/processed/test_processed_text.csv";
    pub const TRAIN_MATRIX: &str = "data/processed/train_vectorized.npz";
    pub const TEST_MATRIX: &str = "data/processed/test_vectorized.npz";
    pub const MODEL: &str = "models/model.json";
    pub const METRICS: &str = "metrics/eval_metrics.json";
}

fn read_artifact<S: Storage>(storage: &S, path: &str) -> Result<Vec<u8>> {
    if !storage.exists(path) {
        return Err(EtlError::MissingSourceError {
            path: storage.display_path(path),
        });
    }
    storage.read_file(path)
}

pub(crate) fn read_table<S: Storage>(storage: &S, path: &str, name: &str) -> Result<Table> {
    table_io::read_csv_bytes(name, &read_artifact(storage, path)?)
}

pub(crate) fn write_table<S: Storage>(storage: &S, path: &str, table: &Table) -> Result<()> {
    storage.write_file(path, &table_io::write_csv_bytes(table)?)?;
    tracing::info!("💾 Wrote {} rows to {}", table.len(), storage.display_path(path));
    Ok(())
}

pub(crate) fn read_matrix<S: Storage>(storage: &S, path: &str) -> Result<CsrMatrix> {
    CsrMatrix::from_npz_bytes(&read_artifact(storage, path)?)
}

pub(crate) fn write_matrix<S: Storage>(storage: &S, path: &str, matrix: &CsrMatrix) -> Result<()> {
    storage.write_file(path, &matrix.to_npz_bytes()?)?;
    tracing::info!(
        "💾 Wrote {}x{} matrix ({} non-zero) to {}",
        matrix.n_rows(),
        matrix.n_cols(),
        matrix.nnz(),
        storage.display_path(path)
    );
    Ok(())
}

pub(crate) fn read_json<S: Storage, T: serde::de::DeserializeOwned>(
    storage: &S,
    path: &str,
) -> Result<T> {
    Ok(serde_json::from_slice(&read_artifact(storage, path)?)?)
}

/// 四格縮排，與 json.dump(indent=4) 一致
pub(crate) fn write_json<S: Storage, T: Serialize>(storage: &S, path: &str, value: &T) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    storage.write_file(path, &buffer)
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStorage;
    use super::*;

    #[test]
    fn test_missing_artifact_reports_path() {
        let storage = MemoryStorage::default();
        let err = read_table(&storage, artifacts::RAW_TRAIN, "train").unwrap_err();
        match err {
            EtlError::MissingSourceError { path } => assert_eq!(path, "memory://data/raw/train.csv"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let storage = MemoryStorage::default();
        write_json(&storage, artifacts::METRICS, &serde_json::json!({"accuracy": 1.0})).unwrap();
        let text = String::from_utf8(storage.get_file(artifacts::METRICS).unwrap()).unwrap();
        assert_eq!(text, "{\n    \"accuracy\": 1.0\n}");
    }
}
