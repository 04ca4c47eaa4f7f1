use crate::app::pipelines::{artifacts, read_table, write_matrix, write_table};
use crate::config::params::PreprocessingSettings;
use crate::core::normalizer::normalize_table;
use crate::core::sparse::CsrMatrix;
use crate::core::vectorizer::{transform, CountVectorizer, Vocabulary};
use crate::core::{Partition, Pipeline, Storage, Table};
use crate::utils::error::Result;

/// 清理後的兩個分割與對應的詞頻矩陣
#[derive(Debug)]
pub struct PreprocessedData {
    pub train: Table,
    pub test: Table,
    pub vocabulary: Vocabulary,
    pub train_matrix: CsrMatrix,
    pub test_matrix: CsrMatrix,
}

pub struct PreprocessingPipeline<S: Storage> {
    storage: S,
    settings: PreprocessingSettings,
}

impl<S: Storage> PreprocessingPipeline<S> {
    pub fn new(storage: S, settings: PreprocessingSettings) -> Self {
        Self { storage, settings }
    }
}

impl<S: Storage> Pipeline for PreprocessingPipeline<S> {
    type Extracted = Partition;
    type Transformed = PreprocessedData;

    fn name(&self) -> &str {
        "data_preprocessing"
    }

    fn extract(&self) -> Result<Partition> {
        Ok(Partition {
            train: read_table(&self.storage, artifacts::RAW_TRAIN, "train")?,
            test: read_table(&self.storage, artifacts::RAW_TEST, "test")?,
        })
    }

    fn transform(&self, partition: Partition) -> Result<PreprocessedData> {
        let vectorizer = CountVectorizer::new(self.settings.max_features, self.settings.min_df)?;

        let (train, train_columns) = normalize_table(partition.train)?;
        let (test, test_columns) = normalize_table(partition.test)?;

        // 詞彙表只由訓練資料學得，測試資料沿用同一份
        let (vocabulary, train_matrix) = {
            let documents: Vec<&str> = train.column_values(train_columns.combined).collect();
            vectorizer.fit_transform(&documents)?
        };
        let test_matrix = {
            let documents: Vec<&str> = test.column_values(test_columns.combined).collect();
            transform(&documents, &vocabulary)
        };

        tracing::info!(
            "Vectorized {} train / {} test documents over {} terms",
            train_matrix.n_rows(),
            test_matrix.n_rows(),
            vocabulary.len()
        );

        Ok(PreprocessedData {
            train,
            test,
            vocabulary,
            train_matrix,
            test_matrix,
        })
    }

    fn load(&self, data: PreprocessedData) -> Result<String> {
        write_table(&self.storage, artifacts::PROCESSED_TRAIN_TEXT, &data.train)?;
        write_table(&self.storage, artifacts::PROCESSED_TEST_TEXT, &data.test)?;
        write_matrix(&self.storage, artifacts::TRAIN_MATRIX, &data.train_matrix)?;
        write_matrix(&self.storage, artifacts::TEST_MATRIX, &data.test_matrix)?;
        Ok(self.storage.display_path(artifacts::PROCESSED_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::MemoryStorage;
    use crate::app::pipelines::read_matrix;
    use crate::core::table_io::read_csv_bytes;
    use crate::utils::error::EtlError;

    const RAW_TRAIN: &str = "title,text,date,label\n\
        Market rally,Stocks rally on <b>strong</b> earnings,2017-12-31,1\n\
        Market dip,Stocks fall as market rally cools,2017-12-30,1\n\
        Aliens land,Aliens land near the market http://x.co,2017-12-29,0\n\
        Aliens again,Aliens land again!!,2017-12-28,0\n";
    const RAW_TEST: &str = "title,text,date,label\n\
        Crypto surge,Unseen crypto words market,2017-12-27,1\n";

    fn seeded_storage() -> MemoryStorage {
        let storage = MemoryStorage::default();
        storage.put_file(artifacts::RAW_TRAIN, RAW_TRAIN.as_bytes());
        storage.put_file(artifacts::RAW_TEST, RAW_TEST.as_bytes());
        storage
    }

    fn pipeline(storage: MemoryStorage) -> PreprocessingPipeline<MemoryStorage> {
        PreprocessingPipeline::new(
            storage,
            PreprocessingSettings {
                max_features: 500,
                min_df: 2,
            },
        )
    }

    #[test]
    fn test_vocabulary_comes_from_train_only() {
        let storage = seeded_storage();
        let stage = pipeline(storage.clone());
        let data = stage.transform(stage.extract().unwrap()).unwrap();

        assert_eq!(data.vocabulary.terms(), &["aliens", "land", "market", "rally", "stocks"]);
        assert!(!data.vocabulary.contains("crypto"));
        assert_eq!(data.train_matrix.shape(), (4, 5));
        assert_eq!(data.test_matrix.shape(), (1, 5));
        // 測試列只剩 "market" 在詞彙表內
        assert_eq!(data.test_matrix.nnz(), 1);
    }

    #[test]
    fn test_load_writes_text_and_matrices() {
        let storage = seeded_storage();
        let stage = pipeline(storage.clone());
        let data = stage.transform(stage.extract().unwrap()).unwrap();
        let expected = data.train_matrix.clone();
        assert_eq!(stage.load(data).unwrap(), "memory://data/processed");

        let text = read_csv_bytes(
            "train",
            &storage.get_file(artifacts::PROCESSED_TRAIN_TEXT).unwrap(),
        )
        .unwrap();
        let combined = text.require_column("combined_text").unwrap();
        assert_eq!(
            text.column_values(combined).next(),
            Some("market rally stocks rally strong earnings")
        );
        assert_eq!(read_matrix(&storage, artifacts::TRAIN_MATRIX).unwrap(), expected);
        assert!(storage.get_file(artifacts::PROCESSED_TEST_TEXT).is_some());
    }

    #[test]
    fn test_missing_body_column() {
        let storage = MemoryStorage::default();
        storage.put_file(artifacts::RAW_TRAIN, b"title,label\nA,1\n");
        storage.put_file(artifacts::RAW_TEST, b"title,label\nB,0\n");
        let stage = pipeline(storage);
        let err = stage.transform(stage.extract().unwrap()).unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { .. }));
    }

    #[test]
    fn test_missing_raw_split() {
        let stage = pipeline(MemoryStorage::default());
        assert!(matches!(
            stage.extract().unwrap_err(),
            EtlError::MissingSourceError { .. }
        ));
    }
}
