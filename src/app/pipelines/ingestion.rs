use crate::app::pipelines::{artifacts, write_table};
use crate::config::params::IngestionSettings;
use crate::core::labels::{count_labels, encode_labels};
use crate::core::loader::load_corpus;
use crate::core::splitter::split_corpus;
use crate::core::temporal::filter_by_date;
use crate::core::{Partition, Pipeline, Storage, Table};
use crate::utils::error::{EtlError, Result};

/// 讀取兩個來源、過濾日期、編碼標籤後切成 train / test
pub struct IngestionPipeline<S: Storage> {
    storage: S,
    settings: IngestionSettings,
}

impl<S: Storage> IngestionPipeline<S> {
    pub fn new(storage: S, settings: IngestionSettings) -> Self {
        Self { storage, settings }
    }
}

impl<S: Storage> Pipeline for IngestionPipeline<S> {
    type Extracted = Table;
    type Transformed = Partition;

    fn name(&self) -> &str {
        "data_ingestion"
    }

    fn extract(&self) -> Result<Table> {
        tracing::debug!(
            "Reading sources fake={} true={}",
            self.settings.fake_source.display(),
            self.settings.true_source.display()
        );
        load_corpus(&self.settings.fake_source, &self.settings.true_source)
    }

    fn transform(&self, corpus: Table) -> Result<Partition> {
        let (filtered, report) = filter_by_date(corpus)?;
        if !report.skipped {
            tracing::info!(
                "Temporal filter kept {} records, dropped {}",
                report.kept,
                report.dropped
            );
        }
        if filtered.is_empty() {
            return Err(EtlError::EmptyCorpusError {
                source_name: "corpus after temporal filtering".to_string(),
            });
        }

        let (encoded, labels) = encode_labels(filtered)?;
        let [fake, real] = count_labels(&labels);
        tracing::info!("Label balance: {} fake / {} true", fake, real);

        split_corpus(&encoded, &labels, &self.settings.split)
    }

    fn load(&self, partition: Partition) -> Result<String> {
        write_table(&self.storage, artifacts::RAW_TRAIN, &partition.train)?;
        write_table(&self.storage, artifacts::RAW_TEST, &partition.test)?;
        Ok(self.storage.display_path(artifacts::RAW_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::MemoryStorage;
    use crate::core::splitter::SplitConfig;
    use crate::core::table_io::read_csv_bytes;
    use crate::core::etl::EtlEngine;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, name: &str, rows: &[(&str, &str, &str)]) -> std::path::PathBuf {
        let mut content = String::from("title,text,subject,date\n");
        for (title, text, date) in rows {
            content.push_str(&format!("\"{}\",\"{}\",news,\"{}\"\n", title, text, date));
        }
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn settings(dir: &TempDir) -> IngestionSettings {
        let fake_rows: Vec<(&str, &str, &str)> = (0..10)
            .map(|i| {
                if i == 9 {
                    ("Shocking claim", "you will not believe", "not a date")
                } else {
                    ("Shocking claim", "you will not believe", "December 31, 2017")
                }
            })
            .collect();
        let true_rows: Vec<(&str, &str, &str)> =
            (0..10).map(|_| ("Senate vote", "lawmakers met", "31/12/2017")).collect();

        IngestionSettings {
            fake_source: write_source(dir, "Fake.csv", &fake_rows),
            true_source: write_source(dir, "True.csv", &true_rows),
            split: SplitConfig {
                test_size: 0.2,
                seed: 33,
            },
        }
    }

    #[test]
    fn test_ingestion_writes_stratified_raw_split() {
        let dir = TempDir::new().unwrap();
        let storage = MemoryStorage::default();
        let engine = EtlEngine::new(IngestionPipeline::new(storage.clone(), settings(&dir)));

        let output = engine.run().unwrap();
        assert_eq!(output, "memory://data/raw");

        let train = read_csv_bytes("train", &storage.get_file(artifacts::RAW_TRAIN).unwrap()).unwrap();
        let test = read_csv_bytes("test", &storage.get_file(artifacts::RAW_TEST).unwrap()).unwrap();

        // 19 筆有效日期，ceil(0.2 * 19) = 4
        assert_eq!(train.len() + test.len(), 19);
        assert_eq!(test.len(), 4);

        let label = test.require_column("label").unwrap();
        let fakes = test.column_values(label).filter(|v| *v == "0").count();
        assert_eq!(fakes, 2);

        let date = train.require_column("date").unwrap();
        assert!(train.column_values(date).all(|d| d == "2017-12-31"));
    }

    #[test]
    fn test_missing_source_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings(&dir);
        settings.true_source = dir.path().join("absent.csv");
        let storage = MemoryStorage::default();

        let err = EtlEngine::new(IngestionPipeline::new(storage.clone(), settings))
            .run()
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingSourceError { .. }));
        assert!(storage.get_file(artifacts::RAW_TRAIN).is_none());
    }

    #[test]
    fn test_all_dates_unparseable_is_empty_corpus() {
        let dir = TempDir::new().unwrap();
        let junk = [("Title", "body text", "junk"); 5];
        let settings = IngestionSettings {
            fake_source: write_source(&dir, "Fake.csv", &junk),
            true_source: write_source(&dir, "True.csv", &junk),
            split: SplitConfig {
                test_size: 0.2,
                seed: 33,
            },
        };
        let storage = MemoryStorage::default();

        let err = EtlEngine::new(IngestionPipeline::new(storage.clone(), settings))
            .run()
            .unwrap_err();
        assert!(matches!(err, EtlError::EmptyCorpusError { .. }));
        assert!(storage.get_file(artifacts::RAW_TRAIN).is_none());
    }
}
