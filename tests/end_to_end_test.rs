mod common;

use fakenews_etl::app::pipelines::artifacts;
use fakenews_etl::{run_stages, LocalStorage, Stage};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_all_stages_write_every_artifact() -> anyhow::Result<()> {
    let corpus = TempDir::new()?;
    let output = TempDir::new()?;
    let params = common::params_for(corpus.path(), output.path());
    let storage = LocalStorage::new(output.path());

    let outputs = run_stages(&Stage::ALL, &storage, &params, false)?;
    assert_eq!(outputs.len(), 4);

    for artifact in [
        artifacts::RAW_TRAIN,
        artifacts::RAW_TEST,
        artifacts::PROCESSED_TRAIN_TEXT,
        artifacts::PROCESSED_TEST_TEXT,
        artifacts::TRAIN_MATRIX,
        artifacts::TEST_MATRIX,
        artifacts::MODEL,
        artifacts::METRICS,
    ] {
        assert!(output.path().join(artifact).is_file(), "missing {}", artifact);
    }

    let metrics: serde_json::Value =
        serde_json::from_slice(&fs::read(output.path().join(artifacts::METRICS))?)?;
    for key in [
        "accuracy",
        "macro_avg_precision",
        "macro_avg_recall",
        "macro_avg_f1-score",
        "weighted_avg_f1-score",
    ] {
        let value = metrics[key].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&value), "{} = {}", key, value);
    }
    // 兩類詞彙完全分開，模型應能全部分對
    assert!(metrics["accuracy"].as_f64().unwrap() > 0.9);
    Ok(())
}

#[test]
fn test_missing_model_params_fail_before_any_output() {
    let corpus = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let mut params = common::params_for(corpus.path(), output.path());
    params.modelbuilding.max_iter = None;

    let storage = LocalStorage::new(output.path());
    assert!(run_stages(&Stage::ALL, &storage, &params, false).is_err());
    assert!(!output.path().join(artifacts::RAW_TRAIN).exists());
}

#[test]
fn test_invalid_config_creates_no_output_directory() {
    let corpus = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let output_dir = root.path().join("run");
    let mut params = common::params_for(corpus.path(), &output_dir);
    params.dataingestion.test_size = Some(1.5);

    let storage = LocalStorage::new(params.output_dir());
    assert!(run_stages(&Stage::ALL, &storage, &params, false).is_err());
    assert!(!output_dir.exists());
}
