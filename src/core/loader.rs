use crate::core::table_io;
use crate::domain::model::{Label, Table, LABEL_COLUMN};
use crate::utils::error::{EtlError, Result};
use std::fs::File;
use std::path::Path;

/// 讀取單一來源並蓋上固定標籤
pub fn load_source(path: &Path, label: Label) -> Result<Table> {
    if !path.is_file() {
        return Err(EtlError::MissingSourceError {
            path: path.display().to_string(),
        });
    }

    let source_name = format!("{} corpus ({})", label.tag(), path.display());
    let table = {
        let file = File::open(path)?;
        table_io::read_csv(&source_name, file)?
    };

    let usable: Vec<usize> = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_usable())
        .map(|(i, _)| i)
        .collect();

    if usable.is_empty() {
        return Err(EtlError::EmptyCorpusError { source_name });
    }
    if usable.len() < table.len() {
        tracing::debug!(
            "Skipping {} blank rows in {}",
            table.len() - usable.len(),
            source_name
        );
    }

    let table = table.select(source_name, &usable);
    let tags = vec![label.tag().to_string(); table.len()];
    table.with_column(LABEL_COLUMN, tags)
}

/// 合併兩個來源；true 在前、fake 在後
pub fn load_corpus(fake_path: &Path, true_path: &Path) -> Result<Table> {
    let fake_news = load_source(fake_path, Label::Fake)?;
    let true_news = load_source(true_path, Label::True)?;

    tracing::info!(
        "Loaded {} fake and {} true articles",
        fake_news.len(),
        true_news.len()
    );

    Ok(true_news.concat(fake_news, "corpus"))
}
