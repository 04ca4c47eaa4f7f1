use crate::domain::model::{Label, Table, LABEL_COLUMN};
use crate::utils::error::{EtlError, Result};

/// "fake" → 0, "true" → 1；回傳改寫後的表與對應標籤
pub fn encode_labels(table: Table) -> Result<(Table, Vec<Label>)> {
    let index = table.require_column(LABEL_COLUMN)?;

    let labels = table
        .column_values(index)
        .enumerate()
        .map(|(row, tag)| {
            Label::from_tag(tag).ok_or_else(|| EtlError::UnknownLabelError {
                row,
                value: tag.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let encoded = labels.iter().map(|l| l.as_binary().to_string()).collect();
    let table = table.with_column(LABEL_COLUMN, encoded)?;
    Ok((table, labels))
}

/// 讀回已編碼的 0/1 標籤欄
pub fn decode_labels(table: &Table) -> Result<Vec<Label>> {
    let index = table.require_column(LABEL_COLUMN)?;
    table
        .column_values(index)
        .enumerate()
        .map(|(row, value)| {
            Label::from_binary(value).ok_or_else(|| EtlError::UnknownLabelError {
                row,
                value: value.to_string(),
            })
        })
        .collect()
}

pub fn count_labels(labels: &[Label]) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for label in labels {
        counts[label.as_binary() as usize] += 1;
    }
    counts
}
