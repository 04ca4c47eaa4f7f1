use crate::domain::model::{Record, Table};
use crate::utils::error::{EtlError, Result};
use std::io::Read;

/// 讀取含標題列的 CSV；欄數不足的列補空字串
pub fn read_csv<R: Read>(name: &str, reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(name, columns);

    for row in csv_reader.records() {
        let row = row?;
        let mut values: Vec<String> = row.iter().map(str::to_string).collect();
        values.truncate(table.columns.len());
        table.push_record(Record::new(values));
    }

    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        name
    );
    Ok(table)
}

pub fn read_csv_bytes(name: &str, data: &[u8]) -> Result<Table> {
    read_csv(name, data)
}

pub fn write_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for record in &table.records {
        writer.write_record(&record.values)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_multiline_fields_survive() {
        let data = "title,text,date\n\"Hello, world\",\"line one\nline two\",\"December 31, 2017 \"\n";
        let table = read_csv_bytes("fixture", data.as_bytes()).unwrap();

        assert_eq!(table.columns, vec!["title", "text", "date"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].get(1), "line one\nline two");

        let written = write_csv_bytes(&table).unwrap();
        let again = read_csv_bytes("again", &written).unwrap();
        assert_eq!(again.records, table.records);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = "title,text,date\nonly title\n";
        let table = read_csv_bytes("fixture", data.as_bytes()).unwrap();
        assert_eq!(table.records[0].values, vec!["only title", "", ""]);
    }
}
