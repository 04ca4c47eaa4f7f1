use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};

pub const TITLE_COLUMN: &str = "title";
/// 內文欄位名稱，依序嘗試
pub const BODY_COLUMNS: &[&str] = &["text", "body"];
pub const DATE_COLUMN: &str = "date";
pub const LABEL_COLUMN: &str = "label";
pub const COMBINED_TEXT_COLUMN: &str = "combined_text";

/// 二元標籤：0 = fake, 1 = true
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Fake,
    True,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Fake, Label::True];

    pub fn tag(self) -> &'static str {
        match self {
            Label::Fake => "fake",
            Label::True => "true",
        }
    }

    pub fn as_binary(self) -> u8 {
        match self {
            Label::Fake => 0,
            Label::True => 1,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "fake" => Some(Label::Fake),
            "true" => Some(Label::True),
            _ => None,
        }
    }

    pub fn from_binary(value: &str) -> Option<Self> {
        match value.trim() {
            "0" => Some(Label::Fake),
            "1" => Some(Label::True),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub values: Vec<String>,
}

impl Record {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    /// 至少有一個非空白欄位
    pub fn is_usable(&self) -> bool {
        self.values.iter().any(|v| !v.trim().is_empty())
    }
}

/// 有序欄位 + 有序資料列，列的身分即其位置
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| EtlError::MissingColumnError {
                column: column.to_string(),
                table: self.name.clone(),
            })
    }

    /// 第一個存在的候選欄位
    pub fn require_any_column(&self, candidates: &[&str]) -> Result<usize> {
        candidates
            .iter()
            .find_map(|c| self.column_index(c))
            .ok_or_else(|| EtlError::MissingColumnError {
                column: candidates.join("|"),
                table: self.name.clone(),
            })
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.records.iter().map(move |r| r.get(index))
    }

    pub fn push_record(&mut self, mut record: Record) {
        record.values.resize(self.columns.len(), String::new());
        self.records.push(record);
    }

    /// 以整欄取代或新增一欄，長度必須與列數相同
    pub fn with_column(mut self, column: &str, values: Vec<String>) -> Result<Self> {
        if values.len() != self.records.len() {
            return Err(EtlError::DimensionMismatchError {
                context: format!("column '{}' of {}", column, self.name),
                expected: self.records.len(),
                got: values.len(),
            });
        }

        let index = match self.column_index(column) {
            Some(index) => index,
            None => {
                self.columns.push(column.to_string());
                for record in &mut self.records {
                    record.values.push(String::new());
                }
                self.columns.len() - 1
            }
        };

        for (record, value) in self.records.iter_mut().zip(values) {
            record.values[index] = value;
        }
        Ok(self)
    }

    /// 依索引挑出列，保持給定順序
    pub fn select(&self, name: impl Into<String>, indices: &[usize]) -> Self {
        Self {
            name: name.into(),
            columns: self.columns.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// 串接兩張表，欄位取有序聯集，缺值補空字串
    pub fn concat(self, other: Table, name: impl Into<String>) -> Self {
        let mut columns = self.columns.clone();
        for column in &other.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }

        let mut combined = Table::new(name, columns);
        for part in [self, other] {
            let mapping: Vec<Option<usize>> = combined
                .columns
                .iter()
                .map(|c| part.column_index(c))
                .collect();
            for record in part.records {
                let values = mapping
                    .iter()
                    .map(|m| m.map(|i| record.get(i).to_string()).unwrap_or_default())
                    .collect();
                combined.records.push(Record::new(values));
            }
        }
        combined
    }
}

/// 分層抽樣後的 train/test 兩份資料
#[derive(Debug, Clone)]
pub struct Partition {
    pub train: Table,
    pub test: Table,
}
