use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source file not found: {path}")]
    MissingSourceError { path: String },

    #[error("Corpus '{source_name}' contains no usable rows")]
    EmptyCorpusError { source_name: String },

    #[error("Vocabulary is empty: no token appears in at least {min_df} of {documents} training documents")]
    EmptyVocabularyError { min_df: usize, documents: usize },

    #[error("Unknown label '{value}' at row {row}")]
    UnknownLabelError { row: usize, value: String },

    #[error("Invalid configuration for '{field}' (value: {value}): {reason}")]
    InvalidConfigError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Required column '{column}' is missing from {table}")]
    MissingColumnError { column: String, table: String },

    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatchError {
        context: String,
        expected: usize,
        got: usize,
    },

    #[error("Malformed sparse matrix archive: {message}")]
    MatrixFormatError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 錯誤分類，用於日誌與 CLI 輸出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    DataIntegrity,
    Storage,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 失敗一律回傳非零結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn invalid_config(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        EtlError::InvalidConfigError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn matrix_format(message: impl Into<String>) -> Self {
        EtlError::MatrixFormatError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::InvalidConfigError { .. } => ErrorCategory::Configuration,
            EtlError::MissingSourceError { .. }
            | EtlError::EmptyCorpusError { .. }
            | EtlError::MissingColumnError { .. } => ErrorCategory::Input,
            EtlError::UnknownLabelError { .. } | EtlError::MatrixFormatError { .. } => {
                ErrorCategory::DataIntegrity
            }
            EtlError::EmptyVocabularyError { .. } | EtlError::DimensionMismatchError { .. } => {
                ErrorCategory::Model
            }
            EtlError::ZipError(_)
            | EtlError::CsvError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration
            | ErrorCategory::Input
            | ErrorCategory::DataIntegrity
            | ErrorCategory::Model => ErrorSeverity::High,
            ErrorCategory::Storage => match self {
                // 權限或磁碟問題通常可在修正環境後重跑
                EtlError::IoError(_) => ErrorSeverity::Medium,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingSourceError { path } => {
                format!("Input file '{}' does not exist", path)
            }
            EtlError::EmptyCorpusError { source_name } => {
                format!("No usable rows were found in {}", source_name)
            }
            EtlError::EmptyVocabularyError { min_df, .. } => format!(
                "No token survived the min_df={} filter; nothing to vectorize",
                min_df
            ),
            EtlError::UnknownLabelError { row, value } => {
                format!("Row {} carries an unexpected label '{}'", row, value)
            }
            EtlError::InvalidConfigError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            EtlError::MissingColumnError { column, table } => {
                format!("Column '{}' is required in {}", column, table)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check params.toml and command line overrides, then rerun the stage"
            }
            ErrorCategory::Input => {
                "Verify the source CSV paths and that each file has title, text and date columns"
            }
            ErrorCategory::DataIntegrity => {
                "Regenerate the artifacts by rerunning the earlier pipeline stages"
            }
            ErrorCategory::Model => {
                "Lower preprocessing.min_df or provide more training documents"
            }
            ErrorCategory::Storage => {
                "Make sure the output directory is writable and the previous stage completed"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = EtlError::invalid_config("dataingestion.test_size", 1.5, "out of range");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("dataingestion.test_size"));
    }

    #[test]
    fn test_io_errors_are_retryable() {
        let err = EtlError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_every_failure_exits_non_zero() {
        let errors = [
            EtlError::invalid_config("modelbuilding.max_iter", "<missing>", "required"),
            EtlError::from(std::io::Error::other("disk full")),
            EtlError::matrix_format("bad header"),
            EtlError::from(zip::result::ZipError::FileNotFound),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.severity().exit_code()).collect();
        assert_eq!(codes, vec![1, 2, 1, 3]);
    }
}
