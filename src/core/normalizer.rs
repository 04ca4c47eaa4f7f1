//! Text cleaning shared by the train and test partitions.
//!
//! `normalize` is pure and idempotent: running it on its own output returns the same string.

use crate::domain::model::{Table, BODY_COLUMNS, COMBINED_TEXT_COLUMN, TITLE_COLUMN};
use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// HTML 標籤、URL、email，一次比對；不分大小寫
static MARKUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<.*?>|http\S+|www\.\S+|\S+@\S+").expect("markup pattern is valid")
});

/// 去標點後可能重新拼出的 http 片段
static RESIDUAL_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)http\S+").expect("residual url pattern is valid"));

/// NLTK English stopword list
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = MARKUP_PATTERN.replace_all(&lowered, "");

    // ASCII 空白保留作為分隔，其餘非可列印 ASCII 與標點一律移除
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .filter(|c| c.is_ascii_whitespace() || (' '..='~').contains(c))
        .collect();
    let cleaned = RESIDUAL_URL_PATTERN.replace_all(&cleaned, "");

    cleaned
        .split_ascii_whitespace()
        .filter(|token| !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedColumns {
    pub title: usize,
    pub body: usize,
    pub combined: usize,
}

/// 清理 title 與內文欄位，並新增 combined_text
pub fn normalize_table(table: Table) -> Result<(Table, NormalizedColumns)> {
    let title = table.require_column(TITLE_COLUMN)?;
    let body = table.require_any_column(BODY_COLUMNS)?;
    let title_name = table.columns[title].clone();
    let body_name = table.columns[body].clone();

    let titles: Vec<String> = table.column_values(title).map(normalize).collect();
    let bodies: Vec<String> = table.column_values(body).map(normalize).collect();
    let combined: Vec<String> = titles
        .iter()
        .zip(&bodies)
        .map(|(t, b)| format!("{} {}", t, b))
        .collect();

    let table = table
        .with_column(&title_name, titles)?
        .with_column(&body_name, bodies)?
        .with_column(COMBINED_TEXT_COLUMN, combined)?;
    let combined = table.require_column(COMBINED_TEXT_COLUMN)?;

    tracing::debug!("Normalized {} records of {}", table.len(), table.name);
    Ok((
        table,
        NormalizedColumns {
            title,
            body,
            combined,
        },
    ))
}
