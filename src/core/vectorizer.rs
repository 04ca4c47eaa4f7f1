use crate::core::sparse::CsrMatrix;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_positive_number;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 由訓練資料學得的固定詞彙表；只能由 [`CountVectorizer::fit`] 建立
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn column_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }
}

/// Bag-of-words 計數向量化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountVectorizer {
    max_features: usize,
    min_df: usize,
}

impl CountVectorizer {
    pub fn new(max_features: usize, min_df: usize) -> Result<Self> {
        validate_positive_number("preprocessing.max_features", max_features, 1)?;
        validate_positive_number("preprocessing.min_df", min_df, 1)?;
        Ok(Self {
            max_features,
            min_df,
        })
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn min_df(&self) -> usize {
        self.min_df
    }

    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vocabulary> {
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut term_frequency: HashMap<&str, usize> = HashMap::new();

        for document in documents {
            let mut seen = HashSet::new();
            for token in document.as_ref().split_whitespace() {
                *term_frequency.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *document_frequency.entry(token).or_insert(0) += 1;
                }
            }
        }

        let mut candidates: Vec<(&str, usize)> = term_frequency
            .into_iter()
            .filter(|(term, _)| document_frequency.get(term).copied().unwrap_or(0) >= self.min_df)
            .collect();

        if candidates.is_empty() {
            return Err(EtlError::EmptyVocabularyError {
                min_df: self.min_df,
                documents: documents.len(),
            });
        }

        // 總詞頻遞減，同分依字典序
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let surviving = candidates.len();
        candidates.truncate(self.max_features);

        let mut terms: Vec<String> = candidates.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        tracing::info!(
            "Fitted vocabulary: {} terms kept of {} passing min_df={} ({} documents)",
            terms.len(),
            surviving,
            self.min_df,
            documents.len()
        );

        Ok(Vocabulary { terms, index })
    }

    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<(Vocabulary, CsrMatrix)> {
        let vocabulary = self.fit(documents)?;
        let matrix = transform(documents, &vocabulary);
        Ok((vocabulary, matrix))
    }
}

/// 依既有詞彙表計數；詞彙表外的 token 直接忽略
pub fn transform<S: AsRef<str>>(documents: &[S], vocabulary: &Vocabulary) -> CsrMatrix {
    let rows = documents.iter().map(|document| {
        let mut counts: BTreeMap<usize, i64> = BTreeMap::new();
        for token in document.as_ref().split_whitespace() {
            if let Some(column) = vocabulary.column_of(token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect::<Vec<_>>()
    });

    CsrMatrix::from_sorted_rows(vocabulary.len(), rows)
}
