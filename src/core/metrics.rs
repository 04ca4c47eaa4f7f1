use crate::domain::model::Label;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<(Label, ClassMetrics)>,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// 寫入 metrics/eval_metrics.json 的扁平欄位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub accuracy: f64,
    pub macro_avg_precision: f64,
    pub macro_avg_recall: f64,
    #[serde(rename = "macro_avg_f1-score")]
    pub macro_avg_f1_score: f64,
    #[serde(rename = "weighted_avg_f1-score")]
    pub weighted_avg_f1_score: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// 只統計實際出現在 y_true 或 y_pred 的類別；分母為零時記為 0
pub fn classification_report(y_true: &[Label], y_pred: &[Label]) -> Result<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        return Err(EtlError::DimensionMismatchError {
            context: "predictions".to_string(),
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EtlError::EmptyCorpusError {
            source_name: "evaluation set".to_string(),
        });
    }

    let classes: BTreeSet<Label> = y_true.iter().chain(y_pred).copied().collect();
    let per_class: Vec<(Label, ClassMetrics)> = classes
        .into_iter()
        .map(|class| {
            let mut true_positive = 0;
            let mut predicted = 0;
            let mut actual = 0;
            for (&t, &p) in y_true.iter().zip(y_pred) {
                if p == class {
                    predicted += 1;
                }
                if t == class {
                    actual += 1;
                    if p == class {
                        true_positive += 1;
                    }
                }
            }
            let precision = ratio(true_positive, predicted);
            let recall = ratio(true_positive, actual);
            (
                class,
                ClassMetrics {
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support: actual,
                },
            )
        })
        .collect();

    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    let total = y_true.len();
    let n_classes = per_class.len() as f64;

    let average = |weight: &dyn Fn(&ClassMetrics) -> f64, denominator: f64| ClassMetrics {
        precision: per_class.iter().map(|(_, m)| weight(m) * m.precision).sum::<f64>() / denominator,
        recall: per_class.iter().map(|(_, m)| weight(m) * m.recall).sum::<f64>() / denominator,
        f1_score: per_class.iter().map(|(_, m)| weight(m) * m.f1_score).sum::<f64>() / denominator,
        support: total,
    };
    let macro_avg = average(&|_: &ClassMetrics| 1.0, n_classes);
    let weighted_avg = average(&|m: &ClassMetrics| m.support as f64, total as f64);

    Ok(ClassificationReport {
        accuracy: ratio(correct, total),
        per_class,
        macro_avg,
        weighted_avg,
    })
}

impl ClassificationReport {
    pub fn to_eval_metrics(&self) -> EvalMetrics {
        EvalMetrics {
            accuracy: self.accuracy,
            macro_avg_precision: self.macro_avg.precision,
            macro_avg_recall: self.macro_avg.recall,
            macro_avg_f1_score: self.macro_avg.f1_score,
            weighted_avg_f1_score: self.weighted_avg.f1_score,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (label, m) in &self.per_class {
            writeln!(
                f,
                "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                format!("{} ({})", label.as_binary(), label.tag()),
                m.precision,
                m.recall,
                m.f1_score,
                m.support
            )?;
        }
        let total = self.macro_avg.support;
        writeln!(f, "{:>14} {:>10} {:>10} {:>10.4} {:>10}", "accuracy", "", "", self.accuracy, total)?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    }
}
