//! Binary logistic regression over sparse term-count features.
//!
//! Trained with mini-batch gradient descent and an L2 penalty whose strength follows the usual
//! inverse-regularization parameter `C` (penalty `||w||² / (2·C·n)` per sample).

use crate::core::sparse::CsrMatrix;
use crate::domain::model::Label;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_positive_number, validate_range};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    pub random_state: u64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// 正則化強度倒數，越小懲罰越強
    pub c: f64,
    pub tol: f64,
}

impl LogisticRegressionParams {
    pub fn new(random_state: u64, max_iter: usize) -> Self {
        Self {
            random_state,
            max_iter,
            learning_rate: 0.01,
            batch_size: 64,
            c: 1.0,
            tol: 1e-4,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_positive_number("modelbuilding.max_iter", self.max_iter, 1)?;
        validate_positive_number("modelbuilding.batch_size", self.batch_size, 1)?;
        for (field, value) in [
            ("modelbuilding.learning_rate", self.learning_rate),
            ("modelbuilding.c", self.c),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EtlError::invalid_config(field, value, "Value must be positive"));
            }
        }
        if self.tol.is_nan() {
            return Err(EtlError::invalid_config("modelbuilding.tol", self.tol, "Value must be a number"));
        }
        validate_range("modelbuilding.tol", self.tol, 0.0, 1.0)
    }
}

/// 訓練完成、可序列化的模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub params: LogisticRegressionParams,
    pub n_iter: usize,
    pub converged: bool,
    pub final_loss: f64,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

fn target(label: Label) -> f64 {
    f64::from(label.as_binary())
}

fn row_dot(x: &CsrMatrix, row: usize, weights: &[f64]) -> f64 {
    x.row(row).map(|(c, v)| weights[c] * v as f64).sum()
}

pub struct LogisticRegression {
    params: LogisticRegressionParams,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn fit(&self, x: &CsrMatrix, y: &[Label]) -> Result<LogisticRegressionModel> {
        if x.n_rows() != y.len() {
            return Err(EtlError::DimensionMismatchError {
                context: "training labels".to_string(),
                expected: x.n_rows(),
                got: y.len(),
            });
        }
        if x.n_rows() == 0 {
            return Err(EtlError::EmptyCorpusError {
                source_name: "training matrix".to_string(),
            });
        }

        let p = &self.params;
        let n_samples = x.n_rows();
        let alpha = 1.0 / (p.c * n_samples as f64);
        let mut weights = vec![0.0; x.n_cols()];
        let mut bias = 0.0;
        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut rng = StdRng::seed_from_u64(p.random_state);

        let mut previous_loss = f64::INFINITY;
        let mut loss = log_loss(x, y, &weights, bias, alpha);
        let mut n_iter = 0;
        let mut converged = false;

        for epoch in 1..=p.max_iter {
            order.shuffle(&mut rng);

            for batch in order.chunks(p.batch_size) {
                let mut grad_w = vec![0.0; weights.len()];
                let mut grad_b = 0.0;
                for &row in batch {
                    let error = sigmoid(row_dot(x, row, &weights) + bias) - target(y[row]);
                    for (c, v) in x.row(row) {
                        grad_w[c] += error * v as f64;
                    }
                    grad_b += error;
                }

                let m = batch.len() as f64;
                for (w, g) in weights.iter_mut().zip(&grad_w) {
                    *w -= p.learning_rate * (g / m + alpha * *w);
                }
                bias -= p.learning_rate * grad_b / m;
            }

            previous_loss = std::mem::replace(&mut loss, log_loss(x, y, &weights, bias, alpha));
            n_iter = epoch;
            tracing::trace!("epoch {} loss {:.6}", epoch, loss);

            if (previous_loss - loss).abs() < p.tol {
                converged = true;
                break;
            }
        }

        if converged {
            tracing::info!("Converged after {} epochs (loss {:.6})", n_iter, loss);
        } else {
            tracing::warn!(
                "⚠️ Did not converge within max_iter={} (last loss change {:.2e})",
                p.max_iter,
                (previous_loss - loss).abs()
            );
        }

        Ok(LogisticRegressionModel {
            coefficients: weights,
            intercept: bias,
            params: *p,
            n_iter,
            converged,
            final_loss: loss,
        })
    }
}

/// 平均 log loss 加上 L2 項
fn log_loss(x: &CsrMatrix, y: &[Label], weights: &[f64], bias: f64, alpha: f64) -> f64 {
    let eps = 1e-15;
    let data_loss: f64 = (0..x.n_rows())
        .map(|row| {
            let prob = sigmoid(row_dot(x, row, weights) + bias).clamp(eps, 1.0 - eps);
            let t = target(y[row]);
            -(t * prob.ln() + (1.0 - t) * (1.0 - prob).ln())
        })
        .sum::<f64>()
        / x.n_rows() as f64;
    let penalty: f64 = weights.iter().map(|w| w * w).sum::<f64>() * alpha / 2.0;
    data_loss + penalty
}

impl LogisticRegressionModel {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn check_width(&self, x: &CsrMatrix) -> Result<()> {
        if x.n_cols() != self.n_features() {
            return Err(EtlError::DimensionMismatchError {
                context: "feature matrix columns".to_string(),
                expected: self.n_features(),
                got: x.n_cols(),
            });
        }
        Ok(())
    }

    pub fn predict_proba(&self, x: &CsrMatrix) -> Result<Vec<f64>> {
        self.check_width(x)?;
        Ok((0..x.n_rows())
            .map(|row| sigmoid(row_dot(x, row, &self.coefficients) + self.intercept))
            .collect())
    }

    pub fn predict(&self, x: &CsrMatrix) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| if p >= 0.5 { Label::True } else { Label::Fake })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 欄 0 出現代表 true，欄 1 出現代表 fake
    fn separable() -> (CsrMatrix, Vec<Label>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            if i % 2 == 0 {
                rows.push(vec![(0, 1 + (i % 3) as i64), (2, 1)]);
                labels.push(Label::True);
            } else {
                rows.push(vec![(1, 1 + (i % 4) as i64), (2, 1)]);
                labels.push(Label::Fake);
            }
        }
        (CsrMatrix::from_sorted_rows(3, rows), labels)
    }

    fn params() -> LogisticRegressionParams {
        LogisticRegressionParams {
            learning_rate: 0.5,
            batch_size: 8,
            ..LogisticRegressionParams::new(42, 200)
        }
    }

    #[test]
    fn test_fits_separable_data() {
        let (x, y) = separable();
        let model = LogisticRegression::new(params()).unwrap().fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.coefficients[0] > 0.0);
        assert!(model.coefficients[1] < 0.0);
        assert!(model.n_iter >= 1);
    }

    #[test]
    fn test_training_is_reproducible() {
        let (x, y) = separable();
        let a = LogisticRegression::new(params()).unwrap().fit(&x, &y).unwrap();
        let b = LogisticRegression::new(params()).unwrap().fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimension_checks() {
        let (x, y) = separable();
        let trainer = LogisticRegression::new(params()).unwrap();
        assert!(matches!(
            trainer.fit(&x, &y[..3]).unwrap_err(),
            EtlError::DimensionMismatchError { .. }
        ));

        let model = trainer.fit(&x, &y).unwrap();
        let narrow = CsrMatrix::from_sorted_rows(2, vec![vec![(0, 1)]]);
        assert!(model.predict(&narrow).is_err());
    }

    #[test]
    fn test_invalid_params() {
        let mut p = params();
        p.max_iter = 0;
        assert!(LogisticRegression::new(p).is_err());
        let mut p = params();
        p.c = -1.0;
        assert!(LogisticRegression::new(p).is_err());
    }

    #[test]
    fn test_model_json_round_trip() {
        let (x, y) = separable();
        let model = LogisticRegression::new(params()).unwrap().fit(&x, &y).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: LogisticRegressionModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.predict(&x).unwrap(), model.predict(&x).unwrap());
    }
}
