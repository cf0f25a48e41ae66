use super::predictor::DirectionPredictor;
use crate::domain::errors::TrainingError;
use crate::domain::ml::StandardScaler;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};

type LogReg = LogisticRegression<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Standardization followed by smartcore logistic regression.
///
/// The whole struct, column list included, is the artifact blob (serde_json),
/// so inference never depends on a column list compiled into the binary.
#[derive(Debug, Serialize, Deserialize)]
pub struct SmartcoreDirectionModel {
    columns: Vec<String>,
    scaler: StandardScaler,
    model: LogReg,
}

impl SmartcoreDirectionModel {
    /// Fit on raw (unscaled) rows. `labels` must contain both classes.
    pub fn fit(
        columns: Vec<String>,
        rows: &[Vec<f64>],
        labels: &[u8],
    ) -> Result<Self, TrainingError> {
        let scaler = StandardScaler::fit(rows)
            .ok_or_else(|| TrainingError::Fit("empty or ragged training matrix".to_string()))?;
        if scaler.width() != columns.len() {
            return Err(TrainingError::Fit(format!(
                "expected {} columns, got {}",
                columns.len(),
                scaler.width()
            )));
        }

        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
        let x = DenseMatrix::from_2d_vec(&scaled)
            .map_err(|e| TrainingError::Fit(format!("matrix creation failed: {}", e)))?;
        let y: Vec<i32> = labels.iter().map(|l| i32::from(*l)).collect();

        let model = LogisticRegression::fit(&x, &y, LogisticRegressionParameters::default())
            .map_err(|e| TrainingError::Fit(e.to_string()))?;

        Ok(Self {
            columns,
            scaler,
            model,
        })
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Share of `rows` whose predicted label matches `labels`.
    pub fn accuracy(&self, rows: &[Vec<f64>], labels: &[u8]) -> Result<f64, String> {
        if rows.is_empty() {
            return Err("no rows to score".to_string());
        }
        let mut correct = 0usize;
        for (row, label) in rows.iter().zip(labels) {
            if self.predict_label(row)? == *label {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }

    fn weight(&self, j: usize) -> f64 {
        let coefficients = self.model.coefficients();
        let (rows, _) = coefficients.shape();
        if rows == 1 {
            *coefficients.get((0, j))
        } else {
            *coefficients.get((j, 0))
        }
    }
}

impl DirectionPredictor for SmartcoreDirectionModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.columns.len() {
            return Err(format!(
                "expected {} features, got {}",
                self.columns.len(),
                features.len()
            ));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err("non-finite feature value".to_string());
        }

        let scaled = self.scaler.transform(features);
        let z = scaled
            .iter()
            .enumerate()
            .map(|(j, x)| x * self.weight(j))
            .sum::<f64>()
            + *self.model.intercept().get((0, 0));

        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn name(&self) -> &str {
        "SmartCore Logistic Regression"
    }
}
