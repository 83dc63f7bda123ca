use ndarray::Array2;

use crate::data::row::FeatureRow;
use crate::error::InferenceError;
use crate::model::regressor::{RegressionModel, Regressor};
use crate::model::scaler::{Scaler, StandardScaler};

/// Scaler followed by model, one value out per row in.
#[derive(Debug, Clone)]
pub struct InferenceEngine<S = StandardScaler, R = RegressionModel> {
    scaler: S,
    model: R,
}

impl<S: Scaler, R: Regressor> InferenceEngine<S, R> {
    pub fn new(scaler: S, model: R) -> Self {
        InferenceEngine { scaler, model }
    }

    pub fn scaler(&self) -> &S {
        &self.scaler
    }

    pub fn model(&self) -> &R {
        &self.model
    }

    pub fn predict_batch(&self, rows: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        if rows.nrows() == 0 {
            return Err(InferenceError::EmptyBatch);
        }
        let scaled = self.scaler.transform(rows)?;
        if scaled.ncols() != self.model.n_features() {
            return Err(InferenceError::ShapeMismatch {
                stage: "model",
                expected: self.model.n_features(),
                actual: scaled.ncols(),
            });
        }

        let values = self.model.predict(&scaled)?;
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite { row });
        }
        Ok(values.to_vec())
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, InferenceError> {
        let values = self.predict_batch(&row.to_batch())?;
        values.first().copied().ok_or(InferenceError::EmptyBatch)
    }
}
