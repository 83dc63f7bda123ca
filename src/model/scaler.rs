use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Fitted per-column transform applied before the model sees a row.
pub trait Scaler {
    fn n_features(&self) -> usize;
    fn transform(&self, rows: &Array2<f64>) -> Result<Array2<f64>, InferenceError>;
}

/// Standardisation: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> Self {
        StandardScaler { mean, scale }
    }

    /// Column mean and population standard deviation of `x`.
    pub fn fit(x: &Array2<f64>) -> Result<Self, InferenceError> {
        let mean = x.mean_axis(Axis(0)).ok_or(InferenceError::EmptyBatch)?;
        let scale = x.std_axis(Axis(0), 0.0);
        Ok(StandardScaler { mean, scale })
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, rows: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        if self.mean.is_empty() {
            return Err(InferenceError::NotFitted("scaler"));
        }
        if self.scale.len() != self.mean.len() {
            return Err(InferenceError::ShapeMismatch {
                stage: "scaler scale vector",
                expected: self.mean.len(),
                actual: self.scale.len(),
            });
        }
        if rows.ncols() != self.mean.len() {
            return Err(InferenceError::ShapeMismatch {
                stage: "scaler",
                expected: self.mean.len(),
                actual: rows.ncols(),
            });
        }

        // constant columns keep their centred value
        let scale = self
            .scale
            .mapv(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s });
        let mean = self.mean.view().insert_axis(Axis(0));
        let scale = scale.view().insert_axis(Axis(0));
        Ok((rows - &mean) / &scale)
    }
}
