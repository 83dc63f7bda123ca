use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Fitted model that turns scaled rows into one value per row.
pub trait Regressor {
    fn n_features(&self) -> usize;
    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, InferenceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

/// Feed-forward network with ReLU hidden layers and a linear output unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MlpRegressor {
    pub layers: Vec<DenseLayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegressor {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

/// The serialized model artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RegressionModel {
    Linear(LinearRegressor),
    Mlp(MlpRegressor),
}

fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.mapv(|v| if v > 0.0 { v } else { 0.0 })
}

fn check_width(expected: usize, rows: &Array2<f64>) -> Result<(), InferenceError> {
    if rows.ncols() != expected {
        return Err(InferenceError::ShapeMismatch {
            stage: "model",
            expected,
            actual: rows.ncols(),
        });
    }
    Ok(())
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, InferenceError> {
        if self.coefficients.is_empty() {
            return Err(InferenceError::NotFitted("model"));
        }
        check_width(self.coefficients.len(), rows)?;
        Ok(rows.dot(&self.coefficients) + self.intercept)
    }
}

impl MlpRegressor {
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let last = self.layers.len().saturating_sub(1);
        let mut activation = x.to_owned();
        for (i, layer) in self.layers.iter().enumerate() {
            let z = activation.dot(&layer.weights) + &layer.bias.view().insert_axis(Axis(0));
            activation = if i == last { z } else { relu(&z) };
        }
        activation
    }

    fn check_layers(&self) -> Result<(), InferenceError> {
        let Some(last) = self.layers.last() else {
            return Err(InferenceError::NotFitted("model"));
        };
        for pair in self.layers.windows(2) {
            if pair[0].weights.ncols() != pair[1].weights.nrows() {
                return Err(InferenceError::ShapeMismatch {
                    stage: "model hidden layer",
                    expected: pair[1].weights.nrows(),
                    actual: pair[0].weights.ncols(),
                });
            }
        }
        for layer in &self.layers {
            if layer.bias.len() != layer.weights.ncols() {
                return Err(InferenceError::ShapeMismatch {
                    stage: "model bias",
                    expected: layer.weights.ncols(),
                    actual: layer.bias.len(),
                });
            }
        }
        if last.weights.ncols() != 1 {
            return Err(InferenceError::ShapeMismatch {
                stage: "model output",
                expected: 1,
                actual: last.weights.ncols(),
            });
        }
        Ok(())
    }
}

impl Regressor for MlpRegressor {
    fn n_features(&self) -> usize {
        self.layers.first().map(|l| l.weights.nrows()).unwrap_or(0)
    }

    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, InferenceError> {
        self.check_layers()?;
        check_width(self.n_features(), rows)?;
        Ok(self.forward(rows).column(0).to_owned())
    }
}

impl Regressor for RegressionModel {
    fn n_features(&self) -> usize {
        match self {
            RegressionModel::Linear(m) => m.n_features(),
            RegressionModel::Mlp(m) => m.n_features(),
        }
    }

    fn predict(&self, rows: &Array2<f64>) -> Result<Array1<f64>, InferenceError> {
        match self {
            RegressionModel::Linear(m) => m.predict(rows),
            RegressionModel::Mlp(m) => m.predict(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn mlp() -> MlpRegressor {
        // y = relu(x0 - x1) + 2 * relu(x1) + 1
        MlpRegressor {
            layers: vec![
                DenseLayer {
                    weights: array![[1.0, 0.0], [-1.0, 1.0]],
                    bias: array![0.0, 0.0],
                },
                DenseLayer {
                    weights: array![[1.0], [2.0]],
                    bias: array![1.0],
                },
            ],
        }
    }

    #[test]
    fn test_linear_predicts_per_row() {
        let model = LinearRegressor {
            coefficients: array![2.0, -1.0],
            intercept: 10.0,
        };
        let out = model.predict(&array![[1.0, 1.0], [0.0, 4.0]]).unwrap();
        assert_eq!(out, array![11.0, 6.0]);
    }

    #[test]
    fn test_mlp_forward_applies_relu_on_hidden_layers_only() {
        let model = mlp();
        let out = model.predict(&array![[3.0, 1.0], [1.0, 3.0], [-2.0, -1.0]]).unwrap();
        assert_eq!(out, array![5.0, 7.0, 1.0]);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = RegressionModel::Mlp(mlp());
        let err = model.predict(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert_eq!(
            err,
            InferenceError::ShapeMismatch {
                stage: "model",
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_inconsistent_layers_are_rejected() {
        let mut model = mlp();
        model.layers[1].weights = array![[1.0], [2.0], [3.0]];
        assert!(matches!(
            model.predict(&array![[1.0, 1.0]]),
            Err(InferenceError::ShapeMismatch { stage: "model hidden layer", .. })
        ));
    }

    #[test]
    fn test_empty_models_are_not_fitted() {
        let mlp = MlpRegressor { layers: Vec::new() };
        assert_eq!(
            mlp.predict(&Array2::zeros((1, 0))).unwrap_err(),
            InferenceError::NotFitted("model")
        );

        let linear = LinearRegressor {
            coefficients: Array1::zeros(0),
            intercept: 0.0,
        };
        assert_eq!(
            linear.predict(&Array2::zeros((1, 0))).unwrap_err(),
            InferenceError::NotFitted("model")
        );
    }
}
