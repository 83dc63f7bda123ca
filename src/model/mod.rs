pub mod engine;
pub mod regressor;
pub mod scaler;

pub use engine::InferenceEngine;
pub use regressor::{DenseLayer, LinearRegressor, MlpRegressor, RegressionModel, Regressor};
pub use scaler::{Scaler, StandardScaler};
