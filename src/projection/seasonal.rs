use ndarray::Array2;
use serde::Serialize;
use tracing::warn;

use crate::data::assembler::FeatureAssembler;
use crate::data::row::FeatureRow;
use crate::error::InferenceError;
use crate::model::engine::InferenceEngine;
use crate::model::regressor::Regressor;
use crate::model::scaler::Scaler;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Predicted value for each calendar month, or why there is none.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Seasonality {
    Available { monthly: [f64; 12] },
    Unavailable { reason: String },
}

impl Seasonality {
    pub fn is_available(&self) -> bool {
        matches!(self, Seasonality::Available { .. })
    }
}

/// Twelve copies of `row` with the month column set to 1..=12.
pub fn monthly_batch(row: &FeatureRow, month_index: usize) -> Array2<f64> {
    let mut batch = row.repeat(12);
    for (month, mut line) in batch.rows_mut().into_iter().enumerate() {
        line[month_index] = (month + 1) as f64;
    }
    batch
}

/// One batched prediction across the twelve months.
pub fn forecast<S: Scaler, R: Regressor>(
    engine: &InferenceEngine<S, R>,
    assembler: &FeatureAssembler,
    row: &FeatureRow,
) -> Result<Seasonality, InferenceError> {
    let Some(month_index) = assembler.month_index() else {
        let reason = match assembler.profile().month_column.as_deref() {
            Some(column) => format!("model was not trained with a '{column}' column"),
            None => "profile has no month column".to_string(),
        };
        warn!(%reason, "seasonality unavailable");
        return Ok(Seasonality::Unavailable { reason });
    };

    let values = engine.predict_batch(&monthly_batch(row, month_index))?;
    let monthly: [f64; 12] = values
        .try_into()
        .map_err(|values: Vec<f64>| InferenceError::ShapeMismatch {
            stage: "seasonal batch",
            expected: 12,
            actual: values.len(),
        })?;
    Ok(Seasonality::Available { monthly })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::input::RawInput;
    use crate::data::profile::AssemblyProfile;
    use crate::data::schema::FeatureSchema;
    use crate::data::assembler::Calendar;
    use crate::model::regressor::{LinearRegressor, RegressionModel};
    use crate::model::scaler::StandardScaler;
    use ndarray::{Array1, array};
    use std::sync::Arc;

    fn assembler(columns: &[&str]) -> FeatureAssembler {
        let schema = FeatureSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap();
        FeatureAssembler::new(Arc::new(schema), AssemblyProfile::short_stay())
    }

    fn identity_engine(width: usize, coefficients: Array1<f64>) -> InferenceEngine {
        InferenceEngine::new(
            StandardScaler::new(Array1::zeros(width), Array1::ones(width)),
            RegressionModel::Linear(LinearRegressor {
                coefficients,
                intercept: 200.0,
            }),
        )
    }

    #[test]
    fn test_monthly_batch_only_varies_the_month() {
        let schema = FeatureSchema::new(vec!["beds".into(), "month".into()]).unwrap();
        let mut row = FeatureRow::zeros(&schema);
        row.set(0, 2.0);
        row.set(1, 7.0);

        let batch = monthly_batch(&row, 1);
        assert_eq!(batch.nrows(), 12);
        assert!(batch.column(0).iter().all(|&v| v == 2.0));
        assert_eq!(batch.column(1).to_vec(), (1..=12).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_forecast_returns_twelve_values() {
        let assembler = assembler(&["beds", "month"]);
        let engine = identity_engine(2, array![10.0, 5.0]);
        let row = assembler
            .assemble(&RawInput::new().numeric("beds", 2.0), Calendar { year: 2024, month: 3 })
            .row;

        let Seasonality::Available { monthly } = forecast(&engine, &assembler, &row).unwrap() else {
            panic!("expected seasonality");
        };
        assert_eq!(monthly[0], 225.0);
        assert_eq!(monthly[11], 280.0);
    }

    #[test]
    fn test_missing_month_column_is_reported_unavailable() {
        let assembler = assembler(&["beds"]);
        let engine = identity_engine(1, array![10.0]);
        let row = FeatureRow::zeros(assembler.schema());

        let outcome = forecast(&engine, &assembler, &row).unwrap();
        assert!(!outcome.is_available());
        assert!(matches!(outcome, Seasonality::Unavailable { reason } if reason.contains("month")));
    }

    #[test]
    fn test_inference_failure_propagates() {
        let assembler = assembler(&["beds", "month"]);
        let engine = identity_engine(3, array![1.0, 1.0, 1.0]);
        let row = FeatureRow::zeros(assembler.schema());
        assert!(forecast(&engine, &assembler, &row).is_err());
    }
}
