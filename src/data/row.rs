use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::data::schema::FeatureSchema;

/// One row of features laid out in schema order, zero by default.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: Array1<f64>,
}

impl FeatureRow {
    pub fn zeros(schema: &FeatureSchema) -> Self {
        FeatureRow {
            values: Array1::zeros(schema.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Value of a named column, `None` when the schema has no such column.
    pub fn get(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.position(name).map(|index| self.values[index])
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Single-row matrix for the inference engine.
    pub fn to_batch(&self) -> Array2<f64> {
        self.values.clone().insert_axis(ndarray::Axis(0))
    }

    /// Copies of this row stacked `count` times.
    pub fn repeat(&self, count: usize) -> Array2<f64> {
        let mut batch = Array2::zeros((count, self.values.len()));
        for mut row in batch.rows_mut() {
            row.assign(&self.values);
        }
        batch
    }

    pub fn to_map(&self, schema: &FeatureSchema) -> BTreeMap<String, f64> {
        schema
            .columns()
            .iter()
            .cloned()
            .zip(self.values.iter().copied())
            .collect()
    }
}
