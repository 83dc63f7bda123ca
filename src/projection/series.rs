use serde::{Deserialize, Serialize};

use crate::projection::growth::compound;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub year: i32,
    pub value: f64,
}

/// Year-by-year values from the current year up to the target year.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectionSeries {
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    /// Every point is computed from `base_value`; a target in the past
    /// leaves only the starting point.
    pub fn project(base_value: f64, annual_rate: f64, current_year: i32, target_year: i32) -> Self {
        let mut series = ProjectionSeries::default();
        let last = target_year.max(current_year);
        for (elapsed, year) in (current_year..=last).enumerate() {
            series.record(year, compound(base_value, annual_rate, elapsed as u32));
        }
        series
    }

    pub fn record(&mut self, year: i32, value: f64) {
        self.points.push(ProjectionPoint { year, value });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ProjectionPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ProjectionPoint> {
        self.points.last()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|p| p.year)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}
