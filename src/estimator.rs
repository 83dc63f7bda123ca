use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::data::assembler::{Calendar, FeatureAssembler, SchemaGap};
use crate::data::input::RawInput;
use crate::data::profile::AssemblyProfile;
use crate::error::EstimateError;
use crate::model::engine::InferenceEngine;
use crate::projection::growth::{elapsed_years, future_value};
use crate::projection::seasonal::{self, MONTH_LABELS, Seasonality};
use crate::projection::series::ProjectionSeries;
use crate::utils::io::LoadedArtifacts;

/// Longest projection, in years, a request may ask for.
pub const MAX_HORIZON_YEARS: i64 = 200;
/// A -100% rate already wipes the value out; anything lower flips its sign.
pub const MIN_ANNUAL_RATE: f64 = -100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub input: RawInput,
    pub target_year: i32,
    /// Expected yearly growth in percent (6 means 6%).
    pub annual_rate: f64,
    /// Defaults to today's date when omitted.
    #[serde(default)]
    pub current_year: Option<i32>,
    #[serde(default)]
    pub current_month: Option<u32>,
}

impl EstimateRequest {
    fn calendar(&self) -> Result<Calendar, EstimateError> {
        let today = Calendar::today();
        let month = self.current_month.unwrap_or(today.month);
        if !(1..=12).contains(&month) {
            return Err(EstimateError::InvalidRequest(format!(
                "month {month} is outside 1..=12"
            )));
        }
        Ok(Calendar {
            year: self.current_year.unwrap_or(today.year),
            month,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub current_year: i32,
    pub target_year: i32,
    pub annual_rate: f64,
    pub today: f64,
    pub elapsed_years: u32,
    pub future_value: f64,
    pub total_gain: f64,
    pub monthly_potential: Option<f64>,
    pub series: ProjectionSeries,
    pub seasonality: Seasonality,
    pub gaps: Vec<SchemaGap>,
}

impl Estimate {
    pub fn display(&self) {
        println!("\nEstimate:");
        println!("- Value today: {:.2}", self.today);
        println!(
            "- Value in {}: {:.2} (+{} years)",
            self.target_year, self.future_value, self.elapsed_years
        );
        println!(
            "- Total appreciation: {:.2} ({}% a year)",
            self.total_gain, self.annual_rate
        );
        if let Some(potential) = self.monthly_potential {
            println!("- Monthly potential: {:.2}", potential);
        }

        println!("\nYear    Value");
        for point in &self.series.points {
            println!("{:<6}  {:.2}", point.year, point.value);
        }

        match &self.seasonality {
            Seasonality::Available { monthly } => {
                println!("\nMonth   Value");
                for (label, value) in MONTH_LABELS.iter().zip(monthly) {
                    println!("{:<6}  {:.2}", label, value);
                }
            }
            Seasonality::Unavailable { reason } => {
                println!("\nSeasonality unavailable: {}", reason);
            }
        }
    }
}

/// Loaded artifacts plus the naming profile; shared read-only across requests.
#[derive(Debug, Clone)]
pub struct Estimator {
    engine: Arc<InferenceEngine>,
    assembler: FeatureAssembler,
}

impl Estimator {
    pub fn new(artifacts: LoadedArtifacts, profile: AssemblyProfile) -> Self {
        Estimator {
            engine: artifacts.engine,
            assembler: FeatureAssembler::new(artifacts.schema, profile),
        }
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    /// Runs one request; an inference failure yields no partial estimate.
    pub fn estimate(&self, request: &EstimateRequest) -> Result<Estimate, EstimateError> {
        if !request.annual_rate.is_finite() {
            return Err(EstimateError::InvalidRequest(
                "annual rate must be a finite number".to_string(),
            ));
        }
        if request.annual_rate < MIN_ANNUAL_RATE {
            return Err(EstimateError::InvalidRequest(format!(
                "annual rate {}% is below {}%",
                request.annual_rate, MIN_ANNUAL_RATE
            )));
        }
        let calendar = request.calendar()?;
        let horizon = i64::from(request.target_year) - i64::from(calendar.year);
        if horizon > MAX_HORIZON_YEARS {
            return Err(EstimateError::InvalidRequest(format!(
                "target year {} is more than {} years after {}",
                request.target_year, MAX_HORIZON_YEARS, calendar.year
            )));
        }

        let assembly = self.assembler.assemble(&request.input, calendar);
        let outcome = self.engine.predict_row(&assembly.row).and_then(|today| {
            seasonal::forecast(&*self.engine, &self.assembler, &assembly.row)
                .map(|seasonality| (today, seasonality))
        });
        let (today, seasonality) = match outcome {
            Ok(values) => values,
            Err(e) => {
                error!(error = %e, "prediction failed");
                return Err(e.into());
            }
        };

        let future = future_value(today, request.annual_rate, calendar.year, request.target_year);
        let series = ProjectionSeries::project(
            today,
            request.annual_rate,
            calendar.year,
            request.target_year,
        );
        if !future.is_finite() || series.values().any(|v| !v.is_finite()) {
            error!(rate = request.annual_rate, target_year = request.target_year, "projection overflowed");
            return Err(EstimateError::InvalidRequest(
                "projection does not fit in a finite value".to_string(),
            ));
        }
        let estimate = Estimate {
            current_year: calendar.year,
            target_year: request.target_year,
            annual_rate: request.annual_rate,
            today,
            elapsed_years: elapsed_years(calendar.year, request.target_year),
            future_value: future,
            total_gain: future - today,
            monthly_potential: self.assembler.profile().occupancy_nights.map(|n| today * n),
            series,
            seasonality,
            gaps: assembly.gaps,
        };
        info!(
            today = estimate.today,
            future = estimate.future_value,
            target_year = estimate.target_year,
            "estimate ready"
        );
        Ok(estimate)
    }
}
