//! Command-line configuration for the `estimator` binary.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::input::RawInput;
use crate::data::profile::AssemblyProfile;
use crate::error::{ArtifactError, ProfileError};
use crate::utils::io::{ArtifactPaths, LoadedArtifacts, load_artifacts, load_bundle};

#[derive(Parser, Debug)]
#[command(name = "estimator")]
#[command(about = "Estimate a property's value and project it forward", long_about = None)]
pub struct Cli {
    /// Directory holding model.bin, scaler.bin and columns.json
    #[arg(long, env = "ESTIMATOR_ARTIFACTS", default_value = ".")]
    pub artifacts: PathBuf,

    /// Single-file bundle with model, scaler and columns (overrides --artifacts)
    #[arg(long, env = "ESTIMATOR_BUNDLE")]
    pub bundle: Option<PathBuf>,

    /// Built-in column naming profile (short-stay, real-estate)
    #[arg(long, env = "ESTIMATOR_PROFILE", default_value = "short-stay")]
    pub profile: String,

    /// JSON profile file (overrides --profile)
    #[arg(long)]
    pub profile_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one estimate from flags or a JSON input file
    Estimate {
        /// JSON file with numeric/categorical/flags maps
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Numeric field, e.g. --num bedrooms=2
        #[arg(long = "num", value_parser = parse_numeric)]
        numeric: Vec<(String, f64)>,

        /// Categorical field, e.g. --cat "room_type=Private room"
        #[arg(long = "cat", value_parser = parse_category)]
        categorical: Vec<(String, String)>,

        /// Boolean field set to true, e.g. --flag instant_bookable
        #[arg(long = "flag")]
        flags: Vec<String>,

        #[command(flatten)]
        projection: ProjectionArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Print the estimate as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Prompt for each field and estimate repeatedly
    Interactive {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the model columns and how the profile maps onto them
    Schema,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    /// Year to project to (defaults to next year)
    #[arg(long)]
    pub target_year: Option<i32>,

    /// Expected yearly growth in percent
    #[arg(long, default_value = "6.0")]
    pub rate: f64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the growth curve as SVG
    #[arg(long)]
    pub projection_chart: Option<PathBuf>,

    /// Write the monthly curve as SVG
    #[arg(long)]
    pub seasonal_chart: Option<PathBuf>,

    /// Write the year-by-year table as CSV
    #[arg(long)]
    pub table: Option<PathBuf>,
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}

pub fn parse_numeric(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = split_pair(raw)?;
    let value: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    Ok((key.to_string(), value))
}

pub fn parse_category(raw: &str) -> Result<(String, String), String> {
    let (key, value) = split_pair(raw)?;
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    pub fn load_profile(&self) -> Result<AssemblyProfile, ProfileError> {
        match &self.profile_file {
            Some(path) => AssemblyProfile::from_file(path),
            None => AssemblyProfile::builtin(&self.profile),
        }
    }

    pub fn load_artifacts(&self) -> Result<LoadedArtifacts, ArtifactError> {
        match &self.bundle {
            Some(path) => load_bundle(path),
            None => load_artifacts(&ArtifactPaths::in_dir(&self.artifacts)),
        }
    }
}

/// Input file (if any) overlaid with the fields given as flags.
pub fn build_input(
    input: Option<&PathBuf>,
    numeric: &[(String, f64)],
    categorical: &[(String, String)],
    flags: &[String],
) -> Result<RawInput, Box<dyn Error>> {
    let mut raw = match input {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => RawInput::new(),
    };
    for (field, value) in numeric {
        raw.numeric.insert(field.clone(), *value);
    }
    for (field, value) in categorical {
        raw.categorical.insert(field.clone(), value.clone());
    }
    for field in flags {
        raw.flags.insert(field.clone(), true);
    }
    Ok(raw)
}
