use std::error::Error;
use std::io::{self, ErrorKind};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use property_estimator::config::{Cli, Command, OutputArgs, build_input};
use property_estimator::data::{Calendar, FeatureAssembler};
use property_estimator::estimator::{Estimate, EstimateRequest, Estimator};
use property_estimator::projection::Seasonality;
use property_estimator::utils::input::{Prompter, prompt_request};
use property_estimator::utils::{io as artifact_io, plot};

fn write_outputs(estimate: &Estimate, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &output.projection_chart {
        plot::create_projection_plot(&estimate.series, path)?;
        info!(path = %path.display(), "projection chart written");
    }
    if let Some(path) = &output.seasonal_chart {
        match &estimate.seasonality {
            Seasonality::Available { monthly } => {
                plot::create_seasonal_plot(monthly, path)?;
                info!(path = %path.display(), "seasonal chart written");
            }
            Seasonality::Unavailable { .. } => {
                println!("Seasonal chart skipped: the model has no monthly data");
            }
        }
    }
    if let Some(path) = &output.table {
        artifact_io::write_series_csv(path, &estimate.series)?;
        info!(path = %path.display(), "projection table written");
    }
    Ok(())
}

fn print_schema(assembler: &FeatureAssembler) {
    let schema = assembler.schema();
    let profile = assembler.profile();
    println!("Model expects {} columns (profile: {})", schema.len(), profile.name);

    let mark = |found: bool| if found { "ok" } else { "missing" };
    for rule in &profile.numeric {
        println!("  {:<24} -> {:<28} {}", rule.field, rule.column, mark(schema.contains(&rule.column)));
    }
    for rule in &profile.categories {
        let prefix = format!("{}_", rule.prefix).to_lowercase();
        let count = schema
            .columns()
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .count();
        println!("  {:<24} -> {}_* ({} categories)", rule.field, rule.prefix, count);
    }
    for rule in &profile.flags {
        let found = rule.candidates().find(|c| schema.contains(c));
        println!(
            "  {:<24} -> {}",
            rule.field,
            found.unwrap_or_else(|| "missing".to_string())
        );
    }
    let month = assembler.month_index().is_some();
    println!("  seasonality: {}", if month { "available" } else { "unavailable" });

    println!("\nColumns:");
    for column in schema.columns() {
        println!("  {}", column);
    }
}

fn run_interactive(estimator: &Estimator, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let profile = estimator.assembler().profile().clone();

    loop {
        println!("\nEnter the property details ({} profile):", profile.name);
        let request = match prompt_request(&mut prompter, &profile, Calendar::today().year) {
            Ok(request) => request,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match estimator.estimate(&request) {
            Ok(estimate) => {
                estimate.display();
                if let Err(e) = write_outputs(&estimate, output) {
                    eprintln!("Failed to write outputs: {}", e);
                }
            }
            // the session stays usable after a failed prediction
            Err(e) => eprintln!("Error while predicting: {}", e),
        }

        match prompter.yes_no("\nAnother estimate?") {
            Ok(true) => continue,
            Ok(false) => return Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estimator=info,property_estimator=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.load_profile()?;

    let artifacts = match cli.load_artifacts() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!(error = %e, "cannot start without model artifacts");
            eprintln!("Critical error: {}", e);
            eprintln!(
                "Place model.bin, scaler.bin and columns.json in the artifact directory, or pass --bundle."
            );
            std::process::exit(2);
        }
    };
    let estimator = Estimator::new(artifacts, profile);

    match &cli.command {
        Command::Schema => print_schema(estimator.assembler()),
        Command::Interactive { output } => run_interactive(&estimator, output)?,
        Command::Estimate {
            input,
            numeric,
            categorical,
            flags,
            projection,
            output,
            json,
        } => {
            let today = Calendar::today();
            let request = EstimateRequest {
                input: build_input(input.as_ref(), numeric, categorical, flags)?,
                target_year: projection.target_year.unwrap_or(today.year + 1),
                annual_rate: projection.rate,
                current_year: Some(today.year),
                current_month: Some(today.month),
            };

            let estimate = match estimator.estimate(&request) {
                Ok(estimate) => estimate,
                Err(e) => {
                    eprintln!("Error while predicting: {}", e);
                    std::process::exit(1);
                }
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                estimate.display();
            }
            write_outputs(&estimate, output)?;
        }
    }

    Ok(())
}
