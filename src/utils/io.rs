use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::data::schema::FeatureSchema;
use crate::error::ArtifactError;
use crate::model::engine::InferenceEngine;
use crate::model::regressor::{RegressionModel, Regressor};
use crate::model::scaler::{Scaler, StandardScaler};
use crate::projection::series::ProjectionSeries;

pub const MODEL_FILE: &str = "model.bin";
pub const SCALER_FILE: &str = "scaler.bin";
pub const COLUMNS_FILE: &str = "columns.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub columns: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        ArtifactPaths {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
            columns: dir.join(COLUMNS_FILE),
        }
    }

    fn all(&self) -> [&PathBuf; 3] {
        [&self.model, &self.scaler, &self.columns]
    }
}

/// Model, scaler and column list stored together in one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactBundle {
    pub model: RegressionModel,
    pub scaler: StandardScaler,
    pub columns: Vec<String>,
}

/// Everything the estimator reads at startup, shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub engine: Arc<InferenceEngine>,
    pub schema: Arc<FeatureSchema>,
}

impl LoadedArtifacts {
    fn from_parts(
        model: RegressionModel,
        scaler: StandardScaler,
        columns: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        let schema = FeatureSchema::new(columns)?;
        info!(
            columns = schema.len(),
            scaler_features = scaler.n_features(),
            model_features = model.n_features(),
            "artifacts loaded"
        );
        Ok(LoadedArtifacts {
            engine: Arc::new(InferenceEngine::new(scaler, model)),
            schema: Arc::new(schema),
        })
    }
}

fn ensure_present(paths: &[&PathBuf]) -> Result<(), ArtifactError> {
    let missing: Vec<PathBuf> = paths
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| p.to_path_buf())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ArtifactError::MissingArtifact { missing })
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|e| ArtifactError::ArtifactDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn decode_bincode<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let data = read(path)?;
    bincode::deserialize(&data).map_err(|e| ArtifactError::ArtifactDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn decode_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let data = read(path)?;
    serde_json::from_slice(&data).map_err(|e| ArtifactError::ArtifactDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write(path: &Path, data: &[u8]) -> Result<(), ArtifactError> {
    std::fs::write(path, data).map_err(|e| ArtifactError::ArtifactWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn encode_error(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::ArtifactWrite {
        path: path.to_path_buf(),
        reason,
    }
}

pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts, ArtifactError> {
    ensure_present(&paths.all())?;
    let model: RegressionModel = decode_bincode(&paths.model)?;
    let scaler: StandardScaler = decode_bincode(&paths.scaler)?;
    let columns: Vec<String> = decode_json(&paths.columns)?;
    LoadedArtifacts::from_parts(model, scaler, columns)
}

pub fn load_bundle(path: &Path) -> Result<LoadedArtifacts, ArtifactError> {
    ensure_present(&[&path.to_path_buf()])?;
    let bundle: ArtifactBundle = decode_bincode(path)?;
    LoadedArtifacts::from_parts(bundle.model, bundle.scaler, bundle.columns)
}

pub fn save_artifacts(paths: &ArtifactPaths, bundle: &ArtifactBundle) -> Result<(), ArtifactError> {
    let model = bincode::serialize(&bundle.model).map_err(|e| encode_error(&paths.model, e.to_string()))?;
    let scaler = bincode::serialize(&bundle.scaler).map_err(|e| encode_error(&paths.scaler, e.to_string()))?;
    let columns = serde_json::to_vec_pretty(&bundle.columns)
        .map_err(|e| encode_error(&paths.columns, e.to_string()))?;

    write(&paths.model, &model)?;
    write(&paths.scaler, &scaler)?;
    write(&paths.columns, &columns)
}

pub fn save_bundle(path: &Path, bundle: &ArtifactBundle) -> Result<(), ArtifactError> {
    let data = bincode::serialize(bundle).map_err(|e| encode_error(path, e.to_string()))?;
    write(path, &data)
}

/// Year-by-year table as CSV with a `year,value` header.
pub fn write_series_csv(path: &Path, series: &ProjectionSeries) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in &series.points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
