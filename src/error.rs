use std::path::PathBuf;
use thiserror::Error;

/// Problems reading the model, scaler and column artifacts at startup.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("missing artifact file(s): {}", display_paths(.missing))]
    MissingArtifact { missing: Vec<PathBuf> },

    #[error("failed to decode {path}: {reason}")]
    ArtifactDecode { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("column list is empty")]
    EmptySchema,
}

/// Failures inside the scaler transform or the model predict step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("{stage} expects {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} is not fitted")]
    NotFitted(&'static str),

    #[error("model produced a non-finite value for row {row}")]
    NonFinite { row: usize },

    #[error("no rows to predict")]
    EmptyBatch,
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("unknown profile '{0}' (available: short-stay, real-estate)")]
    Unknown(String),

    #[error("failed to read profile {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

/// Anything that aborts a single estimate request.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("prediction failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_lists_every_path() {
        let error = ArtifactError::MissingArtifact {
            missing: vec![PathBuf::from("model.bin"), PathBuf::from("columns.json")],
        };
        assert_eq!(
            error.to_string(),
            "missing artifact file(s): model.bin, columns.json"
        );
    }

    #[test]
    fn test_shape_mismatch_message() {
        let error = InferenceError::ShapeMismatch {
            stage: "scaler",
            expected: 12,
            actual: 3,
        };
        assert_eq!(error.to_string(), "scaler expects 12 features, got 3");
    }

    #[test]
    fn test_estimate_error_wraps_inference() {
        let error: EstimateError = InferenceError::NotFitted("model").into();
        assert_eq!(error.to_string(), "prediction failed: model is not fitted");
    }
}
