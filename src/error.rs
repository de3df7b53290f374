use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring the model or its label table up at startup.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to load model {path}: {source}")]
    Model {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read label table {}: {source}", path.display())]
    LabelTableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("label table {} is not a JSON object of names: {source}", path.display())]
    LabelTableFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to list class directories in {}: {source}", path.display())]
    ClassKeys {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single classification produced no label.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    #[error("model is not loaded")]
    ModelUnavailable,

    #[error("invalid classification request: {0}")]
    Usage(String),

    #[error("failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("classification failed: {0}")]
    Failed(String),
}
