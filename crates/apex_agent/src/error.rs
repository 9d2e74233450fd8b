//! Error types for the prediction pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("No live data available: {0}")]
    NoLiveData(String),

    #[error("Select both a driver and a track before running a prediction")]
    InvalidSelection,

    #[error("Run cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
