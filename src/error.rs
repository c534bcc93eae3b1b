use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a watering request was refused. None of these is fatal; the caller decides what to do.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    #[error("Soil is already wet, watering refused")]
    TooWet,
    #[error("Soil is not dry enough for automatic watering")]
    NotDryEnough,
    #[error("Minimum interval since last watering has not elapsed")]
    IntervalNotElapsed,
    #[error("Pump is busy with another watering")]
    Busy,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sensor error: {0}")]
    SensorError(String),
    #[error("Relay error: {0}")]
    RelayError(String),
    #[error("Watering denied: {0}")]
    Denied(#[from] Denial),
    #[error("Shutting down, watering refused")]
    ShuttingDown,
    #[error("Watering task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
