use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A sensor query that was attempted and failed (as opposed to a sensor that does not exist).
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unexpected value {value:?} in {path}")]
    Parse { path: PathBuf, value: String },
    #[cfg(feature = "nvidia")]
    #[error("NVML: {0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot append to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot serialize sample: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a chart tick pushed nothing.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("{family} query failed: {message}")]
    Sensor { family: &'static str, message: String },
}
