//! Hardware telemetry sampler.
//!
//! Reads CPU load and temperature, RAM usage, GPU load, VRAM and GPU
//! temperature, prints them, appends them to a JSON log and (in the chart
//! binary) keeps a 50-sample rolling history for plotting.

pub mod axis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logger;
pub mod report;
pub mod sample;
pub mod sensors;
pub mod window;

pub use config::Settings;
pub use error::{LogError, SensorError, TickError};
pub use sample::Sample;

use tracing_subscriber::EnvFilter;

/// Install the stderr `tracing` subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
