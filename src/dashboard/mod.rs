//! The 1 Hz presentation loop, independent of the UI toolkit.
//!
//! [`Dashboard`] holds the rolling histories. It is created seeded with zeros
//! and each tick either pushes one value into every window or, when a query
//! failed, leaves all of them untouched. [`Monitor`] ties it to the sensors
//! and the sample log.

pub mod chart;

use tracing::{debug, warn};

use crate::axis::AxisRange;
use crate::config::Settings;
use crate::error::TickError;
use crate::logger::SampleLogger;
use crate::report;
use crate::sensors::{Reading, Sensors, Snapshot};
use crate::window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChartScalars {
    pub gpu_load: f64,
    pub gpu_temperature: f64,
    pub ram_percent: f64,
    pub vram_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Complete,
    /// Some metrics had no source on this host and were charted as zero.
    Partial { missing: Vec<&'static str> },
}

fn scalar<T>(
    reading: &Reading<T>,
    family: &'static str,
    to_f64: impl Fn(&T) -> f64,
    missing: &mut Vec<&'static str>,
) -> Result<f64, TickError> {
    match reading {
        Reading::Available(v) => Ok(to_f64(v)),
        Reading::Unavailable => {
            missing.push(family);
            Ok(0.0)
        }
        Reading::Failed(e) => Err(TickError::Sensor { family, message: e.to_string() }),
    }
}

impl ChartScalars {
    /// Values for the first enumerated GPU plus RAM. No GPU charts as zero.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<(Self, TickOutcome), TickError> {
        let mut missing = Vec::new();
        let ram_percent = snapshot.ram.percent.value();
        let scalars = match snapshot.gpus.first() {
            Some(g) => Self {
                gpu_load: scalar(&g.load, "GPU usage", |p| p.value(), &mut missing)?,
                gpu_temperature: scalar(&g.temperature, "GPU temperature", |c| c.value(), &mut missing)?,
                ram_percent,
                vram_percent: scalar(&g.vram, "GPU VRAM", |v| v.percent(), &mut missing)?,
            },
            None => {
                missing.push("GPU");
                Self { ram_percent, ..Self::default() }
            }
        };
        let outcome = if missing.is_empty() { TickOutcome::Complete } else { TickOutcome::Partial { missing } };
        Ok((scalars, outcome))
    }
}

/// Display ranges for the three history panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRanges {
    pub gpu_temperature: AxisRange,
    pub ram: AxisRange,
    pub vram: AxisRange,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub gpu_load: RollingWindow<f64>,
    pub gpu_temperature: RollingWindow<f64>,
    pub ram: RollingWindow<f64>,
    pub vram: RollingWindow<f64>,
    ticks: u64,
    skipped: u64,
}

impl Dashboard {
    pub fn new(history_len: usize) -> Self {
        Self {
            gpu_load: RollingWindow::filled(history_len, 0.0),
            gpu_temperature: RollingWindow::filled(history_len, 0.0),
            ram: RollingWindow::filled(history_len, 0.0),
            vram: RollingWindow::filled(history_len, 0.0),
            ticks: 0,
            skipped: 0,
        }
    }

    pub fn push(&mut self, s: ChartScalars) {
        self.gpu_load.push(s.gpu_load);
        self.gpu_temperature.push(s.gpu_temperature);
        self.ram.push(s.ram_percent);
        self.vram.push(s.vram_percent);
    }

    /// Push this snapshot's scalars, or nothing at all if any charted query failed.
    pub fn apply(&mut self, snapshot: &Snapshot) -> Result<TickOutcome, TickError> {
        self.ticks += 1;
        match ChartScalars::from_snapshot(snapshot) {
            Ok((scalars, outcome)) => {
                self.push(scalars);
                Ok(outcome)
            }
            Err(e) => {
                self.skipped += 1;
                Err(e)
            }
        }
    }

    pub fn latest(&self) -> ChartScalars {
        ChartScalars {
            gpu_load: self.gpu_load.latest_or_zero(),
            gpu_temperature: self.gpu_temperature.latest_or_zero(),
            ram_percent: self.ram.latest_or_zero(),
            vram_percent: self.vram.latest_or_zero(),
        }
    }

    pub fn ranges(&self) -> PanelRanges {
        let l = self.latest();
        PanelRanges {
            gpu_temperature: AxisRange::temperature(l.gpu_temperature),
            ram: AxisRange::percent(l.ram_percent),
            vram: AxisRange::percent(l.vram_percent),
        }
    }

    pub fn ticks(&self) -> u64 { self.ticks }
    pub fn skipped(&self) -> u64 { self.skipped }
}

/// Sensors, log and dashboard for one running chart.
pub struct Monitor {
    sensors: Sensors,
    logger: SampleLogger,
    dashboard: Dashboard,
}

impl Monitor {
    pub fn new(settings: &Settings) -> Self {
        Self::with_logger(settings, SampleLogger::new(settings.log_path()))
    }

    pub fn with_logger(settings: &Settings, logger: SampleLogger) -> Self {
        Self { sensors: Sensors::new(settings), logger, dashboard: Dashboard::new(settings.history_len) }
    }

    /// Sample, update the chart history, print and log. Printing and logging
    /// happen even when the chart update is skipped.
    pub fn tick(&mut self) -> Result<TickOutcome, TickError> {
        let snapshot = self.sensors.snapshot();
        let applied = self.dashboard.apply(&snapshot);
        let sample = snapshot.into_sample();
        report::print(&sample);
        if let Err(e) = self.logger.append(&sample) {
            warn!("{e}");
        }
        match &applied {
            Ok(TickOutcome::Partial { missing }) => debug!("tick {}: no data for {}", self.dashboard.ticks(), missing.join(", ")),
            Ok(TickOutcome::Complete) => {}
            Err(e) => warn!("tick {} skipped: {e}", self.dashboard.ticks()),
        }
        applied
    }

    pub fn dashboard(&self) -> &Dashboard { &self.dashboard }

    pub fn shutdown(&mut self) { self.sensors.shutdown(); }
}
