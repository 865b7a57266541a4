//! Sensor readers. Every reader reports a [`Reading`] so callers can tell a
//! sensor that does not exist on this host from one that failed to answer.

pub mod gpu;
pub mod sysfs;
pub mod thermal;

use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use sysinfo::{CpuExt, System, SystemExt};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::SensorError;
use crate::sample::{self, CpuTemperature, Percent, RamUsage, Sample};
use gpu::{GpuInventory, GpuStats};
use thermal::{TempGroups, ThermalScanner};

#[derive(Debug)]
pub enum Reading<T> {
    Available(T),
    /// The sensor family does not exist on this host.
    Unavailable,
    /// The sensor exists but the query errored.
    Failed(SensorError),
}

impl<T> Reading<T> {
    /// Collapse to "data or no data", logging a failure under `what`.
    pub fn into_option(self, what: &str) -> Option<T> {
        match self {
            Reading::Available(v) => Some(v),
            Reading::Unavailable => None,
            Reading::Failed(e) => {
                warn!("{what}: {e}");
                None
            }
        }
    }

    pub fn error(&self) -> Option<&SensorError> {
        match self { Reading::Failed(e) => Some(e), _ => None }
    }

    pub fn is_available(&self) -> bool { matches!(self, Reading::Available(_)) }

    pub fn take(&mut self) -> Reading<T> { std::mem::replace(self, Reading::Unavailable) }
}

impl<T> From<Result<Option<T>, SensorError>> for Reading<T> {
    fn from(r: Result<Option<T>, SensorError>) -> Self {
        match r {
            Ok(Some(v)) => Reading::Available(v),
            Ok(None) => Reading::Unavailable,
            Err(e) => Reading::Failed(e),
        }
    }
}

/// Every reading taken in one cycle, before failures are collapsed for the log.
#[derive(Debug)]
pub struct Snapshot {
    pub timestamp: NaiveDateTime,
    pub cpu_usage: Percent,
    pub cpu_temperature: Reading<CpuTemperature>,
    pub ram: RamUsage,
    /// One entry per enumerated GPU, in enumeration order. Empty when there are none.
    pub gpus: Vec<GpuStats>,
}

impl Snapshot {
    pub fn into_sample(mut self) -> Sample {
        let groups = gpu::GpuFamilies::split(&mut self.gpus);
        Sample {
            timestamp: self.timestamp,
            cpu_usage: self.cpu_usage,
            cpu_temperature: self.cpu_temperature.into_option("CPU temperature"),
            gpu_usage: groups.usage.into_option("GPU usage"),
            gpu_vram: groups.vram.into_option("GPU VRAM"),
            gpu_temperature: groups.temperature.into_option("GPU temperature"),
            ram_usage: self.ram,
        }
    }
}

/// Owns the host handles (sysinfo, sysfs roots, NVML) for the life of the process.
pub struct Sensors {
    system: System,
    thermal: ThermalScanner,
    gpus: GpuInventory,
    cpu_window: Duration,
    last_cpu_refresh: Option<Instant>,
}

impl Sensors {
    pub fn new(settings: &Settings) -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let gpus = GpuInventory::discover(settings);
        debug!("{} GPU(s) enumerated", gpus.devices().len());
        Self {
            system,
            thermal: ThermalScanner::new(&settings.hwmon_root, &settings.thermal_root),
            gpus,
            cpu_window: settings.cpu_window,
            last_cpu_refresh: None,
        }
    }

    /// Global CPU load. Blocks for the measurement window unless a previous
    /// refresh is already at least that old.
    pub fn cpu_usage(&mut self) -> Percent {
        let settled = self.last_cpu_refresh.is_some_and(|t| t.elapsed() >= self.cpu_window);
        if !settled {
            self.system.refresh_cpu();
            thread::sleep(self.cpu_window);
        }
        self.system.refresh_cpu();
        self.last_cpu_refresh = Some(Instant::now());
        Percent::new(self.system.global_cpu_info().cpu_usage() as f64)
    }

    pub fn ram_usage(&mut self) -> RamUsage {
        self.system.refresh_memory();
        RamUsage::from_bytes(self.system.total_memory(), self.system.used_memory(), self.system.available_memory())
    }

    fn temperature_groups(&self) -> Reading<TempGroups> {
        match self.thermal.scan() {
            Ok(groups) => Reading::Available(groups),
            Err(e) => Reading::Failed(e),
        }
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let cpu_usage = self.cpu_usage();
        let ram = self.ram_usage();
        let (cpu_temperature, groups) = match self.temperature_groups() {
            Reading::Available(g) => (thermal::cpu_temperature(&g), g),
            Reading::Failed(e) => (Reading::Failed(e), TempGroups::new()),
            Reading::Unavailable => (Reading::Unavailable, TempGroups::new()),
        };
        let gpus = self.gpus.read_all(&groups);
        Snapshot { timestamp: sample::now(), cpu_usage, cpu_temperature, ram, gpus }
    }

    /// Release the vendor library. Safe to call more than once.
    pub fn shutdown(&mut self) { self.gpus.shutdown(); }
}

impl Drop for Sensors {
    fn drop(&mut self) { self.shutdown(); }
}
