use std::path::PathBuf;
use std::time::Duration;

pub const LOG_FILE_NAME: &str = "performance_log.json";
pub const HISTORY_LEN: usize = 50;

/// Sampling constants and the sysfs locations the readers scan.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sample_period: Duration,
    pub history_len: usize,
    /// Window over which CPU load is measured (two refreshes this far apart).
    pub cpu_window: Duration,
    pub log_file_name: String,
    pub hwmon_root: PathBuf,
    pub thermal_root: PathBuf,
    pub drm_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_period: Duration::from_secs(1),
            history_len: HISTORY_LEN,
            cpu_window: Duration::from_millis(500),
            log_file_name: LOG_FILE_NAME.to_string(),
            hwmon_root: PathBuf::from("/sys/class/hwmon"),
            thermal_root: PathBuf::from("/sys/class/thermal"),
            drm_root: PathBuf::from("/sys/class/drm"),
        }
    }
}

impl Settings {
    /// The log lives next to the executable; falls back to the working directory.
    pub fn log_path(&self) -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.log_file_name)))
            .unwrap_or_else(|| PathBuf::from(&self.log_file_name))
    }
}
