//! Temperature groups from sysfs, keyed the way the kernel names them:
//! hwmon chips by their `name` attribute, thermal zones by directory name.
//! Thermal-zone entries carry no label; the zone's `type` names the zone, not
//! the sensor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::sysfs::{file_name, list_dir, read_attr, read_value};
use super::Reading;
use crate::error::SensorError;
use crate::sample::{Celsius, CpuTemperature};

/// Groups the CPU reader accepts, in order of preference.
pub const CPU_GROUPS: [&str; 2] = ["coretemp", "thermal_zone0"];
pub const AMDGPU_GROUP: &str = "amdgpu";
const UNLABELLED_CPU: &str = "CPU";

#[derive(Debug, Clone, PartialEq)]
pub struct TempEntry {
    pub label: String,
    pub current: Celsius,
}

pub type TempGroups = BTreeMap<String, Vec<TempEntry>>;

pub fn millidegrees(raw: i64) -> Celsius { Celsius::new(raw as f64 / 1000.0) }

#[derive(Debug, Clone)]
pub struct ThermalScanner {
    hwmon_root: PathBuf,
    thermal_root: PathBuf,
}

impl ThermalScanner {
    pub fn new(hwmon_root: &Path, thermal_root: &Path) -> Self {
        Self { hwmon_root: hwmon_root.to_path_buf(), thermal_root: thermal_root.to_path_buf() }
    }

    /// Missing roots give empty groups; an unreadable individual sensor is skipped.
    pub fn scan(&self) -> Result<TempGroups, SensorError> {
        let mut groups = TempGroups::new();
        for chip in list_dir(&self.hwmon_root)? {
            let name = read_attr(&chip.join("name")).ok().flatten().unwrap_or_else(|| file_name(&chip).to_string());
            let entries = match hwmon_entries(&chip) {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping {}: {e}", chip.display());
                    continue;
                }
            };
            if !entries.is_empty() {
                groups.entry(name).or_default().extend(entries);
            }
        }
        for zone in list_dir(&self.thermal_root)? {
            let dir = file_name(&zone);
            if !dir.starts_with("thermal_zone") { continue; }
            match read_value::<i64>(&zone.join("temp")) {
                Ok(Some(raw)) => groups
                    .entry(dir.to_string())
                    .or_default()
                    .push(TempEntry { label: String::new(), current: millidegrees(raw) }),
                Ok(None) => {}
                Err(e) => debug!("skipping {dir}: {e}"),
            }
        }
        Ok(groups)
    }
}

/// `temp<N>_input` readings of one hwmon chip directory, labelled from `temp<N>_label`.
pub fn hwmon_entries(chip: &Path) -> Result<Vec<TempEntry>, SensorError> {
    let mut out = Vec::new();
    for p in list_dir(chip)? {
        let fname = file_name(&p);
        let Some(stem) = fname.strip_prefix("temp").and_then(|s| s.strip_suffix("_input")) else { continue };
        match read_value::<i64>(&p) {
            Ok(Some(raw)) => {
                let label = read_attr(&chip.join(format!("temp{stem}_label"))).ok().flatten().unwrap_or_default();
                out.push(TempEntry { label, current: millidegrees(raw) });
            }
            Ok(None) => {}
            Err(e) => debug!("skipping {}: {e}", p.display()),
        }
    }
    Ok(out)
}

/// Per-label CPU temperatures from the first preferred group present.
pub fn cpu_temperature(groups: &TempGroups) -> Reading<CpuTemperature> {
    let Some(entries) = CPU_GROUPS.iter().find_map(|g| groups.get(*g)) else {
        return Reading::Unavailable;
    };
    let map: CpuTemperature = entries
        .iter()
        .map(|e| {
            let label = if e.label.is_empty() { UNLABELLED_CPU.to_string() } else { e.label.clone() };
            (label, e.current)
        })
        .collect();
    Reading::Available(map)
}

pub fn amdgpu_temperature(groups: &TempGroups) -> Option<Celsius> {
    groups.get(AMDGPU_GROUP).and_then(|e| e.first()).map(|e| e.current)
}
