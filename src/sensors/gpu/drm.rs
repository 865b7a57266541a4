//! GPUs exposed through `/sys/class/drm/card<N>/device`. NVIDIA cards are
//! skipped here because NVML reports them.

use std::path::Path;

use tracing::debug;

use super::{GpuDevice, GpuVendor};
use crate::error::SensorError;
use crate::sample::{Celsius, Percent, VramUsage};
use crate::sensors::sysfs::{file_name, list_dir, read_attr, read_value};
use crate::sensors::thermal::hwmon_entries;

fn is_card(name: &str) -> bool {
    name.strip_prefix("card").is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_pci_id(raw: &str) -> Option<u32> {
    u32::from_str_radix(raw.trim().trim_start_matches("0x"), 16).ok()
}

pub fn enumerate(root: &Path) -> Result<Vec<GpuDevice>, SensorError> {
    let mut out = Vec::new();
    for card in list_dir(root)? {
        let card_name = file_name(&card);
        if !is_card(card_name) { continue; }
        let device = card.join("device");
        let raw_vendor = match read_attr(&device.join("vendor")) {
            Ok(Some(v)) => v,
            Ok(None) => continue,
            Err(e) => {
                debug!("skipping {card_name}: {e}");
                continue;
            }
        };
        let Some(id) = parse_pci_id(&raw_vendor) else {
            debug!("{card_name}: unrecognised vendor id {raw_vendor:?}");
            continue;
        };
        let vendor = GpuVendor::from_pci_id(id);
        if vendor == GpuVendor::Nvidia {
            debug!("{card_name}: NVIDIA device left to NVML");
            continue;
        }
        let name = read_attr(&device.join("product_name"))
            .ok()
            .flatten()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match vendor {
                GpuVendor::Amd => format!("AMD Radeon GPU ({card_name})"),
                _ => format!("GPU {raw_vendor} ({card_name})"),
            });
        debug!("{card_name}: {name} ({vendor:?})");
        out.push(GpuDevice::drm(name, vendor, &device));
    }
    Ok(out)
}

pub fn load(device: &Path) -> Result<Option<Percent>, SensorError> {
    Ok(read_value::<f64>(&device.join("gpu_busy_percent"))?.map(Percent::new))
}

pub fn vram(device: &Path) -> Result<Option<VramUsage>, SensorError> {
    let used = read_value::<u64>(&device.join("mem_info_vram_used"))?;
    let total = read_value::<u64>(&device.join("mem_info_vram_total"))?;
    Ok(used.zip(total).map(|(u, t)| VramUsage::from_bytes(u, t)))
}

/// First temperature of the card's own hwmon chip, if it has one.
pub fn temperature(device: &Path) -> Result<Option<Celsius>, SensorError> {
    for chip in list_dir(&device.join("hwmon"))? {
        if let Some(e) = hwmon_entries(&chip)?.into_iter().next() {
            return Ok(Some(e.current));
        }
    }
    Ok(None)
}
