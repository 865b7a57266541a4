//! GPU enumeration and per-device queries.
//!
//! Devices are enumerated once at startup. Each carries a [`GpuVendor`]
//! resolved at that point, and the vendor decides where its temperature comes
//! from: NVML for NVIDIA, the `amdgpu` hwmon sensor for AMD, nothing otherwise.

pub mod drm;
#[cfg(feature = "nvidia")]
pub mod nvidia;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::thermal::{self, TempGroups};
use super::Reading;
use crate::config::Settings;
use crate::error::SensorError;
use crate::sample::{Celsius, GpuTemperature, GpuUsage, GpuVram, Percent, VramUsage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Unknown,
}

impl GpuVendor {
    pub const NVIDIA_PCI_ID: u32 = 0x10de;
    pub const AMD_PCI_ID: u32 = 0x1002;

    pub fn from_pci_id(id: u32) -> Self {
        match id {
            Self::NVIDIA_PCI_ID => GpuVendor::Nvidia,
            Self::AMD_PCI_ID => GpuVendor::Amd,
            _ => GpuVendor::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    #[cfg(feature = "nvidia")]
    Nvml { index: u32 },
    Drm { device: PathBuf },
}

#[derive(Debug, Clone)]
pub struct GpuDevice {
    /// Name as reported by the driver.
    pub name: String,
    /// `name`, suffixed when several devices share it. Used as the map key in samples.
    pub key: String,
    pub vendor: GpuVendor,
    backend: Backend,
}

impl GpuDevice {
    #[cfg(feature = "nvidia")]
    fn nvml(index: u32, name: String) -> Self {
        Self { key: name.clone(), name, vendor: GpuVendor::Nvidia, backend: Backend::Nvml { index } }
    }

    pub fn drm(name: String, vendor: GpuVendor, device: &Path) -> Self {
        Self { key: name.clone(), name, vendor, backend: Backend::Drm { device: device.to_path_buf() } }
    }
}

/// Label used in the GPU temperature map; `position` is 1-based.
pub fn temperature_label(position: usize, name: &str) -> String {
    format!("GPU {position} : {name}")
}

fn assign_keys(devices: &mut [GpuDevice]) {
    let mut seen = HashSet::new();
    for (i, d) in devices.iter_mut().enumerate() {
        if !seen.insert(d.name.clone()) {
            d.key = format!("{} #{}", d.name, i + 1);
        }
    }
}

/// One cycle's readings for one device.
#[derive(Debug)]
pub struct GpuStats {
    pub key: String,
    pub label: String,
    pub load: Reading<Percent>,
    pub vram: Reading<VramUsage>,
    pub temperature: Reading<Celsius>,
}

/// Per-family maps built from a cycle's [`GpuStats`].
#[derive(Debug)]
pub struct GpuFamilies {
    pub usage: Reading<GpuUsage>,
    pub vram: Reading<GpuVram>,
    pub temperature: Reading<GpuTemperature>,
}

impl GpuFamilies {
    /// A failed query on any device fails that family for the cycle. Devices
    /// without a load or VRAM source are left out; a device without a
    /// temperature source appears with a null reading.
    pub fn split(gpus: &mut [GpuStats]) -> Self {
        if gpus.is_empty() {
            return Self { usage: Reading::Unavailable, vram: Reading::Unavailable, temperature: Reading::Unavailable };
        }
        let usage = collect(gpus, |g| (g.key.clone(), g.load.take()));
        let vram = collect(gpus, |g| (g.key.clone(), g.vram.take()));
        let mut temps = GpuTemperature::new();
        let mut temperature = None;
        for g in gpus.iter_mut() {
            match g.temperature.take() {
                Reading::Available(c) => { temps.insert(g.label.clone(), Some(c)); }
                Reading::Unavailable => { temps.insert(g.label.clone(), None); }
                Reading::Failed(e) => {
                    temperature = Some(Reading::Failed(e));
                    break;
                }
            }
        }
        Self { usage, vram, temperature: temperature.unwrap_or(Reading::Available(temps)) }
    }
}

fn collect<T>(
    gpus: &mut [GpuStats],
    mut pick: impl FnMut(&mut GpuStats) -> (String, Reading<T>),
) -> Reading<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for g in gpus.iter_mut() {
        match pick(g) {
            (key, Reading::Available(v)) => { map.insert(key, v); }
            (_, Reading::Unavailable) => {}
            (_, Reading::Failed(e)) => return Reading::Failed(e),
        }
    }
    if map.is_empty() { Reading::Unavailable } else { Reading::Available(map) }
}

/// The enumerated GPUs plus the vendor library handle, opened once.
pub struct GpuInventory {
    #[cfg(feature = "nvidia")]
    nvml: Option<nvml_wrapper::Nvml>,
    devices: Vec<GpuDevice>,
}

impl GpuInventory {
    pub fn discover(settings: &Settings) -> Self {
        #[cfg(feature = "nvidia")]
        {
            let nvml = nvidia::init();
            let mut devices = match &nvml {
                Some(n) => nvidia::enumerate(n).unwrap_or_else(|e| {
                    warn!("NVML device enumeration failed: {e}");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            devices.extend(Self::drm_devices(&settings.drm_root));
            assign_keys(&mut devices);
            Self { nvml, devices }
        }
        #[cfg(not(feature = "nvidia"))]
        {
            Self::from_drm(&settings.drm_root)
        }
    }

    /// Only the sysfs drm devices under `root`, without touching NVML.
    pub fn from_drm(root: &Path) -> Self {
        Self::from_devices(Self::drm_devices(root))
    }

    pub fn from_devices(mut devices: Vec<GpuDevice>) -> Self {
        assign_keys(&mut devices);
        Self {
            #[cfg(feature = "nvidia")]
            nvml: None,
            devices,
        }
    }

    fn drm_devices(root: &Path) -> Vec<GpuDevice> {
        drm::enumerate(root).unwrap_or_else(|e| {
            warn!("drm device enumeration failed: {e}");
            Vec::new()
        })
    }

    pub fn devices(&self) -> &[GpuDevice] { &self.devices }
    pub fn is_empty(&self) -> bool { self.devices.is_empty() }

    pub fn load(&self, dev: &GpuDevice) -> Result<Option<Percent>, SensorError> {
        match &dev.backend {
            #[cfg(feature = "nvidia")]
            Backend::Nvml { index } => match &self.nvml {
                Some(n) => nvidia::load(n, *index).map(Some),
                None => Ok(None),
            },
            Backend::Drm { device } => drm::load(device),
        }
    }

    pub fn vram(&self, dev: &GpuDevice) -> Result<Option<VramUsage>, SensorError> {
        match &dev.backend {
            #[cfg(feature = "nvidia")]
            Backend::Nvml { index } => match &self.nvml {
                Some(n) => nvidia::vram(n, *index).map(Some),
                None => Ok(None),
            },
            Backend::Drm { device } => drm::vram(device),
        }
    }

    pub fn temperature(&self, dev: &GpuDevice, groups: &TempGroups) -> Result<Option<Celsius>, SensorError> {
        match dev.vendor {
            GpuVendor::Nvidia => self.nvidia_temperature(dev),
            GpuVendor::Amd => {
                let own = match &dev.backend {
                    Backend::Drm { device } => drm::temperature(device)?,
                    #[allow(unreachable_patterns)]
                    _ => None,
                };
                Ok(own.or_else(|| thermal::amdgpu_temperature(groups)))
            }
            GpuVendor::Unknown => Ok(None),
        }
    }

    #[cfg(feature = "nvidia")]
    fn nvidia_temperature(&self, dev: &GpuDevice) -> Result<Option<Celsius>, SensorError> {
        match (&dev.backend, &self.nvml) {
            (Backend::Nvml { index }, Some(n)) => nvidia::temperature(n, *index).map(Some),
            _ => Ok(None),
        }
    }

    #[cfg(not(feature = "nvidia"))]
    fn nvidia_temperature(&self, _dev: &GpuDevice) -> Result<Option<Celsius>, SensorError> {
        Ok(None)
    }

    pub fn read_all(&self, groups: &TempGroups) -> Vec<GpuStats> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, d)| GpuStats {
                key: d.key.clone(),
                label: temperature_label(i + 1, &d.name),
                load: self.load(d).into(),
                vram: self.vram(d).into(),
                temperature: self.temperature(d, groups).into(),
            })
            .collect()
    }

    /// Close the vendor library. Later queries on its devices report no data.
    pub fn shutdown(&mut self) {
        #[cfg(feature = "nvidia")]
        if self.nvml.take().is_some() {
            tracing::info!("NVML shut down");
        }
        debug!("GPU inventory released");
    }
}
