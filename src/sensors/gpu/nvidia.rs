use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, error::NvmlError, Nvml};
use tracing::debug;

use super::GpuDevice;
use crate::error::SensorError;
use crate::sample::{Celsius, Percent, VramUsage};

/// Open NVML. `None` when the driver or library is absent.
pub fn init() -> Option<Nvml> {
    match Nvml::init() {
        Ok(nvml) => {
            debug!("NVML initialised");
            Some(nvml)
        }
        Err(e) => {
            debug!("NVML not available: {e}");
            None
        }
    }
}

pub fn enumerate(nvml: &Nvml) -> Result<Vec<GpuDevice>, NvmlError> {
    let count = nvml.device_count()?;
    let mut out = Vec::with_capacity(count as usize);
    for index in 0..count {
        let name = nvml.device_by_index(index)?.name()?;
        debug!("NVML device {index}: {name}");
        out.push(GpuDevice::nvml(index, name));
    }
    Ok(out)
}

pub fn load(nvml: &Nvml, index: u32) -> Result<Percent, SensorError> {
    let util = nvml.device_by_index(index)?.utilization_rates()?;
    Ok(Percent::new(util.gpu as f64))
}

pub fn vram(nvml: &Nvml, index: u32) -> Result<VramUsage, SensorError> {
    let mem = nvml.device_by_index(index)?.memory_info()?;
    Ok(VramUsage::from_bytes(mem.used, mem.total))
}

pub fn temperature(nvml: &Nvml, index: u32) -> Result<Celsius, SensorError> {
    let t = nvml.device_by_index(index)?.temperature(TemperatureSensor::Gpu)?;
    Ok(Celsius::new(t as f64))
}
