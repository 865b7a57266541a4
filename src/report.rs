//! Human-readable one-line-per-metric summary printed to stdout each cycle.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::sample::{Celsius, Sample, VramUsage};

const ABSENT: &str = "unavailable";

fn join_map<V>(map: &BTreeMap<String, V>, fmt_value: impl Fn(&V) -> String) -> String {
    if map.is_empty() {
        return ABSENT.to_string();
    }
    map.iter().map(|(k, v)| format!("{k}: {}", fmt_value(v))).collect::<Vec<_>>().join(", ")
}

fn optional<V>(map: Option<&BTreeMap<String, V>>, fmt_value: impl Fn(&V) -> String) -> String {
    map.map_or_else(|| ABSENT.to_string(), |m| join_map(m, fmt_value))
}

fn shown<T: Display>(v: &T) -> String { v.to_string() }

fn gpu_temperature(t: &Option<Celsius>) -> String {
    t.map_or_else(|| "no sensor".to_string(), |c| c.to_string())
}

fn vram(v: &VramUsage) -> String { format!("{} / {}", v.used, v.total) }

pub fn lines(sample: &Sample) -> Vec<String> {
    let ram = &sample.ram_usage;
    vec![
        format!("Cpu usage: {}", sample.cpu_usage),
        format!("CPU temperature: {}", optional(sample.cpu_temperature.as_ref(), shown)),
        format!("GPU usage: {}", optional(sample.gpu_usage.as_ref(), shown)),
        format!(
            "GPU Temperature: {}",
            optional(sample.gpu_temperature.as_ref(), gpu_temperature)
        ),
        format!("GPU VRAM Usage: {}", optional(sample.gpu_vram.as_ref(), vram)),
        format!(
            "RAM usage: {} used of {} ({} available, {})",
            ram.used, ram.total, ram.available, ram.percent
        ),
    ]
}

pub fn print(sample: &Sample) {
    for line in lines(sample) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{GpuTemperature, Percent, RamUsage};
    use chrono::NaiveDate;

    #[test]
    fn absent_metrics_are_marked() {
        let mut gpu_temperature = GpuTemperature::new();
        gpu_temperature.insert("GPU 1 : Arc".into(), None);
        let mut cpu = BTreeMap::new();
        cpu.insert("Core 0".to_string(), Celsius::new(50.0));
        let s = Sample {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            cpu_usage: Percent::new(9.5),
            cpu_temperature: Some(cpu),
            gpu_usage: None,
            gpu_vram: None,
            gpu_temperature: Some(gpu_temperature),
            ram_usage: RamUsage::from_bytes(1024 * 1024 * 200, 1024 * 1024 * 50, 1024 * 1024 * 150),
        };
        let l = lines(&s);
        assert_eq!(l.len(), 6);
        assert_eq!(l[0], "Cpu usage: 9.5%");
        assert_eq!(l[1], "CPU temperature: Core 0: 50.0 °C");
        assert_eq!(l[2], "GPU usage: unavailable");
        assert_eq!(l[3], "GPU Temperature: GPU 1 : Arc: no sensor");
        assert_eq!(l[5], "RAM usage: 50.00 MB used of 200.00 MB (150.00 MB available, 25.0%)");
    }
}
