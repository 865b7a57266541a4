//! One timestamped snapshot of every monitored metric, plus the unit types
//! that give the log its `"12.5%"` / `"48.0 °C"` / `"1024.00 MB"` strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn round_to(v: f64, decimals: i32) -> f64 {
    let k = 10f64.powi(decimals);
    (v * k).round() / k
}

// Each unit rounds on construction so the formatted text parses back to the same value.
macro_rules! unit {
    ($name:ident, $decimals:expr, $suffix:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
        pub struct $name(f64);

        impl $name {
            pub fn new(v: f64) -> Self { Self(round_to(v, $decimals)) }
            pub fn value(self) -> f64 { self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.*}{}", $decimals as usize, self.0, $suffix)
            }
        }

        impl FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let num = s.trim().strip_suffix($suffix).ok_or_else(|| format!("missing {:?} suffix in {:?}", $suffix, s))?;
                num.trim().parse::<f64>().map(Self::new).map_err(|e| format!("{s:?}: {e}"))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

unit!(Percent, 1, "%");
unit!(Celsius, 1, " °C");
unit!(Megabytes, 2, " MB");

impl Megabytes {
    pub fn from_bytes(bytes: u64) -> Self { Self::new(bytes as f64 / BYTES_PER_MB) }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RamUsage {
    #[serde(rename = "Total RAM")]
    pub total: Megabytes,
    #[serde(rename = "Used RAM")]
    pub used: Megabytes,
    #[serde(rename = "Available RAM")]
    pub available: Megabytes,
    #[serde(rename = "RAM Usage")]
    pub percent: Percent,
}

impl RamUsage {
    pub fn from_bytes(total: u64, used: u64, available: u64) -> Self {
        let used = used.min(total);
        let percent = if total > 0 { used as f64 / total as f64 * 100.0 } else { 0.0 };
        Self {
            total: Megabytes::from_bytes(total),
            used: Megabytes::from_bytes(used),
            available: Megabytes::from_bytes(available),
            percent: Percent::new(percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VramUsage {
    #[serde(rename = "Used")]
    pub used: Megabytes,
    #[serde(rename = "Total")]
    pub total: Megabytes,
}

impl VramUsage {
    pub fn from_bytes(used: u64, total: u64) -> Self {
        Self { used: Megabytes::from_bytes(used.min(total)), total: Megabytes::from_bytes(total) }
    }

    pub fn percent(&self) -> f64 {
        if self.total.value() > 0.0 { self.used.value() / self.total.value() * 100.0 } else { 0.0 }
    }
}

pub type CpuTemperature = BTreeMap<String, Celsius>;
pub type GpuUsage = BTreeMap<String, Percent>;
pub type GpuVram = BTreeMap<String, VramUsage>;
/// `None` values mark GPUs whose vendor offers no temperature source.
pub type GpuTemperature = BTreeMap<String, Option<Celsius>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "Timestamp", with = "timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "CPU Usage")]
    pub cpu_usage: Percent,
    #[serde(rename = "CPU Temperature")]
    pub cpu_temperature: Option<CpuTemperature>,
    #[serde(rename = "GPU Usage")]
    pub gpu_usage: Option<GpuUsage>,
    #[serde(rename = "GPU VRAM")]
    pub gpu_vram: Option<GpuVram>,
    #[serde(rename = "GPU Temperature")]
    pub gpu_temperature: Option<GpuTemperature>,
    #[serde(rename = "RAM Usage")]
    pub ram_usage: RamUsage,
}

/// Local wall-clock time at whole-second resolution, matching the log format.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
