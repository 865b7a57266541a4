use std::fs;
use std::path::Path;

use hwsampler::sample::Celsius;
use hwsampler::sensors::gpu::{GpuFamilies, GpuInventory, GpuVendor};
use hwsampler::sensors::thermal::{cpu_temperature, ThermalScanner};
use hwsampler::sensors::Reading;
use tempfile::tempdir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_scan_groups_hwmon_chips_and_thermal_zones() {
    let root = tempdir().unwrap();
    let hwmon = root.path().join("hwmon");
    let thermal = root.path().join("thermal");
    write(&hwmon.join("hwmon0/name"), "coretemp\n");
    write(&hwmon.join("hwmon0/temp1_input"), "52000\n");
    write(&hwmon.join("hwmon0/temp1_label"), "Package id 0\n");
    write(&hwmon.join("hwmon0/temp2_input"), "49000\n");
    write(&hwmon.join("hwmon0/temp2_label"), "Core 0\n");
    write(&hwmon.join("hwmon1/name"), "nvme\n");
    write(&hwmon.join("hwmon1/temp1_input"), "38800\n");
    write(&thermal.join("thermal_zone0/temp"), "27800\n");
    write(&thermal.join("thermal_zone0/type"), "acpitz\n");
    write(&thermal.join("cooling_device0/type"), "Processor\n");

    let groups = ThermalScanner::new(&hwmon, &thermal).scan().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups["coretemp"].len(), 2);
    assert_eq!(groups["nvme"][0].label, "");
    assert_eq!(groups["nvme"][0].current, Celsius::new(38.8));
    assert_eq!(groups["thermal_zone0"][0].label, "");

    let Reading::Available(cpu) = cpu_temperature(&groups) else { panic!("expected CPU temperature") };
    assert_eq!(cpu["Package id 0"], Celsius::new(52.0));
    assert_eq!(cpu["Core 0"], Celsius::new(49.0));
}

#[test]
fn test_thermal_zone0_fallback_is_keyed_cpu() {
    let root = tempdir().unwrap();
    let thermal = root.path().join("thermal");
    write(&thermal.join("thermal_zone0/temp"), "27800\n");
    write(&thermal.join("thermal_zone0/type"), "acpitz\n");
    write(&thermal.join("thermal_zone1/temp"), "45000\n");
    write(&thermal.join("thermal_zone1/type"), "x86_pkg_temp\n");

    let groups = ThermalScanner::new(&root.path().join("hwmon"), &thermal).scan().unwrap();
    let Reading::Available(cpu) = cpu_temperature(&groups) else { panic!("expected CPU temperature") };
    assert_eq!(cpu.len(), 1);
    assert_eq!(cpu["CPU"], Celsius::new(27.8));
}

#[test]
fn test_missing_cpu_sensors_yield_unavailable() {
    let root = tempdir().unwrap();
    let hwmon = root.path().join("hwmon");
    write(&hwmon.join("hwmon0/name"), "nvme\n");
    write(&hwmon.join("hwmon0/temp1_input"), "40000\n");
    let groups = ThermalScanner::new(&hwmon, &root.path().join("absent")).scan().unwrap();
    assert!(matches!(cpu_temperature(&groups), Reading::Unavailable));
}

#[test]
fn test_missing_sysfs_roots_are_empty_not_errors() {
    let root = tempdir().unwrap();
    let groups = ThermalScanner::new(&root.path().join("a"), &root.path().join("b")).scan().unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_unreadable_sensor_value_is_skipped() {
    let root = tempdir().unwrap();
    let hwmon = root.path().join("hwmon");
    write(&hwmon.join("hwmon0/name"), "coretemp\n");
    write(&hwmon.join("hwmon0/temp1_input"), "n/a\n");
    write(&hwmon.join("hwmon0/temp2_input"), "47000\n");
    let groups = ThermalScanner::new(&hwmon, &root.path().join("none")).scan().unwrap();
    assert_eq!(groups["coretemp"].len(), 1);
    let Reading::Available(cpu) = cpu_temperature(&groups) else { panic!("expected CPU temperature") };
    assert_eq!(cpu["CPU"], Celsius::new(47.0));
}

fn amd_card(drm: &Path, card: &str) {
    let dev = drm.join(card).join("device");
    write(&dev.join("vendor"), "0x1002\n");
    write(&dev.join("gpu_busy_percent"), "42\n");
    write(&dev.join("mem_info_vram_used"), &(2u64 << 30).to_string());
    write(&dev.join("mem_info_vram_total"), &(8u64 << 30).to_string());
    write(&dev.join("hwmon/hwmon3/name"), "amdgpu\n");
    write(&dev.join("hwmon/hwmon3/temp1_input"), "63000\n");
    write(&dev.join("hwmon/hwmon3/temp1_label"), "edge\n");
}

#[test]
fn test_drm_enumerates_amd_and_skips_nvidia() {
    let root = tempdir().unwrap();
    let drm = root.path().join("drm");
    amd_card(&drm, "card0");
    write(&drm.join("card1/device/vendor"), "0x10de\n");
    write(&drm.join("card0-DP-1/status"), "connected\n");
    write(&drm.join("renderD128/dev"), "226:128\n");

    let inv = GpuInventory::from_drm(&drm);
    assert_eq!(inv.devices().len(), 1);
    let dev = &inv.devices()[0];
    assert_eq!(dev.vendor, GpuVendor::Amd);
    assert_eq!(dev.name, "AMD Radeon GPU (card0)");
}

#[test]
fn test_unreadable_card_does_not_hide_the_others() {
    let root = tempdir().unwrap();
    let drm = root.path().join("drm");
    fs::create_dir_all(drm.join("card0/device/vendor")).unwrap();
    amd_card(&drm, "card1");

    let inv = GpuInventory::from_drm(&drm);
    assert_eq!(inv.devices().len(), 1);
    assert_eq!(inv.devices()[0].name, "AMD Radeon GPU (card1)");
}

#[test]
fn test_amd_readings_from_sysfs() {
    let root = tempdir().unwrap();
    let drm = root.path().join("drm");
    amd_card(&drm, "card0");
    write(&drm.join("card0/device/product_name"), "Radeon RX 6800\n");

    let inv = GpuInventory::from_drm(&drm);
    let mut stats = inv.read_all(&Default::default());
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].label, "GPU 1 : Radeon RX 6800");

    let f = GpuFamilies::split(&mut stats);
    let Reading::Available(usage) = f.usage else { panic!("expected usage") };
    assert_eq!(usage["Radeon RX 6800"].value(), 42.0);
    let Reading::Available(vram) = f.vram else { panic!("expected vram") };
    assert_eq!(vram["Radeon RX 6800"].percent(), 25.0);
    let Reading::Available(temps) = f.temperature else { panic!("expected temperature") };
    assert_eq!(temps["GPU 1 : Radeon RX 6800"], Some(Celsius::new(63.0)));
}

#[test]
fn test_no_gpus_means_no_gpu_families() {
    let root = tempdir().unwrap();
    let inv = GpuInventory::from_drm(&root.path().join("drm"));
    assert!(inv.is_empty());
    let mut stats = inv.read_all(&Default::default());
    let f = GpuFamilies::split(&mut stats);
    assert!(matches!(f.usage, Reading::Unavailable));
    assert!(matches!(f.vram, Reading::Unavailable));
    assert!(matches!(f.temperature, Reading::Unavailable));
}

#[test]
fn test_corrupt_busy_percent_fails_usage_only() {
    let root = tempdir().unwrap();
    let drm = root.path().join("drm");
    amd_card(&drm, "card0");
    write(&drm.join("card0/device/gpu_busy_percent"), "busy\n");

    let inv = GpuInventory::from_drm(&drm);
    let mut stats = inv.read_all(&Default::default());
    assert!(stats[0].load.error().is_some());
    let f = GpuFamilies::split(&mut stats);
    assert!(matches!(f.usage, Reading::Failed(_)));
    assert!(f.vram.is_available());
}
