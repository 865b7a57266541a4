use hwsampler::logger::SampleLogger;
use hwsampler::sensors::Sensors;
use hwsampler::{report, LogError, Settings};
use tracing::info;

// ===================== Entry =====================
fn main() -> Result<(), LogError> {
    hwsampler::init_tracing();
    let settings = Settings::default();

    let mut sensors = Sensors::new(&settings);
    let sample = sensors.snapshot().into_sample();
    report::print(&sample);

    let logger = SampleLogger::new(settings.log_path());
    logger.append(&sample)?;
    info!("sample appended to {}", logger.path().display());
    Ok(())
}
