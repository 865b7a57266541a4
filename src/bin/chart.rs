use hwsampler::dashboard::chart;
use hwsampler::Settings;
use tracing::error;

fn main() -> eframe::Result<()> {
    hwsampler::init_tracing();
    chart::run(Settings::default()).inspect_err(|e| error!("display failed to start: {e}"))
}
