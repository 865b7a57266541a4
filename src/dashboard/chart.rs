use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotBounds, PlotPoints};
use tracing::info;

use super::{Monitor, PanelRanges};
use crate::axis::AxisRange;
use crate::config::Settings;
use crate::window::RollingWindow;

pub const TITLE: &str = "Hardware Telemetry";

// ===================== Theme colors =====================
fn theme_color(key: &str) -> Color32 {
    match key {
        "gpu" => Color32::from_rgb(30, 160, 220),   // blue
        "temp" => Color32::from_rgb(220, 30, 30),   // red
        "ram" => Color32::from_rgb(20, 180, 90),    // green
        "vram" => Color32::from_rgb(150, 60, 180),  // purple
        _ => Color32::LIGHT_GRAY,
    }
}

pub struct ChartApp {
    monitor: Monitor,
    sample_period: Duration,
    last_tick: Option<Instant>,
    last_error: Option<String>,
}

impl ChartApp {
    pub fn new(settings: &Settings) -> Self {
        info!("starting chart, {} samples of history", settings.history_len);
        Self { monitor: Monitor::new(settings), sample_period: settings.sample_period, last_tick: None, last_error: None }
    }

    fn maybe_tick(&mut self) {
        if self.last_tick.is_some_and(|t| t.elapsed() < self.sample_period) { return; }
        self.last_tick = Some(Instant::now());
        self.last_error = self.monitor.tick().err().map(|e| e.to_string());
    }

    fn headline(&self, ui: &mut egui::Ui) {
        let d = self.monitor.dashboard();
        let l = d.latest();
        ui.horizontal(|ui| {
            ui.heading(TITLE);
            ui.separator();
            ui.colored_label(theme_color("gpu"), RichText::new(format!("GPU: {:.0}%", l.gpu_load)).strong());
            ui.separator();
            ui.colored_label(theme_color("temp"), RichText::new(format!("GPU temp: {:.0} °C", l.gpu_temperature)).strong());
            ui.separator();
            ui.colored_label(theme_color("ram"), RichText::new(format!("RAM: {:.1}%", l.ram_percent)).strong());
            ui.separator();
            ui.colored_label(theme_color("vram"), RichText::new(format!("VRAM: {:.1}%", l.vram_percent)).strong());
            ui.separator();
            ui.label(format!("Samples: {}", d.ticks()));
            if d.skipped() > 0 { ui.label(format!("(skipped {})", d.skipped())); }
        });
        if let Some(err) = &self.last_error {
            ui.colored_label(Color32::YELLOW, err);
        }
    }

    fn panels(&self, ui: &mut egui::Ui, ranges: PanelRanges) {
        let d = self.monitor.dashboard();
        let height = ((ui.available_height() - 3.0 * 24.0) / 3.0).max(80.0);
        history_plot(ui, "gpu_temp", "GPU Temperature (°C)", &d.gpu_temperature, ranges.gpu_temperature, theme_color("temp"), height);
        history_plot(ui, "ram", "RAM Usage (%)", &d.ram, ranges.ram, theme_color("ram"), height);
        history_plot(ui, "vram", "VRAM Usage (%)", &d.vram, ranges.vram, theme_color("vram"), height);
    }
}

/// Time left until the next tick is due, measured from when the last one started.
fn until_next_tick(last_tick: Option<Instant>, period: Duration) -> Duration {
    last_tick.map_or(Duration::ZERO, |t| period.saturating_sub(t.elapsed()))
}

fn history_plot(
    ui: &mut egui::Ui,
    id: &str,
    title: &str,
    series: &RollingWindow<f64>,
    range: AxisRange,
    color: Color32,
    height: f32,
) {
    ui.label(RichText::new(title).strong());
    let x_max = series.capacity().saturating_sub(1) as f64;
    Plot::new(id)
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, range.min], [x_max, range.max]));
            plot_ui.line(Line::new(PlotPoints::from(series.points())).name(title).color(color));
        });
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maybe_tick();
        ctx.request_repaint_after(until_next_tick(self.last_tick, self.sample_period));

        egui::TopBottomPanel::top("headline").show(ctx, |ui| self.headline(ui));
        let ranges = self.monitor.dashboard().ranges();
        egui::CentralPanel::default().show(ctx, |ui| self.panels(ui, ranges));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("chart closed after {} samples", self.monitor.dashboard().ticks());
        self.monitor.shutdown();
    }
}

// ===================== Entry =====================
/// Open the window and run until the user closes it. The sensors (and NVML)
/// are released in `on_exit`, or when the app is dropped.
pub fn run(settings: Settings) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 820.0])
            .with_min_inner_size([600.0, 500.0])
            .with_title(TITLE),
        ..Default::default()
    };
    eframe::run_native(TITLE, options, Box::new(move |_cc| Ok(Box::new(ChartApp::new(&settings)))))
}
