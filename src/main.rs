mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::ClimateLensApp;
use climate_lens::config::ChartConfig;
use eframe::egui;
use state::AppState;

/// Usage: `climate-lens [DATA_FILE] [CONFIG_JSON]`
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let data_path = args.next();
    let config = match args.next() {
        Some(path) => ChartConfig::from_path(&path)
            .with_context(|| format!("loading chart config {}", path.display()))?,
        None => ChartConfig::default(),
    };

    let mut state = AppState::new(config);
    if let Some(path) = data_path {
        state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Climate Lens – Indicator Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ClimateLensApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
