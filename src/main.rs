mod app;
mod color;
mod config;
mod data;
mod prepare;
mod session;
mod ui;

use std::path::Path;

use app::GeologApp;
use config::PipelineConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: path to a JSON pipeline config.
    let config = match std::env::args().nth(1) {
        Some(path) => match PipelineConfig::from_json_file(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Ignoring config {path}: {e:#}");
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };
    log::info!("Pipeline config: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Geology Data Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(GeologApp::new(config)))),
    )
}
