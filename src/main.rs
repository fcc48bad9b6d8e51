//! Share Price Dashboard
//!
//! Loads daily share prices for a handful of companies, shows the formatted
//! table, per-company average prices and three charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use anyhow::anyhow;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use env_logger::Env;
use gui::DashboardApp;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .init();
    log::info!("Starting dashboard with data file {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([900.0, 600.0])
            .with_title(&config.title),
        ..Default::default()
    };

    // Run the application
    let app_name = config.title.clone();
    eframe::run_native(
        &app_name,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("Dashboard window failed: {e}"))
}
