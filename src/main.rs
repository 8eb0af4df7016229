#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use procsight::{MonitorConfig, ProcessManagerApp};

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("procsight=info"))
        .init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = MonitorConfig::load_or_default(&MonitorConfig::config_path());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Process Manager",
        native_options,
        Box::new(|cc| Ok(Box::new(ProcessManagerApp::new(cc, config)))),
    )
}
