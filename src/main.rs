mod app;
mod config;
mod data;
mod processing;
mod state;
mod ui;

use app::QuadrantApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Quadrant")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Quadrant",
        options,
        Box::new(|cc| Ok(Box::new(QuadrantApp::new(cc)))),
    )
}
