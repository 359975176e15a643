//! TV Guide - A scrollable electronic program guide.

mod core;
mod gui;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::core::config::AppSettings;
use gui::TvGuideApp;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tv_epg=info")),
        )
        .init();

    let settings = AppSettings::load();
    let (width, height) = settings.window_size.unwrap_or((1024.0, 768.0));
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "TV Guide",
        options,
        Box::new(|cc| Ok(Box::new(TvGuideApp::new(cc, settings, initial_file)))),
    )
}
