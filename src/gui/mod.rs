//! GUI module for the TV guide.
//!
//! This module contains the egui-based user interface components
//! including the main application window, the guide widget, the
//! background logo loader and the error dialog.

mod app;
mod dialogs;
mod epg_widget;
mod logo_loader;

pub use app::TvGuideApp;
