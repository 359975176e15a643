//! Main application state and GUI logic.
//!
//! This module defines the main application struct and implements the eframe::App trait
//! to host the program guide widget, listings loading and user feedback.

use eframe::egui::{self, TextureHandle};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::core::config::AppSettings;
use crate::core::epg::Epg;
use crate::core::error::{AppError, from_io_error, from_parse_error};
use crate::core::gesture::{HitResult, InteractionListener};
use crate::core::mock::demo_listings;
use crate::core::model::{Channel, EpgData, Event, Millis};
use crate::core::parser;
use crate::core::time_format::short_time;

use super::dialogs::{ErrorDialog, ErrorDialogAction};
use super::epg_widget::EpgWidget;
use super::logo_loader::LogoLoader;

/// Listings file extensions accepted by the open dialog and drag and drop.
const LISTINGS_EXTENSIONS: [&str; 1] = ["json"];

/// Current wall-clock time.
fn now_millis() -> Millis {
    chrono::Utc::now().timestamp_millis()
}

/// What the central panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AppState {
    /// Nothing loaded yet (initial state)
    #[default]
    NoListings,
    /// Listings loaded, the guide is showing
    Ready {
        /// Where the listings came from, for the toolbar
        source: String,
    },
}

impl AppState {
    /// Returns true if the guide has data to show.
    pub fn has_listings(&self) -> bool {
        matches!(self, AppState::Ready { .. })
    }
}

/// Kind of status message to display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusKind {
    /// Success message (shown in green)
    Success,
    /// Error message (shown in red)
    Error,
}

/// A status message with its kind and timestamp.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    /// The message text
    pub text: String,
    /// Kind of message (success/error)
    pub kind: StatusKind,
    /// When the message was created (for auto-dismiss)
    pub created_at: std::time::Instant,
}

impl StatusMessage {
    /// Create a new status message.
    pub fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: std::time::Instant::now(),
        }
    }

    /// Duration to show status messages before auto-dismissing.
    const DISPLAY_DURATION: std::time::Duration = std::time::Duration::from_secs(5);

    /// Check if the message should still be displayed.
    pub fn is_visible(&self) -> bool {
        self.created_at.elapsed() < Self::DISPLAY_DURATION
    }
}

/// Collects guide clicks for the status bar.
#[derive(Debug, Default)]
struct ClickFeedback {
    message: Option<String>,
    reset_requested: bool,
}

impl InteractionListener for ClickFeedback {
    fn on_channel_clicked(&mut self, index: usize, channel: &Channel) {
        self.message = Some(format!("{} (#{})", channel.name, index + 1));
    }

    fn on_event_clicked(&mut self, _channel: usize, _event: usize, data: &Event) {
        self.message = Some(format!(
            "{}  {} - {}",
            data.title,
            short_time(data.start),
            short_time(data.end)
        ));
    }

    fn on_reset_clicked(&mut self) {
        self.reset_requested = true;
    }
}

/// Main application state and GUI logic.
pub struct TvGuideApp {
    /// Current application state
    state: AppState,
    /// Persisted settings
    settings: AppSettings,
    /// The guide engine
    epg: Epg<TextureHandle>,
    /// Background logo fetcher
    logo_loader: LogoLoader,
    /// Path to the currently loaded listings file
    loaded_file_path: Option<PathBuf>,
    /// Status message to display (success/error notifications)
    status_message: Option<StatusMessage>,
    /// Modal error dialog
    error_dialog: ErrorDialog,
}

impl TvGuideApp {
    /// Create a new application instance, optionally loading `initial_file`.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        initial_file: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            state: AppState::NoListings,
            epg: Epg::new(settings.epg.clone(), now_millis()),
            logo_loader: LogoLoader::new(&cc.egui_ctx),
            settings,
            loaded_file_path: None,
            status_message: None,
            error_dialog: ErrorDialog::new(),
        };
        if let Some(path) = initial_file {
            app.load_file(path);
        }
        app
    }

    /// Open a file dialog and load the selected listings file.
    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Program Listings", &LISTINGS_EXTENSIONS)
            .set_title("Open Program Listings")
            .pick_file()
        {
            self.load_file(path);
        }
    }

    /// Load a listings file from the given path.
    fn load_file(&mut self, path: PathBuf) {
        match read_listings(&path) {
            Ok(listings) => {
                let name = display_name(&path);
                let channel_count = listings.channel_count();
                let event_count = listings.event_count();
                info!(path = %path.display(), channel_count, event_count, "listings loaded");

                self.epg.set_data(Box::new(listings), now_millis());
                self.settings.add_recent_file(path.clone());
                self.loaded_file_path = Some(path);
                self.state = AppState::Ready {
                    source: name.clone(),
                };
                self.set_status(
                    format!(
                        "Loaded: {} ({} channels, {} events)",
                        name, channel_count, event_count
                    ),
                    StatusKind::Success,
                );
            }
            Err(error) => self.show_error(error),
        }
    }

    /// Replace the guide data with generated demo listings.
    fn load_demo(&mut self) {
        let now = now_millis();
        let listings = demo_listings(&self.settings.epg, now);
        let channel_count = listings.channel_count();

        self.epg.set_data(Box::new(listings), now);
        self.loaded_file_path = None;
        self.state = AppState::Ready {
            source: "Demo listings".to_string(),
        };
        self.set_status(
            format!("Loaded demo listings ({} channels)", channel_count),
            StatusKind::Success,
        );
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status_message = Some(StatusMessage::new(text, kind));
    }

    /// Report an error in the dialog and the status bar.
    fn show_error(&mut self, error: AppError) {
        warn!("{}", error.detailed_info().replace('\n', "; "));
        self.set_status(error.brief_description(), StatusKind::Error);
        self.error_dialog.show(error);
    }

    fn jump_to_now(&mut self, ctx: &egui::Context) {
        self.epg.reset_to_now(now_millis(), true);
        ctx.request_repaint();
    }

    /// Remember the window size so the next start restores it.
    fn track_window_size(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.set_window_size(rect.width(), rect.height());
        }
    }

    /// Load the first listings file dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });
        if let Some(path) = dropped {
            self.load_file(path);
        }
    }

    /// Handle keyboard navigation of the guide.
    ///
    /// Home jumps to "now", the arrow keys move by one label interval or one
    /// channel row.
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        if !self.state.has_listings() || self.error_dialog.is_open() {
            return;
        }

        let axis = self.epg.axis();
        let step_x = (self.settings.epg.label_spacing_millis() / axis.millis_per_pixel()).max(1);
        let step_y = axis.row_pitch();

        let (home, left, right, up, down) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Home),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
            )
        });

        if home {
            self.jump_to_now(ctx);
        }
        let dx = step_x * (i64::from(right) - i64::from(left));
        let dy = step_y * (i64::from(down) - i64::from(up));
        if dx != 0 || dy != 0 {
            self.epg.scroll_by(dx, dy);
        }
    }

    /// Turn a resolved tap into status feedback or a jump to "now".
    fn handle_hit(&mut self, ctx: &egui::Context, hit: HitResult) {
        if hit == HitResult::None {
            return;
        }
        let mut feedback = ClickFeedback::default();
        self.epg.deliver(hit, &mut feedback);

        if feedback.reset_requested {
            self.jump_to_now(ctx);
        }
        if let Some(message) = feedback.message {
            self.set_status(message, StatusKind::Success);
        }
    }
}

impl eframe::App for TvGuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.track_window_size(ctx);
        self.handle_dropped_files(ctx);
        self.handle_keyboard_shortcuts(ctx);

        self.render_toolbar(ctx);
        self.render_error_dialog(ctx);
        self.render_guide(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.epg.clear_image_cache();
        if let Err(e) = self.settings.save() {
            error!("{}", e.brief_description());
        }
    }
}

impl TvGuideApp {
    /// Render the top toolbar section.
    ///
    /// Contains listings loading, the recent files menu and the jump to "now".
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        let has_listings = self.state.has_listings();
        let recent_files = self.settings.recent_files.clone();
        let mut open_recent: Option<PathBuf> = None;

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("TV Guide");
                ui.separator();

                if ui.button("📂 Open Listings").clicked() {
                    self.open_file_dialog();
                }

                ui.add_enabled_ui(!recent_files.is_empty(), |ui| {
                    ui.menu_button("Recent", |ui| {
                        for path in &recent_files {
                            if ui.button(display_name(path)).clicked() {
                                open_recent = Some(path.clone());
                                ui.close();
                            }
                        }
                    });
                });

                if ui.button("Demo Data").clicked() {
                    self.load_demo();
                }

                ui.separator();

                ui.add_enabled_ui(has_listings, |ui| {
                    if ui
                        .button("Jump to Now")
                        .on_hover_text("Home")
                        .clicked()
                    {
                        self.jump_to_now(ctx);
                    }
                });

                if let AppState::Ready { source } = &self.state {
                    ui.separator();
                    ui.label(source);
                }

                // Show status message in toolbar (right-aligned)
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_status_message(ui);
                });
            });
        });

        if let Some(path) = open_recent {
            self.load_file(path);
        }
    }

    /// Render the status message if one is active.
    fn render_status_message(&mut self, ui: &mut egui::Ui) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|msg| !msg.is_visible())
        {
            self.status_message = None;
            return;
        }

        let Some(msg) = &self.status_message else {
            return;
        };
        let color = match msg.kind {
            StatusKind::Success => self.settings.colors.status_success_color(),
            StatusKind::Error => self.settings.colors.status_error_color(),
        };
        let text = msg.text.clone();

        let mut dismiss_clicked = false;
        ui.horizontal(|ui| {
            if ui.small_button("✕").clicked() {
                dismiss_clicked = true;
            }
            ui.colored_label(color, text);
        });
        if dismiss_clicked {
            self.status_message = None;
        }
    }

    /// Render the error dialog and act on its buttons.
    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let retry_path = self
            .error_dialog
            .error()
            .and_then(|e| e.file_path().cloned());
        let success_color = self.settings.colors.status_success_color();

        if let Some(ErrorDialogAction::Retry) = self.error_dialog.render(ctx, success_color)
            && let Some(path) = retry_path
        {
            self.load_file(path);
        }
    }

    /// Render the central guide area.
    fn render_guide(&mut self, ctx: &egui::Context) {
        let mut hit = HitResult::None;

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                if !self.state.has_listings() {
                    self.render_no_listings_placeholder(ui);
                    return;
                }
                hit = EpgWidget::new(
                    &mut self.epg,
                    &self.logo_loader,
                    &self.settings.colors,
                    now_millis(),
                )
                .interactive(!self.error_dialog.is_open())
                .show(ui);
            });

        self.handle_hit(ctx, hit);
    }

    /// Render the placeholder view when no listings are loaded.
    fn render_no_listings_placeholder(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);

            ui.heading("📺 No Listings Loaded");
            ui.add_space(10.0);
            ui.label("Drag and drop a listings file (.json) to get started.");
            ui.label("Or use the \"Open Listings\" button in the toolbar.");

            ui.add_space(20.0);
            if ui.button("Show Demo Listings").clicked() {
                self.load_demo();
            }
        });
    }
}

/// Read and parse a listings file, mapping failures to user-facing errors.
fn read_listings(path: &PathBuf) -> Result<crate::core::model::Listings, AppError> {
    let has_listings_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            LISTINGS_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    if !has_listings_extension {
        return Err(AppError::UnsupportedFileType {
            path: path.clone(),
            expected: LISTINGS_EXTENSIONS.iter().map(|e| format!(".{e}")).collect(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| from_io_error(path.clone(), e))?;
    parser::parse_json(&content).map_err(|e| from_parse_error(Some(path.clone()), &e))
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "listings".to_string())
}
