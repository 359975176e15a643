//! Modal error dialog for listings and settings failures.

use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::error::AppError;

/// How long the "copied" note stays next to the copy button.
const COPIED_NOTE_DURATION: Duration = Duration::from_secs(2);

/// What the user chose in the error dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDialogAction {
    /// Load the same listings file again
    Retry,
    Close,
}

/// Open/closed state of the error dialog.
#[derive(Debug, Clone, Default)]
pub struct ErrorDialog {
    error: Option<AppError>,
    details_expanded: bool,
    copied_at: Option<Instant>,
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog for `error`, replacing any error already shown.
    pub fn show(&mut self, error: AppError) {
        *self = Self {
            error: Some(error),
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    fn copied_note_visible(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_NOTE_DURATION)
    }

    /// Draw the dialog if it is open. Returns the button the user clicked.
    pub fn render(&mut self, ctx: &egui::Context, success_color: egui::Color32) -> Option<ErrorDialogAction> {
        let error = self.error.as_ref()?;
        let title = error.dialog_title();
        let brief = error.brief_description();
        let detailed = error.detailed_info();
        let can_retry = error.supports_retry();

        let screen_rect = ctx.input(|i| i.viewport_rect());
        ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("error_dialog_overlay"),
        ))
        .rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(150));

        let mut action = None;

        egui::Window::new(format!("⚠ {}", title))
            .id(egui::Id::new("error_dialog"))
            .collapsible(false)
            .resizable(true)
            .default_width(450.0)
            .min_width(350.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(egui::RichText::new(&brief).size(14.0));
                ui.add_space(12.0);

                let header = if self.details_expanded {
                    "▼ Details"
                } else {
                    "▶ Details"
                };
                if ui.add(egui::Button::new(header).frame(false)).clicked() {
                    self.details_expanded = !self.details_expanded;
                }

                if self.details_expanded {
                    ui.add_space(4.0);
                    egui::Frame::new()
                        .fill(egui::Color32::from_gray(30))
                        .inner_margin(8.0)
                        .corner_radius(4.0)
                        .show(ui, |ui| {
                            ui.style_mut().override_font_id = Some(egui::FontId::monospace(12.0));
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(&detailed).color(egui::Color32::LIGHT_GRAY),
                                )
                                .wrap(),
                            );
                        });
                }

                ui.add_space(12.0);
                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .button("📋 Copy Error")
                        .on_hover_text("Copy error details to clipboard")
                        .clicked()
                    {
                        ui.ctx().copy_text(detailed.clone());
                        self.copied_at = Some(Instant::now());
                    }
                    if self.copied_note_visible() {
                        ui.colored_label(success_color, "Copied");
                        // Repaint until the note expires
                        ctx.request_repaint_after(COPIED_NOTE_DURATION);
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            action = Some(ErrorDialogAction::Close);
                        }
                        if can_retry
                            && ui
                                .button("🔄 Retry")
                                .on_hover_text("Try loading the listings again")
                                .clicked()
                        {
                            action = Some(ErrorDialogAction::Retry);
                        }
                    });
                });

                ui.add_space(4.0);
            });

        if action.is_some() {
            self.close();
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn missing_file() -> AppError {
        AppError::FileNotFound {
            path: PathBuf::from("/test/guide.json"),
        }
    }

    #[test]
    fn test_new_dialog_is_closed() {
        let dialog = ErrorDialog::new();
        assert!(!dialog.is_open());
        assert!(dialog.error().is_none());
    }

    #[test]
    fn test_show_then_close() {
        let mut dialog = ErrorDialog::new();
        dialog.show(missing_file());
        assert!(dialog.is_open());
        assert_eq!(dialog.error().map(|e| e.dialog_title()), Some("File Not Found"));

        dialog.close();
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_show_resets_previous_state() {
        let mut dialog = ErrorDialog::new();
        dialog.show(missing_file());
        dialog.details_expanded = true;
        dialog.copied_at = Some(Instant::now());

        dialog.show(AppError::SettingsSaveError {
            reason: "read-only".to_string(),
        });
        assert!(!dialog.details_expanded);
        assert!(!dialog.copied_note_visible());
        assert_eq!(dialog.error().map(|e| e.dialog_title()), Some("Settings Error"));
    }
}
