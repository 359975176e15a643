//! Configuration and settings module.
//!
//! This module holds the guide's layout, time window and gesture tuning
//! (`EpgConfig`), the color theme (`ColorSettings`), and the persisted
//! `AppSettings` that wraps both.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::error::AppError;
use super::model::Millis;

/// Settings filename for persistence.
const SETTINGS_FILENAME: &str = "config.json";

/// Maximum number of recent listings files to track.
const MAX_RECENT_FILES: usize = 10;

const MILLIS_PER_MINUTE: Millis = 60 * 1000;
const MILLIS_PER_DAY: Millis = 24 * 60 * MILLIS_PER_MINUTE;

/// Geometry, time window and gesture configuration for the guide.
///
/// Each option only affects the computation it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpgConfig {
    /// Days of listings reachable before "now"
    pub days_back: u32,
    /// Days of listings reachable after "now"
    pub days_forward: u32,
    /// Duration shown across the grid at once
    pub visible_window_minutes: u32,
    /// Spacing between time bar labels
    pub time_label_spacing_minutes: u32,

    /// Height of a channel row
    pub row_height: u32,
    /// Vertical gap between rows (also the gap under the time bar)
    pub row_margin: u32,
    /// Width of the channel rail
    pub rail_width: u32,
    /// Gap between the rail and the grid, and between adjacent events
    pub rail_margin: u32,
    /// Inner padding of rail cells and event cells
    pub rail_padding: u32,
    /// Height of the time bar
    pub time_bar_height: u32,
    /// Width of the "now" line
    pub time_bar_line_width: u32,

    /// Diameter of the reset button
    pub reset_button_size: u32,
    /// Distance of the reset button from the bottom-right corner
    pub reset_button_margin: u32,
    /// Fraction of the viewport width the user must pan away before the reset button shows
    pub reset_threshold_fraction: f32,
    /// Duration of the animated jump back to "now"
    pub reset_animation_ms: u32,

    /// Friction coefficient for fling deceleration
    pub fling_friction: f32,
    /// Movement in pixels before a press becomes a drag
    pub touch_slop: f32,
    /// Minimum release speed (px/s) that starts a fling
    pub min_fling_velocity: f32,
    /// Release speeds above this (px/s) are capped
    pub max_fling_velocity: f32,

    /// Event title text size
    pub event_text_size: f32,
    /// Time bar label text size
    pub time_bar_text_size: f32,
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            days_back: 3,
            days_forward: 3,
            visible_window_minutes: 120,
            time_label_spacing_minutes: 30,

            row_height: 64,
            row_margin: 3,
            rail_width: 96,
            rail_margin: 3,
            rail_padding: 8,
            time_bar_height: 36,
            time_bar_line_width: 2,

            reset_button_size: 48,
            reset_button_margin: 16,
            reset_threshold_fraction: 1.0 / 3.0,
            reset_animation_ms: 600,

            fling_friction: 0.2,
            touch_slop: 8.0,
            min_fling_velocity: 50.0,
            max_fling_velocity: 8000.0,

            event_text_size: 14.0,
            time_bar_text_size: 13.0,
        }
    }
}

impl EpgConfig {
    /// Look-back window in milliseconds.
    pub fn days_back_millis(&self) -> Millis {
        Millis::from(self.days_back) * MILLIS_PER_DAY
    }

    /// Look-ahead window in milliseconds.
    pub fn days_forward_millis(&self) -> Millis {
        Millis::from(self.days_forward) * MILLIS_PER_DAY
    }

    /// Visible window in milliseconds.
    pub fn window_millis(&self) -> Millis {
        Millis::from(self.visible_window_minutes) * MILLIS_PER_MINUTE
    }

    /// Time label spacing in milliseconds.
    pub fn label_spacing_millis(&self) -> Millis {
        Millis::from(self.time_label_spacing_minutes) * MILLIS_PER_MINUTE
    }

    /// Check that the values describe a drawable guide.
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(AppError::InvalidSettings {
                field,
                reason: reason.to_string(),
            })
        };

        if self.visible_window_minutes == 0 {
            return invalid("visible_window_minutes", "must be greater than zero");
        }
        if self.time_label_spacing_minutes == 0 {
            return invalid("time_label_spacing_minutes", "must be greater than zero");
        }
        if self.row_height == 0 {
            return invalid("row_height", "must be greater than zero");
        }
        if self.days_back_millis() + self.days_forward_millis() < self.window_millis() {
            return invalid(
                "visible_window_minutes",
                "must not exceed the look-back plus look-ahead range",
            );
        }
        if !(self.reset_threshold_fraction.is_finite() && self.reset_threshold_fraction >= 0.0) {
            return invalid("reset_threshold_fraction", "must be a non-negative number");
        }
        if !(self.fling_friction.is_finite() && self.fling_friction > 0.0) {
            return invalid("fling_friction", "must be a positive number");
        }
        Ok(())
    }
}

/// Color settings for the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Background behind rows and gaps
    pub background: [u8; 3],
    /// Channel rail and time bar background
    pub channel_background: [u8; 3],
    /// Event cell background
    pub event_background: [u8; 3],
    /// Event cell background while the event is airing
    pub event_background_current: [u8; 3],
    /// Event title and time label text
    pub event_text: [u8; 3],
    /// "Now" line and reset button
    pub time_bar_line: [u8; 3],
    /// Reset button icon
    pub reset_icon: [u8; 3],

    /// Success status color
    pub status_success: [u8; 3],
    /// Error status color
    pub status_error: [u8; 3],
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            background: [16, 16, 20],
            channel_background: [40, 40, 48],
            event_background: [52, 54, 64],
            event_background_current: [36, 86, 140],
            event_text: [224, 224, 224],
            time_bar_line: [236, 88, 60],
            reset_icon: [255, 255, 255],

            status_success: [76, 175, 80], // Green
            status_error: [244, 67, 54],   // Red
        }
    }
}

impl ColorSettings {
    /// Convert a color array to egui Color32.
    #[inline]
    pub fn to_color32(color: [u8; 3]) -> Color32 {
        Color32::from_rgb(color[0], color[1], color[2])
    }

    /// Get success status color as Color32.
    pub fn status_success_color(&self) -> Color32 {
        Self::to_color32(self.status_success)
    }

    /// Get error status color as Color32.
    pub fn status_error_color(&self) -> Color32 {
        Self::to_color32(self.status_error)
    }
}

/// Application settings, persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Guide geometry and behaviour.
    #[serde(default)]
    pub epg: EpgConfig,

    /// Color theme.
    #[serde(default)]
    pub colors: ColorSettings,

    /// Recently opened listings files (most recent first).
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,

    /// Window size to restore on startup (width, height).
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            epg: EpgConfig::default(),
            colors: ColorSettings::default(),
            recent_files: Vec::new(),
            window_size: None,
        }
    }
}

impl AppSettings {
    /// Get the settings file path in the user's config directory.
    fn get_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("tv-epg");
            path.push(SETTINGS_FILENAME);
            path
        })
    }

    /// Load settings from disk, returning defaults if loading fails.
    pub fn load() -> Self {
        Self::get_settings_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .map(|content| Self::from_json(&content))
            .unwrap_or_default()
    }

    /// Parse settings, falling back to defaults for an unusable guide config.
    pub fn from_json(content: &str) -> Self {
        let mut settings: Self = match serde_json::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring unreadable settings: {e}");
                return Self::default();
            }
        };

        if let Err(e) = settings.epg.validate() {
            warn!("{}; using default guide layout", e.brief_description());
            settings.epg = EpgConfig::default();
        }
        settings
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), AppError> {
        let save_error = |reason: String| AppError::SettingsSaveError { reason };

        let path = Self::get_settings_path()
            .ok_or_else(|| save_error("Could not determine config directory".to_string()))?;

        // Ensure the parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| save_error(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| save_error(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| save_error(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Add a file to the recent files list.
    ///
    /// The file is moved to the front of the list. The list is capped at
    /// MAX_RECENT_FILES entries.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Set the window size.
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epg_config_default_is_valid() {
        let config = EpgConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_millis(), 2 * 60 * 60 * 1000);
        assert_eq!(config.label_spacing_millis(), 30 * 60 * 1000);
        assert_eq!(config.days_back_millis(), 3 * 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_epg_config_rejects_zero_window() {
        let config = EpgConfig {
            visible_window_minutes: 0,
            ..EpgConfig::default()
        };
        match config.validate() {
            Err(AppError::InvalidSettings { field, .. }) => {
                assert_eq!(field, "visible_window_minutes")
            }
            other => panic!("Expected InvalidSettings, got {:?}", other),
        }
    }

    #[test]
    fn test_epg_config_rejects_window_longer_than_range() {
        let config = EpgConfig {
            days_back: 0,
            days_forward: 0,
            ..EpgConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_color32_conversion() {
        let color = [255, 128, 64];
        assert_eq!(
            ColorSettings::to_color32(color),
            Color32::from_rgb(255, 128, 64)
        );
    }

    #[test]
    fn test_settings_serialization() {
        let mut settings = AppSettings::default();
        settings.epg.row_height = 80;
        settings.recent_files.push(PathBuf::from("/test/guide.json"));
        settings.window_size = Some((1024.0, 768.0));

        let json = serde_json::to_string(&settings).unwrap();
        let restored = AppSettings::from_json(&json);

        assert_eq!(restored.epg.row_height, 80);
        assert_eq!(restored.colors, settings.colors);
        assert_eq!(restored.recent_files.len(), 1);
        assert_eq!(restored.window_size, Some((1024.0, 768.0)));
    }

    #[test]
    fn test_backward_compatible_deserialization() {
        // Older files carry only part of the guide section
        let old_json = r#"{"epg":{"row_height":50},"colors":{"background":[0,0,0]}}"#;
        let settings = AppSettings::from_json(old_json);

        assert_eq!(settings.epg.row_height, 50);
        assert_eq!(settings.epg.rail_width, EpgConfig::default().rail_width);
        assert_eq!(settings.colors.background, [0, 0, 0]);
        assert_eq!(
            settings.colors.event_text,
            ColorSettings::default().event_text
        );
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_invalid_epg_section_falls_back_to_defaults() {
        let json = r#"{"epg":{"row_height":0}}"#;
        let settings = AppSettings::from_json(json);
        assert_eq!(settings.epg, EpgConfig::default());
    }

    #[test]
    fn test_unreadable_settings_fall_back_to_defaults() {
        let settings = AppSettings::from_json("{ not json");
        assert_eq!(settings.epg, EpgConfig::default());
        assert!(settings.window_size.is_none());
    }

    #[test]
    fn test_recent_files_add_and_cap() {
        let mut settings = AppSettings::default();
        settings.add_recent_file(PathBuf::from("/test/a.json"));
        settings.add_recent_file(PathBuf::from("/test/b.json"));
        settings.add_recent_file(PathBuf::from("/test/a.json"));
        assert_eq!(settings.recent_files.len(), 2);
        assert_eq!(settings.recent_files[0], PathBuf::from("/test/a.json"));

        for i in 0..15 {
            settings.add_recent_file(PathBuf::from(format!("/test/file{}.json", i)));
        }
        assert_eq!(settings.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(settings.recent_files[0], PathBuf::from("/test/file14.json"));
    }

    #[test]
    fn test_window_size() {
        let mut settings = AppSettings::default();
        settings.set_window_size(1280.0, 720.0);
        assert_eq!(settings.window_size, Some((1280.0, 720.0)));
    }
}
