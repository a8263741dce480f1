//! Editor configuration, loaded from an optional JSON file.

use std::path::{Path, PathBuf};

use ashk_tree::{Color, FontFamily, FontSpec};
use serde::{Deserialize, Serialize};

use crate::editor::EditorStyle;
use crate::error::EditorError;

/// Editor configuration. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial window size.
    pub window_size: (i32, i32),

    /// Font family name; `"monospace"`, `"sans-serif"` and `"serif"` map to
    /// generic families.
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,

    /// Extra TrueType/OpenType files to load before shaping.
    pub font_files: Vec<PathBuf>,

    /// Pixels per wheel line.
    pub scroll_step: i32,

    pub top_bar_height: i32,
    pub top_bar_color: [u8; 4],
    pub text_area_color: [u8; 4],
    pub text_color: [u8; 4],
    pub cursor_color: [u8; 4],
    pub cursor_width: i32,

    /// Icon for the save button. A generated icon is used when unset.
    pub save_icon: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: (1280, 720),
            font_family: String::from("monospace"),
            font_size: 30.0,
            line_height: 40.0,
            font_files: Vec::new(),
            scroll_step: ashk_tree::DEFAULT_SCROLL_STEP,
            top_bar_height: 40,
            top_bar_color: [32, 32, 32, 255],
            text_area_color: [64, 64, 64, 255],
            text_color: [255, 255, 255, 255],
            cursor_color: [0, 255, 255, 255],
            cursor_width: 5,
            save_icon: None,
        }
    }
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::rgba(r, g, b, a)
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EditorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| EditorError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn font(&self) -> FontSpec {
        let family = match self.font_family.as_str() {
            "monospace" => FontFamily::Monospace,
            "sans-serif" => FontFamily::SansSerif,
            "serif" => FontFamily::Serif,
            name => FontFamily::Named(name.to_string()),
        };
        FontSpec::new(family, self.font_size, self.line_height)
    }

    pub fn style(&self) -> EditorStyle {
        EditorStyle {
            font: self.font(),
            text_color: color(self.text_color),
            cursor_color: color(self.cursor_color),
            cursor_width: self.cursor_width,
        }
    }

    pub fn top_bar_color(&self) -> Color {
        color(self.top_bar_color)
    }

    pub fn text_area_color(&self) -> Color {
        color(self.text_area_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "font_size": 18.0, "font_family": "Fira Code" }"#).unwrap();
        assert_eq!(config.font_size, 18.0);
        assert_eq!(config.line_height, 40.0);
        assert_eq!(config.font().family, FontFamily::Named("Fira Code".into()));
        assert_eq!(config.window_size, (1280, 720));
    }

    #[test]
    fn colors_convert() {
        let config = AppConfig::default();
        assert_eq!(config.top_bar_color(), Color::rgb(32, 32, 32));
        assert_eq!(config.style().cursor_color, Color::CYAN);
    }

    #[test]
    fn load_reports_bad_json_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ashk.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, EditorError::Config { .. }));
        assert!(err.to_string().contains("ashk.json"));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = AppConfig::load("/nonexistent/ashk.json").unwrap_err();
        assert!(matches!(err, EditorError::Read { .. }));
    }
}
