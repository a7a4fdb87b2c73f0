//! Session configuration.
//!
//! Settings are read from a JSON file with every field optional. Tool and
//! color selection are not stored here; a session seeds its own
//! [`ToolSettings`](crate::drawing::ToolSettings) from this config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toothmark_canvas::Color;

use crate::constants::{DEFAULT_COLOR_HEX, DEFAULT_LINE_WIDTH, MIN_SHAPE_SIZE_CM, PIXELS_PER_CM};
use crate::error::{Result, SessionError};
use crate::render::RenderStyle;

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Settings for an annotation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Color selected when a session opens
    #[serde(default = "default_color")]
    pub default_color: Color,

    /// Stroke width of committed shapes, in display pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Stroke width of the drag preview; falls back to `line_width`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_line_width: Option<f32>,

    /// Screen pixels per centimetre
    #[serde(default = "default_pixels_per_cm")]
    pub pixels_per_cm: f64,

    /// Smallest committed shape edge, in centimetres
    #[serde(default = "default_min_shape_size_cm")]
    pub min_shape_size_cm: f64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_color() -> Color {
    Color::from_hex(DEFAULT_COLOR_HEX).unwrap_or(Color::rgb(0x53, 0x2E, 0x5E))
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

fn default_pixels_per_cm() -> f64 {
    PIXELS_PER_CM
}

fn default_min_shape_size_cm() -> f64 {
    MIN_SHAPE_SIZE_CM
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            default_color: default_color(),
            line_width: default_line_width(),
            preview_line_width: None,
            pixels_per_cm: default_pixels_per_cm(),
            min_shape_size_cm: default_min_shape_size_cm(),
            log_level: LogLevel::default(),
        }
    }
}

impl SessionConfig {
    /// Minimum committed shape edge in native image pixels.
    pub fn min_shape_size(&self) -> f64 {
        self.min_shape_size_cm * self.pixels_per_cm
    }

    /// Stroke widths for the render loop.
    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            line_width: self.line_width,
            preview_line_width: self.preview_line_width.unwrap_or(self.line_width),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.version > CONFIG_VERSION {
            return Err(SessionError::invalid_config(format!(
                "configuration file version {} is newer than supported version {}",
                self.version, CONFIG_VERSION
            )));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(SessionError::invalid_config("line_width must be positive"));
        }
        if self
            .preview_line_width
            .is_some_and(|w| !(w.is_finite() && w > 0.0))
        {
            return Err(SessionError::invalid_config(
                "preview_line_width must be positive",
            ));
        }
        if !(self.pixels_per_cm.is_finite() && self.pixels_per_cm > 0.0) {
            return Err(SessionError::invalid_config("pixels_per_cm must be positive"));
        }
        if !(self.min_shape_size_cm.is_finite() && self.min_shape_size_cm >= 0.0) {
            return Err(SessionError::invalid_config(
                "min_shape_size_cm must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.default_color.to_hex(), "#532E5E");
        assert!(approx_eq(config.min_shape_size(), 15.12));
        assert_eq!(config.render_style(), RenderStyle::default());
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = SessionConfig::from_json(
            r##"{"default_color": "#D33E3E", "preview_line_width": 1.0, "log_level": "debug"}"##,
        )
        .unwrap();
        assert_eq!(config.default_color, Color::rgb(0xD3, 0x3E, 0x3E));
        assert_eq!(config.render_style().preview_line_width, 1.0);
        assert_eq!(config.render_style().line_width, 2.0);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_roundtrip() {
        let config = SessionConfig {
            min_shape_size_cm: 0.5,
            ..Default::default()
        };
        let back = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = SessionConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SessionConfig::from_json(r#"{"line_width": 0.0}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"pixels_per_cm": -1.0}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"default_color": "purple"}"#).is_err());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join("toothmark-no-such-config.json");
        assert_eq!(SessionConfig::load(&path).unwrap(), SessionConfig::default());
    }
}
