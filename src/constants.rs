//! Global constants for toothmark

use toothmark_canvas::Color;

/// Screen pixels per centimetre used to express physical sizes.
pub const PIXELS_PER_CM: f64 = 37.8;

/// Smallest committed shape edge, in centimetres.
pub const MIN_SHAPE_SIZE_CM: f64 = 0.4;

/// Stroke width for committed shapes, in display pixels.
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// Stroke for persisted shapes whose color string is not a hex color.
pub const FALLBACK_STROKE_COLOR: Color = Color::rgb(0, 0, 0);

/// Color selected when a session opens (inflamed / red gums).
pub const DEFAULT_COLOR_HEX: &str = "#532E5E";
