//! Annotation shapes in native image-pixel coordinates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use toothmark_canvas::{Color, Point, Rect};

/// Stroke color of a persisted shape.
///
/// Keeps the exact string it was read from, so a save writes back what was
/// loaded. Strings that are not a hex color have no `rgb` value and are
/// painted with a fallback stroke.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeColor {
    raw: String,
    rgb: Option<Color>,
}

impl ShapeColor {
    /// Read a wire color. Accepts `#RRGGBB` and the short `#RGB` form.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let rgb = parse_hex(raw.trim());
        Self { raw, rgb }
    }

    /// The string written on save.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed color, `None` if the string is not a hex color.
    pub fn rgb(&self) -> Option<Color> {
        self.rgb
    }

    /// Parsed color, or `fallback` for unrecognized strings.
    pub fn rgb_or(&self, fallback: Color) -> Color {
        self.rgb.unwrap_or(fallback)
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    if let Ok(color) = Color::from_hex(value) {
        return Some(color);
    }
    let digits = value.strip_prefix('#').filter(|d| d.len() == 3 && d.is_ascii())?;
    let mut channels = digits
        .chars()
        .map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
    Some(Color::rgb(channels.next()??, channels.next()??, channels.next()??))
}

impl From<Color> for ShapeColor {
    fn from(color: Color) -> Self {
        Self {
            raw: color.to_hex(),
            rgb: Some(color),
        }
    }
}

impl PartialEq<Color> for ShapeColor {
    fn eq(&self, other: &Color) -> bool {
        self.rgb == Some(*other)
    }
}

impl fmt::Display for ShapeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ShapeColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for ShapeColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::parse)
    }
}

/// A rectangle annotation.
///
/// `x`/`y` is the drag start, `width`/`height` may be negative when the drag
/// went up or left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: ShapeColor,
}

impl RectangleShape {
    pub fn new(x: f64, y: f64, width: f64, height: f64, color: impl Into<ShapeColor>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color: color.into(),
        }
    }

    /// Build the rectangle committed by a drag from `start` to `end`.
    ///
    /// If either extent is smaller than `min_size` the rectangle becomes a
    /// `min_size` square anchored at `start`, whatever the drag direction.
    pub fn from_drag(start: Point, end: Point, color: Color, min_size: f64) -> Self {
        let width = end.x - start.x;
        let height = end.y - start.y;

        if width.abs() < min_size || height.abs() < min_size {
            return Self::new(start.x, start.y, min_size, min_size, color);
        }

        Self::new(start.x, start.y, width, height, color)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A persisted annotation shape.
///
/// Serializes as `{"type": "rectangle", "x": .., "y": .., "width": ..,
/// "height": .., "color": "#RRGGBB"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(RectangleShape),
}

impl Shape {
    pub fn color(&self) -> &ShapeColor {
        match self {
            Shape::Rectangle(r) => &r.color,
        }
    }

    /// Name of the shape type as written on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
        }
    }
}

impl From<RectangleShape> for Shape {
    fn from(rect: RectangleShape) -> Self {
        Shape::Rectangle(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MIN_SHAPE_SIZE_CM, PIXELS_PER_CM};

    const PURPLE: Color = Color::rgb(0x53, 0x2E, 0x5E);

    fn min_size() -> f64 {
        MIN_SHAPE_SIZE_CM * PIXELS_PER_CM
    }

    #[test]
    fn test_drag_keeps_extents() {
        let r = RectangleShape::from_drag(
            Point::new(50.0, 50.0),
            Point::new(150.0, 120.0),
            PURPLE,
            min_size(),
        );
        assert_eq!(r, RectangleShape::new(50.0, 50.0, 100.0, 70.0, PURPLE));
    }

    #[test]
    fn test_drag_up_left_is_negative() {
        let r = RectangleShape::from_drag(
            Point::new(200.0, 200.0),
            Point::new(100.0, 150.0),
            PURPLE,
            min_size(),
        );
        assert_eq!(r.x, 200.0);
        assert_eq!(r.y, 200.0);
        assert_eq!(r.width, -100.0);
        assert_eq!(r.height, -50.0);
    }

    #[test]
    fn test_tiny_drag_snaps_to_minimum() {
        let cases = [
            (Point::new(10.0, 10.0), Point::new(10.0, 10.0)),
            (Point::new(10.0, 10.0), Point::new(12.0, 300.0)),
            (Point::new(10.0, 10.0), Point::new(300.0, 24.0)),
            (Point::new(10.0, 10.0), Point::new(0.0, -200.0)),
        ];
        for (start, end) in cases {
            let r = RectangleShape::from_drag(start, end, PURPLE, min_size());
            assert_eq!(r.x, start.x);
            assert_eq!(r.y, start.y);
            assert_eq!(r.width, min_size());
            assert_eq!(r.height, min_size());
        }
        assert!((min_size() - 15.12).abs() < 1e-9);
    }

    #[test]
    fn test_wire_format() {
        let shape = Shape::from(RectangleShape::new(50.0, 50.0, 100.0, -70.5, PURPLE));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "rectangle",
                "x": 50.0,
                "y": 50.0,
                "width": 100.0,
                "height": -70.5,
                "color": "#532E5E"
            })
        );

        let parsed: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r##"{"type":"circle","x":1,"y":2,"width":3,"height":4,"color":"#532E5E"}"##;
        assert!(serde_json::from_str::<Shape>(json).is_err());
    }

    #[test]
    fn test_color_string_kept_verbatim() {
        let json = r##"{"type":"rectangle","x":1,"y":2,"width":3,"height":4,"color":"#d93685"}"##;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.color().raw(), "#d93685");
        assert_eq!(shape.color().rgb(), Some(Color::rgb(0xD9, 0x36, 0x85)));
        assert_eq!(serde_json::to_value(&shape).unwrap()["color"], "#d93685");
    }

    #[test]
    fn test_unparseable_color_accepted() {
        let json = r#"{"type":"rectangle","x":1,"y":2,"width":3,"height":4,"color":"red"}"#;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.color().raw(), "red");
        assert_eq!(shape.color().rgb(), None);
        assert_eq!(shape.color().rgb_or(PURPLE), PURPLE);
        assert_eq!(serde_json::to_value(&shape).unwrap()["color"], "red");
    }

    #[test]
    fn test_short_hex_color() {
        let color = ShapeColor::parse("#abc");
        assert_eq!(color.rgb(), Some(Color::rgb(0xAA, 0xBB, 0xCC)));
        assert_eq!(color.raw(), "#abc");
        assert_eq!(ShapeColor::parse("#ggg").rgb(), None);
        assert_eq!(ShapeColor::from(PURPLE), PURPLE);
    }
}
