//! Display geometry and coordinate mapping.
//!
//! Shapes are stored in native image pixels. The overlay is drawn in display
//! pixels: the container's width drives the display width and the height
//! follows the image's aspect ratio. Pointer events arrive in viewport
//! coordinates and are mapped through the container's bounding box as it is
//! laid out at the moment of the event.

use serde::{Deserialize, Serialize};

/// A 2D point. Units depend on context (viewport, display or native pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle anchored at `(x, y)`.
///
/// Width and height keep their sign: a rectangle dragged towards the
/// upper-left has negative extents and is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning from `start` to `end`, sign preserved.
    pub fn spanning(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x - start.x, end.y - start.y)
    }

    /// Same area with a top-left anchor and non-negative extents.
    pub fn normalized(&self) -> Self {
        Self {
            x: self.x.min(self.x + self.width),
            y: self.y.min(self.y + self.height),
            width: self.width.abs(),
            height: self.height.abs(),
        }
    }
}

/// The container's on-screen bounding box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContainerBounds {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounds of a container laid out exactly at the given geometry.
    pub fn from_geometry(geometry: &DisplayGeometry, left: f64, top: f64) -> Self {
        Self::new(left, top, geometry.display_width, geometry.display_height)
    }

    /// Check if a viewport point falls inside the container.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }

    /// Position of a viewport point relative to the container's top-left.
    pub fn relative(&self, point: Point) -> Point {
        Point::new(point.x - self.left, point.y - self.top)
    }

    fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Derived relationship between native image pixels and display pixels for
/// the active image. Never persisted; rebuilt from the image's intrinsic
/// size whenever the image or the container width changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    native_width: u32,
    native_height: u32,
    display_width: f64,
    display_height: f64,
}

impl DisplayGeometry {
    /// Establish geometry for an image of the given intrinsic size shown in a
    /// container of the given width.
    ///
    /// Returns `None` while the image has no dimensions (not yet loaded) or
    /// the container has no usable width.
    pub fn establish(native_width: u32, native_height: u32, container_width: f64) -> Option<Self> {
        if native_width == 0 || native_height == 0 {
            return None;
        }
        if !container_width.is_finite() || container_width <= 0.0 {
            return None;
        }

        let display_height = f64::from(native_height) * container_width / f64::from(native_width);

        log::debug!(
            "Geometry established: native {}x{}, display {:.1}x{:.1}",
            native_width,
            native_height,
            container_width,
            display_height
        );

        Some(Self {
            native_width,
            native_height,
            display_width: container_width,
            display_height,
        })
    }

    pub fn native_width(&self) -> u32 {
        self.native_width
    }

    pub fn native_height(&self) -> u32 {
        self.native_height
    }

    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    pub fn display_height(&self) -> f64 {
        self.display_height
    }

    /// Native-to-display horizontal scale.
    pub fn scale_x(&self) -> f64 {
        self.display_width / f64::from(self.native_width)
    }

    /// Native-to-display vertical scale.
    pub fn scale_y(&self) -> f64 {
        self.display_height / f64::from(self.native_height)
    }

    /// Pixel buffer size the drawing surface must have for this geometry.
    pub fn surface_size(&self) -> (u32, u32) {
        (
            self.display_width.round().max(1.0) as u32,
            self.display_height.round().max(1.0) as u32,
        )
    }

    /// Map a native point to display pixels, relative to the container.
    pub fn to_display(&self, native: Point) -> Point {
        Point::new(native.x * self.scale_x(), native.y * self.scale_y())
    }

    /// Map a container-relative display point back to native pixels.
    pub fn display_to_native(&self, display: Point) -> Point {
        Point::new(display.x / self.scale_x(), display.y / self.scale_y())
    }

    /// Map a native rectangle to display pixels. Extents keep their sign.
    pub fn rect_to_display(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x(),
            rect.y * self.scale_y(),
            rect.width * self.scale_x(),
            rect.height * self.scale_y(),
        )
    }

    /// Map a viewport pointer position to native pixels.
    ///
    /// `bounds` must be the container's bounding box read at the time of the
    /// event; layout can move between events, so it is never cached here.
    /// Returns `None` if the container currently has no area.
    pub fn to_native(&self, pointer: Point, bounds: &ContainerBounds) -> Option<Point> {
        if !bounds.has_area() {
            return None;
        }

        let rel = bounds.relative(pointer);
        let x = rel.x * f64::from(self.native_width) / bounds.width;
        let y = rel.y * f64::from(self.native_height) / bounds.height;

        Some(Point::new(x, y))
    }
}
