//! toothmark_canvas - drawing surface and display geometry for the annotation overlay
//!
//! This crate owns everything that relates native image pixels to the pixels
//! of the overlay surface: the coordinate mapper, the color type shared by
//! shapes and strokes, and the `Surface` abstraction the render loop paints on.

mod color;
mod error;
mod geometry;
mod surface;

pub use color::Color;
pub use error::{CanvasError, Result};
pub use geometry::{ContainerBounds, DisplayGeometry, Point, Rect};
pub use surface::{DrawOp, PixmapSurface, RecordingSurface, Surface};
