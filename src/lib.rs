//! toothmark - annotation canvas core for dental photo review
//!
//! Reviewers draw rectangles over the photos of a patient submission. Shapes
//! are stored in native image pixels, one record per image, and are painted
//! onto an overlay surface scaled to whatever width the image is displayed
//! at. The session bundles the annotation sequence with the clinical
//! findings form into a single save payload.

pub mod carousel;
pub mod config;
pub mod constants;
pub mod drawing;
pub mod error;
pub mod images;
pub mod model;
pub mod persist;
pub mod render;
pub mod session;
pub mod store;

pub use carousel::Carousel;
pub use config::{LogLevel, SessionConfig};
pub use drawing::{DrawingState, Tool, ToolSettings};
pub use error::{FetchError, Result, SaveError, SessionError};
pub use images::{DirectoryFetcher, HandleRegistry, ImageFetcher, ImageHandle, ImageSet, LoadedImage};
pub use persist::{FindingsSink, JsonFileSink};
pub use render::RenderStyle;
pub use session::AnnotationSession;
pub use store::AnnotationStore;

pub use toothmark_canvas::{
    Color, ContainerBounds, DisplayGeometry, PixmapSurface, Point, RecordingSurface, Surface,
};
