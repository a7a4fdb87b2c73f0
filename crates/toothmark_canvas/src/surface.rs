//! Drawing surfaces for the annotation overlay.

use tiny_skia::{ColorU8, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::color::Color;
use crate::error::{CanvasError, Result};
use crate::geometry::Rect;

/// A surface the overlay is painted on, in display pixels.
///
/// The pixel buffer is resized whenever display geometry is re-established,
/// so the buffer and the geometry always describe the same space.
pub trait Surface {
    /// Current pixel buffer size.
    fn size(&self) -> (u32, u32);

    /// Replace the pixel buffer with a blank one of the given size.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Clear the whole surface to transparent.
    fn clear(&mut self);

    /// Stroke the outline of a rectangle. Extents may be negative.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
}

/// Raster surface backed by a `tiny_skia::Pixmap`.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(CanvasError::SurfaceAllocation { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Encode the overlay alone as PNG (transparent where nothing is drawn).
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| CanvasError::Encoding(e.to_string()))
    }

    /// Draw the overlay on top of a straight-alpha RGBA background of the
    /// same size and encode the result as PNG.
    pub fn composite_png(&self, background: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
        let len = background.len();
        let size = IntSize::from_wh(width, height)
            .filter(|_| (width, height) == self.size())
            .ok_or(CanvasError::BackgroundMismatch { len, width, height })?;
        let mut base = background_pixmap(background, size)
            .ok_or(CanvasError::BackgroundMismatch { len, width, height })?;

        base.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        base.encode_png()
            .map_err(|e| CanvasError::Encoding(e.to_string()))
    }
}

/// Pixmaps hold premultiplied pixels; decoded images are straight alpha.
fn background_pixmap(mut rgba: Vec<u8>, size: IntSize) -> Option<Pixmap> {
    for px in rgba.chunks_exact_mut(4) {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        px.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(rgba, size)
}

impl Surface for PixmapSurface {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.size() == (width, height) {
            self.clear();
            return Ok(());
        }
        self.pixmap =
            Pixmap::new(width, height).ok_or(CanvasError::SurfaceAllocation { width, height })?;
        log::trace!("Pixmap surface resized to {}x{}", width, height);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let r = rect.normalized();
        // non-finite extents have nothing to stroke
        let Some(sk_rect) =
            tiny_skia::Rect::from_xywh(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
        else {
            log::trace!("Skipping degenerate rect {:?}", rect);
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: line_width,
            ..Default::default()
        };

        let path = PathBuilder::from_rect(sk_rect);
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// A paint operation captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
}

/// Surface that records what is visible instead of rasterizing it.
///
/// Clearing drops all recorded operations, so `ops()` is always exactly the
/// set of strokes currently on the surface. Useful for headless hosts and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    clear_count: usize,
    resize_count: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations currently visible on the surface, in paint order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of times the surface was cleared.
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    /// Number of times the buffer was resized.
    pub fn resize_count(&self) -> usize {
        self.resize_count
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.ops.clear();
        self.resize_count += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.clear_count += 1;
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            line_width,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(0xD3, 0x3E, 0x3E);

    #[test]
    fn test_pixmap_zero_size_rejected() {
        assert!(PixmapSurface::new(0, 10).is_err());
        let mut s = PixmapSurface::new(4, 4).unwrap();
        assert!(s.resize(0, 0).is_err());
        assert_eq!(s.size(), (4, 4));
    }

    #[test]
    fn test_pixmap_stroke_and_clear() {
        let mut s = PixmapSurface::new(40, 40).unwrap();
        s.stroke_rect(Rect::new(5.0, 5.0, 20.0, 20.0), RED, 2.0);

        let edge = s.pixmap().pixel(5, 15).unwrap();
        assert!(edge.alpha() > 0);
        let inside = s.pixmap().pixel(15, 15).unwrap();
        assert_eq!(inside.alpha(), 0);

        s.clear();
        assert!(s.pixmap().data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_pixmap_negative_extents() {
        let mut s = PixmapSurface::new(40, 40).unwrap();
        s.stroke_rect(Rect::new(25.0, 25.0, -20.0, -20.0), RED, 2.0);
        assert!(s.pixmap().pixel(5, 15).unwrap().alpha() > 0);
    }

    #[test]
    fn test_pixmap_resize_blanks_buffer() {
        let mut s = PixmapSurface::new(40, 40).unwrap();
        s.stroke_rect(Rect::new(5.0, 5.0, 20.0, 20.0), RED, 2.0);
        s.resize(80, 20).unwrap();
        assert_eq!(s.size(), (80, 20));
        assert!(s.pixmap().data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_composite_requires_matching_size() {
        let s = PixmapSurface::new(4, 4).unwrap();
        assert!(s.composite_png(vec![255; 4 * 4 * 4], 4, 4).is_ok());
        assert!(s.composite_png(vec![255; 3 * 4 * 4], 3, 4).is_err());
        assert!(s.composite_png(vec![255; 10], 4, 4).is_err());
    }

    #[test]
    fn test_translucent_background_premultiplied() {
        let size = IntSize::from_wh(2, 1).unwrap();
        let base = background_pixmap(vec![200, 100, 50, 128, 10, 20, 30, 255], size).unwrap();

        let half = base.pixel(0, 0).unwrap();
        assert_eq!(
            (half.red(), half.green(), half.blue(), half.alpha()),
            (100, 50, 25, 128)
        );
        let opaque = base.pixel(1, 0).unwrap();
        assert_eq!(
            (opaque.red(), opaque.green(), opaque.blue(), opaque.alpha()),
            (10, 20, 30, 255)
        );

        let s = PixmapSurface::new(2, 1).unwrap();
        assert!(s.composite_png(vec![200, 100, 50, 128, 0, 0, 0, 0], 2, 1).is_ok());
    }

    #[test]
    fn test_recording_surface_clear_drops_ops() {
        let mut s = RecordingSurface::new();
        s.resize(10, 10).unwrap();
        s.stroke_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RED, 2.0);
        assert_eq!(s.ops().len(), 1);
        s.clear();
        assert!(s.ops().is_empty());
        assert_eq!(s.clear_count(), 1);
        assert_eq!(s.resize_count(), 1);
    }
}
