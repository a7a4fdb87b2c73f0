//! Overlay render loop.
//!
//! The only code that paints on the overlay. Shapes are stored in native
//! pixels and scaled into display pixels with the current geometry on every
//! redraw, so a redraw after a resize repositions everything proportionally.

use toothmark_canvas::{DisplayGeometry, Surface};

use crate::constants::FALLBACK_STROKE_COLOR;
use crate::model::Shape;

/// Stroke widths used by the render loop, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub line_width: f32,
    pub preview_line_width: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            line_width: crate::constants::DEFAULT_LINE_WIDTH,
            preview_line_width: crate::constants::DEFAULT_LINE_WIDTH,
        }
    }
}

/// Clear the surface and draw `shapes` in commit order.
pub fn redraw<S: Surface + ?Sized>(
    surface: &mut S,
    geometry: &DisplayGeometry,
    shapes: &[Shape],
    style: &RenderStyle,
) {
    surface.clear();
    for shape in shapes {
        paint_shape(surface, geometry, shape, style.line_width);
    }
    log::trace!("Redrew {} shapes", shapes.len());
}

/// Redraw the committed shapes, then the in-progress preview on top.
pub fn redraw_with_preview<S: Surface + ?Sized>(
    surface: &mut S,
    geometry: &DisplayGeometry,
    shapes: &[Shape],
    preview: &Shape,
    style: &RenderStyle,
) {
    redraw(surface, geometry, shapes, style);
    paint_shape(surface, geometry, preview, style.preview_line_width);
}

fn paint_shape<S: Surface + ?Sized>(
    surface: &mut S,
    geometry: &DisplayGeometry,
    shape: &Shape,
    line_width: f32,
) {
    match shape {
        Shape::Rectangle(r) => {
            let rect = geometry.rect_to_display(r.rect());
            surface.stroke_rect(rect, r.color.rgb_or(FALLBACK_STROKE_COLOR), line_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, RectangleShape, ShapeColor};
    use toothmark_canvas::{DrawOp, Rect, RecordingSurface};

    fn shapes() -> Vec<Shape> {
        vec![
            RectangleShape::new(100.0, 100.0, 200.0, 50.0, Condition::Stains.color()).into(),
            RectangleShape::new(400.0, 300.0, -40.0, -40.0, Condition::Crowns.color()).into(),
        ]
    }

    fn rects(surface: &RecordingSurface) -> Vec<Rect> {
        surface
            .ops()
            .iter()
            .map(|op| match op {
                DrawOp::StrokeRect { rect, .. } => *rect,
            })
            .collect()
    }

    #[test]
    fn test_redraw_scales_to_display() {
        let geometry = DisplayGeometry::establish(800, 600, 400.0).unwrap();
        let mut surface = RecordingSurface::new();
        redraw(&mut surface, &geometry, &shapes(), &RenderStyle::default());

        assert_eq!(
            rects(&surface),
            vec![
                Rect::new(50.0, 50.0, 100.0, 25.0),
                Rect::new(200.0, 150.0, -20.0, -20.0)
            ]
        );
        let DrawOp::StrokeRect { color, line_width, .. } = &surface.ops()[1];
        assert_eq!(*color, Condition::Crowns.color());
        assert_eq!(*line_width, 2.0);
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let geometry = DisplayGeometry::establish(800, 600, 400.0).unwrap();
        let mut surface = RecordingSurface::new();
        let style = RenderStyle::default();

        redraw(&mut surface, &geometry, &shapes(), &style);
        let first = surface.ops().to_vec();
        redraw(&mut surface, &geometry, &shapes(), &style);
        assert_eq!(surface.ops(), first.as_slice());
        assert_eq!(surface.ops().len(), 2);
    }

    #[test]
    fn test_preview_drawn_last_and_not_retained() {
        let geometry = DisplayGeometry::establish(800, 600, 800.0).unwrap();
        let mut surface = RecordingSurface::new();
        let style = RenderStyle {
            line_width: 2.0,
            preview_line_width: 1.0,
        };
        let preview: Shape =
            RectangleShape::new(0.0, 0.0, 10.0, 10.0, Condition::Attrition.color()).into();

        redraw_with_preview(&mut surface, &geometry, &shapes(), &preview, &style);
        assert_eq!(surface.ops().len(), 3);
        let DrawOp::StrokeRect { line_width, .. } = &surface.ops()[2];
        assert_eq!(*line_width, 1.0);

        redraw(&mut surface, &geometry, &shapes(), &style);
        assert_eq!(surface.ops().len(), 2);
    }

    #[test]
    fn test_resize_repositions_proportionally() {
        let small = DisplayGeometry::establish(1000, 500, 250.0).unwrap();
        let large = DisplayGeometry::establish(1000, 500, 1000.0).unwrap();
        let shape: Shape =
            RectangleShape::new(100.0, 100.0, 50.0, 50.0, Condition::Stains.color()).into();

        let mut surface = RecordingSurface::new();
        redraw(&mut surface, &small, std::slice::from_ref(&shape), &RenderStyle::default());
        let a = rects(&surface)[0];
        redraw(&mut surface, &large, std::slice::from_ref(&shape), &RenderStyle::default());
        let b = rects(&surface)[0];

        assert!((a.x / small.display_width() - b.x / large.display_width()).abs() < 1e-9);
        assert!((a.y / small.display_height() - b.y / large.display_height()).abs() < 1e-9);
    }

    #[test]
    fn test_unrecognized_color_uses_fallback_stroke() {
        let geometry = DisplayGeometry::establish(100, 100, 100.0).unwrap();
        let shape: Shape =
            RectangleShape::new(10.0, 10.0, 20.0, 20.0, ShapeColor::parse("red")).into();

        let mut surface = RecordingSurface::new();
        redraw(&mut surface, &geometry, &[shape], &RenderStyle::default());
        let DrawOp::StrokeRect { color, .. } = &surface.ops()[0];
        assert_eq!(*color, FALLBACK_STROKE_COLOR);
    }
}
