//! Pointer-driven drawing state machine.
//!
//! All points handed to the machine are already in native image pixels; the
//! session maps pointer positions through the display geometry first.

use toothmark_canvas::{Color, Point};

use crate::model::{Condition, RectangleShape, Shape};

/// Drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Drag to draw a rectangle
    Rectangle,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Rectangle => "Rectangle",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Rectangle]
    }

    /// Shape committed by a drag from `start` to `end`.
    pub fn commit_shape(&self, start: Point, end: Point, color: Color, min_size: f64) -> Shape {
        match self {
            Tool::Rectangle => RectangleShape::from_drag(start, end, color, min_size).into(),
        }
    }

    /// Transient shape shown while dragging. No minimum size is applied.
    pub fn preview_shape(&self, start: Point, current: Point, color: Color) -> Shape {
        match self {
            Tool::Rectangle => RectangleShape::new(
                start.x,
                start.y,
                current.x - start.x,
                current.y - start.y,
                color,
            )
            .into(),
        }
    }
}

/// Tool and color selection of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    /// Active tool; `None` makes the overlay non-interactive.
    pub tool: Option<Tool>,
    /// Color for new shapes.
    pub color: Color,
}

impl ToolSettings {
    pub fn new(tool: Option<Tool>, color: Color) -> Self {
        Self { tool, color }
    }

    /// Whether the overlay should receive pointer events.
    pub fn is_interactive(&self) -> bool {
        self.tool.is_some()
    }

    /// Condition the selected color stands for, if it is a palette color.
    pub fn condition(&self) -> Option<Condition> {
        Condition::from_color(self.color)
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: None,
            color: Condition::default().color(),
        }
    }
}

/// State of the drawing interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawingState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// A drag is in progress.
    Drawing { start: Point, current: Point },
}

impl DrawingState {
    /// Check if we're currently drawing something.
    pub fn is_drawing(&self) -> bool {
        matches!(self, DrawingState::Drawing { .. })
    }

    /// Pointer pressed at a native point. Starts a drag if a tool is active.
    ///
    /// A press while already drawing restarts the drag at the new point.
    pub fn pointer_down(&mut self, settings: &ToolSettings, at: Point) -> bool {
        if settings.tool.is_none() {
            return false;
        }
        *self = DrawingState::Drawing {
            start: at,
            current: at,
        };
        true
    }

    /// Pointer moved to a native point. Returns the preview shape while
    /// drawing. The preview is never committed.
    pub fn pointer_move(&mut self, settings: &ToolSettings, at: Point) -> Option<Shape> {
        let DrawingState::Drawing { start, current } = self else {
            return None;
        };
        let tool = settings.tool?;
        *current = at;
        Some(tool.preview_shape(*start, at, settings.color))
    }

    /// Pointer released at a native point. Returns the shape to commit and
    /// goes back to idle.
    ///
    /// If the tool was deselected mid-drag the drag is dropped without a
    /// commit.
    pub fn pointer_up(&mut self, settings: &ToolSettings, at: Point, min_size: f64) -> Option<Shape> {
        let DrawingState::Drawing { start, .. } = std::mem::take(self) else {
            return None;
        };
        let tool = settings.tool?;
        Some(tool.commit_shape(start, at, settings.color, min_size))
    }

    /// Abandon the current drag without committing. Returns whether a drag
    /// was in progress.
    pub fn cancel(&mut self) -> bool {
        std::mem::take(self).is_drawing()
    }
}
