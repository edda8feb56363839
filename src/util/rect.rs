use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in playfield coordinates.
///
/// `(x, y)` is the bottom-left corner with the y axis pointing up, matching
/// the renderer's layout space. Width and height must be positive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the top edge
    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Separating-axis overlap test for axis-aligned boxes.
    ///
    /// Rectangles that merely touch along an edge still count as
    /// intersecting because the separation comparisons are strict.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.top() < other.y
            || self.y > other.top())
    }
}
