//! Glyph box geometry.
//!
//! Boxes are axis-aligned, stored as origin plus size. The vertical axis
//! direction does not matter to any operation here as long as all boxes of
//! one page use the same one.

/// An axis-aligned glyph box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the origin corner
    pub x: f32,
    /// Y coordinate of the origin corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use deduff::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.right(), 100.0);
    /// assert_eq!(rect.bottom(), 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest x.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Largest x.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Smallest y.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Largest y.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Length of the shared vertical extent, 0 when disjoint.
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0)
    }
}
