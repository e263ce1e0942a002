//! Glyph outline model.
//!
//! A [`GlyphOutline`] is the raw point sequence of one glyph, grouped by
//! contour, in font design units, exactly as the font stores it: no closing
//! point is repeated and implied on-curve midpoints are not added.

/// One outline point in font design units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlinePoint {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// `true` for on-curve points, `false` for quadratic control points
    pub on_curve: bool,
}

impl OutlinePoint {
    /// On-curve point.
    pub fn on(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            on_curve: true,
        }
    }

    /// Off-curve (control) point.
    pub fn off(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            on_curve: false,
        }
    }
}

/// Points of one glyph grouped by contour.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphOutline {
    /// Glyph name, used to fingerprint glyphs without points
    pub glyph_name: String,
    /// Design units per em of the font the glyph comes from
    pub units_per_em: u16,
    /// Contours in drawing order
    pub contours: Vec<Vec<OutlinePoint>>,
}

impl GlyphOutline {
    /// Create an outline without contours.
    pub fn new(glyph_name: impl Into<String>, units_per_em: u16) -> Self {
        Self {
            glyph_name: glyph_name.into(),
            units_per_em,
            contours: Vec::new(),
        }
    }

    /// Append a contour.
    pub fn with_contour(mut self, points: Vec<OutlinePoint>) -> Self {
        self.contours.push(points);
        self
    }

    /// Total number of points over all contours.
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// `true` when the glyph has no points (e.g. space).
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    /// Iterate over every point in order.
    pub fn points(&self) -> impl Iterator<Item = &OutlinePoint> {
        self.contours.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_point_count() {
        let outline = GlyphOutline::new("x", 1000)
            .with_contour(vec![OutlinePoint::on(0.0, 0.0), OutlinePoint::on(1.0, 0.0)])
            .with_contour(vec![OutlinePoint::off(2.0, 2.0)]);
        assert_eq!(outline.point_count(), 3);
        assert!(!outline.is_empty());
        assert!(GlyphOutline::new("space", 1000).is_empty());
    }
}
