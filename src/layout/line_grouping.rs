//! Grouping of glyph boxes into text lines.
//!
//! Boxes arrive in content-stream order. Two consecutive boxes belong to the
//! same line when they overlap vertically by more than
//! `min(h0, h1) * line_overlap` and the horizontal gap between them is below
//! `max(w0, w1) * margin`.
//!
//! Moving right, the gap is the space between the previous box's right edge
//! and the next box's left edge (0 when they overlap). Moving left, the gap
//! is how far the next box starts behind the previous box's right edge, and
//! it is compared against the separate `char_margin_left`. A small left
//! margin keeps a line that wraps back to the start of the same baseline
//! band (common with stacked Tibetan glyphs) from being merged into the line
//! before it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Parameters for [`group_into_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineGroupingParams {
    /// Gap allowance moving right, in multiples of the wider box
    pub char_margin: f32,
    /// Gap allowance moving left, in multiples of the wider box
    pub char_margin_left: f32,
    /// Required vertical overlap, as a fraction of the shorter box
    pub line_overlap: f32,
}

impl Default for LineGroupingParams {
    fn default() -> Self {
        Self::new(2.0, 0.5)
    }
}

impl LineGroupingParams {
    /// Parameters with the same margin in both directions.
    pub fn new(char_margin: f32, line_overlap: f32) -> Self {
        Self {
            char_margin,
            char_margin_left: char_margin,
            line_overlap,
        }
    }

    /// Use a different margin when moving left.
    pub fn with_char_margin_left(mut self, margin: f32) -> Self {
        self.char_margin_left = margin;
        self
    }

    /// Check that every parameter is a finite, non-negative number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("char_margin", self.char_margin),
            ("char_margin_left", self.char_margin_left),
            ("line_overlap", self.line_overlap),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// `true` when `next` continues the line `prev` is on.
fn continues_line(prev: &Rect, next: &Rect, params: &LineGroupingParams) -> bool {
    let overlap = prev.vertical_overlap(next);
    if overlap <= 0.0 || overlap <= prev.height.min(next.height) * params.line_overlap {
        return false;
    }

    let wider = prev.width.max(next.width);
    if next.left() < prev.left() {
        let distance = prev.right() - next.left();
        distance < wider * params.char_margin_left
    } else {
        let distance = (next.left() - prev.right()).max(0.0);
        distance < wider * params.char_margin
    }
}

/// Split `boxes` into lines of consecutive indices.
///
/// Every index appears exactly once and the order is preserved.
pub fn group_into_lines(boxes: &[Rect], params: &LineGroupingParams) -> Vec<Vec<usize>> {
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for (idx, bbox) in boxes.iter().enumerate() {
        if let Some(&last) = current.last() {
            if !continues_line(&boxes[last], bbox, params) {
                lines.push(std::mem::take(&mut current));
            }
        }
        current.push(idx);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    log::trace!("Grouped {} boxes into {} lines", boxes.len(), lines.len());
    lines
}
