//! Layout helpers for positioned glyphs.

pub mod line_grouping;

pub use line_grouping::{LineGroupingParams, group_into_lines};
