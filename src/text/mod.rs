//! Post-processing of converted text.

pub mod font_sizes;

pub use font_sizes::{collapse_blank_lines, simplify_font_sizes};
