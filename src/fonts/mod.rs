//! Font programs, glyph fingerprints and font names.
//!
//! This module turns an embedded font program into a set of glyph shape
//! fingerprints ([`GlyphHash`]) and maps embedded font names to the
//! canonical keys used by the character tables.

pub mod font_name;
pub mod font_program;
mod glyf;
pub mod glyph_hash;
pub mod outline;
pub mod repair;

pub use font_name::{
    FontStyle, normalize_font_name, split_subset_tag, strip_subset_tag,
};
pub use font_program::{ExtractedFont, FontProgram, extract_glyph_records};
pub use glyph_hash::{DEFAULT_PRECISION, GlyphHash, GlyphHasher, GlyphRecord};
pub use outline::{GlyphOutline, OutlinePoint};
pub use repair::{FontForgeRepair, FontRepair, NoRepair};

/// Canonical name of a reference font (normally its PostScript name).
pub type FontIdentity = String;
