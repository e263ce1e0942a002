//! Font identification engine.
//!
//! - [`FontHashIndex`] / [`DetailedGlyphIndex`]: reference fonts and their
//!   glyph shape hashes, persisted as a glyph database
//! - [`IndexBuilder`]: ingests reference font programs
//! - [`FontIdentifier`]: matches embedded programs against the index, per
//!   font or per document

pub mod builder;
pub mod hash_index;
pub mod identifier;
pub mod resources;

pub use builder::{BuildReport, IndexBuilder};
pub use hash_index::{CandidateSet, DetailedGlyphIndex, FontHashIndex, GLYPH_DB_HEADER, GlyphDetail};
pub use identifier::{AmbiguityReport, DocumentIdentification, FontIdentifier};
pub use resources::{EmbeddedProgram, FontResource, PageFonts, ProgramId};
