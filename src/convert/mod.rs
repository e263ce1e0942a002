//! Character recovery engine.
//!
//! Converts text written in legacy font encodings to Unicode using two
//! conversion tables, with glyph-shape recovery for characters neither table
//! knows and per-pass statistics of everything that could not be converted
//! cleanly.

pub mod converter;
pub mod error_handler;
pub mod glyph_lookup;
pub mod run;
pub mod stats;
pub mod table;
pub mod winansi;

pub use converter::{CharacterConverter, is_placeholder};
pub use error_handler::{DebugMarker, DropCharacter, ErrorCharHandler, Passthrough};
pub use glyph_lookup::GlyphShapeLookup;
pub use run::{DEFAULT_FONT_SIZE_FORMAT, DEFAULT_PAGE_BREAK_FORMAT, RunConverter, TextRun};
pub use stats::ConversionStats;
pub use table::{CharTable, ERROR_SENTINEL, TableLookup, TablePrecedence, TableStore};
pub use winansi::winansi_to_char;
