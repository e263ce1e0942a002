// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # deduff
//!
//! Recover Unicode text from documents typeset with legacy, font-dependent
//! encodings (pre-Unicode Tibetan fonts such as Dedris or Sama), where the
//! bytes in the document only mean something together with the font that
//! draws them.
//!
//! ## Core Features
//!
//! ### Font Identification
//! - **Glyph Shape Hashing**: outline fingerprints independent of units-per-em
//!   and glyph position
//! - **Subset Matching**: embedded subsets are matched to every reference font
//!   containing all of their glyphs, renamed fonts included
//! - **Document Pass**: subset-tag fast path, each embedded program hashed once,
//!   ambiguity reports with sample glyph evidence
//!
//! ### Character Recovery
//! - **Two Tables**: primary and secondary conversion tables with configurable
//!   precedence and disagreement tracking
//! - **Name Normalization**: alias table, family renames, bold/italic variants
//! - **Shape Recovery**: characters unknown to both tables recovered through
//!   glyphs of identical shape
//! - **Statistics**: unknown fonts, unknown characters, disagreements and
//!   unconvertible characters per pass, dumpable as JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use deduff::{RecoveryConfig, RecoveryContext};
//! use deduff::convert::ConversionStats;
//!
//! # fn main() -> deduff::Result<()> {
//! let config = RecoveryConfig::new()
//!     .with_primary_table("tables/primary.csv")
//!     .with_secondary_table("tables/secondary.csv");
//! let context = RecoveryContext::load(&config)?;
//!
//! let mut stats = ConversionStats::new();
//! let text = context.converter().convert("k", "Dedris-a", &mut stats);
//! println!("{:?}", text);
//! println!("{}", stats.to_json()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;
pub mod context;

// Persisted row format
pub mod rows;

// Font identification
pub mod fonts;
pub mod identify;

// Character recovery
pub mod convert;

// Layout analysis
pub mod geometry;
pub mod layout;

// Text post-processing
pub mod text;

// Re-exports
pub use config::RecoveryConfig;
pub use context::RecoveryContext;
pub use convert::{CharacterConverter, ConversionStats, TableStore};
pub use error::{Error, Result};
pub use fonts::{FontStyle, GlyphHash, GlyphHasher, normalize_font_name};
pub use identify::{CandidateSet, FontHashIndex, FontIdentifier};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is populated from CARGO_PKG_VERSION at compile time
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "deduff");
    }
}
