//! Shape fingerprints for glyph outlines.
//!
//! The fingerprint only depends on the drawn shape:
//!
//! 1. coordinates are divided by the font's units-per-em, so the same design
//!    drawn on a 1000 or 2048 unit grid hashes the same;
//! 2. the outline is shifted so its bounding-box minimum sits at the origin;
//! 3. each point is written as `x,y,flag` with fixed precision, a `|` part
//!    follows the last point of every contour, parts are joined with `;`;
//! 4. the UTF-8 text is hashed with SHA-256.
//!
//! Glyphs without points hash `EMPTY:<glyph name>` instead, so different
//! empty glyphs stay distinguishable while remaining deterministic.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fonts::outline::GlyphOutline;

/// Decimal places used when serializing normalized coordinates.
pub const DEFAULT_PRECISION: usize = 6;

/// Lowercase hex SHA-256 digest of a normalized glyph outline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlyphHash(String);

impl GlyphHash {
    /// Wrap an existing hex digest (e.g. read back from the glyph database).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlyphHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One glyph of a font: name, shape fingerprint and mapped codepoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlyphRecord {
    /// Glyph name from the font (or a synthesized `glyphNNNNN`)
    pub glyph_name: String,
    /// Shape fingerprint
    pub hash: GlyphHash,
    /// Unicode codepoints mapped to this glyph, sorted
    pub codepoints: Vec<u32>,
}

/// Computes [`GlyphHash`]es.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphHasher {
    precision: usize,
}

impl Default for GlyphHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphHasher {
    /// Hasher with [`DEFAULT_PRECISION`].
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }

    /// Hasher with a custom number of decimal places.
    ///
    /// Hashes computed with different precisions are not comparable; an index
    /// must be queried with the precision it was built with.
    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    /// Decimal places used for coordinates.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Normalized textual form of the outline that gets hashed.
    pub fn serialize(&self, outline: &GlyphOutline) -> String {
        if outline.is_empty() {
            return format!("EMPTY:{}", outline.glyph_name);
        }

        let upem = f64::from(outline.units_per_em.max(1));
        let min_x = outline
            .points()
            .map(|p| f64::from(p.x))
            .fold(f64::INFINITY, f64::min);
        let min_y = outline
            .points()
            .map(|p| f64::from(p.y))
            .fold(f64::INFINITY, f64::min);

        // Translate before scaling: integer design coordinates subtract
        // exactly, so scaled copies of a glyph divide to identical values.
        let mut parts: Vec<String> = Vec::with_capacity(outline.point_count() + outline.contours.len());
        for contour in &outline.contours {
            if contour.is_empty() {
                continue;
            }
            for point in contour {
                let x = (f64::from(point.x) - min_x) / upem;
                let y = (f64::from(point.y) - min_y) / upem;
                parts.push(format!(
                    "{:.*},{:.*},{}",
                    self.precision,
                    x,
                    self.precision,
                    y,
                    u8::from(point.on_curve)
                ));
            }
            parts.push("|".to_string());
        }

        parts.join(";")
    }

    /// Fingerprint an outline.
    pub fn hash(&self, outline: &GlyphOutline) -> GlyphHash {
        GlyphHash(hex_digest(self.serialize(outline).as_bytes()))
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
