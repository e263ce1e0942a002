//! Glyph-shape lookup for recovering unknown characters.
//!
//! When neither table knows `(font, ch)`, the glyph drawn for `ch` in `font`
//! may have the same shape as a glyph of another (or the same) font that the
//! tables do know. This lookup answers "which other `(font, char)` pairs
//! draw the same shape".

use std::collections::{BTreeSet, HashMap};

use crate::fonts::{FontIdentity, GlyphHash};
use crate::identify::DetailedGlyphIndex;

/// Bidirectional map between `(font, codepoint)` and glyph hashes.
#[derive(Debug, Clone, Default)]
pub struct GlyphShapeLookup {
    by_char: HashMap<(FontIdentity, u32), BTreeSet<GlyphHash>>,
    by_hash: HashMap<GlyphHash, BTreeSet<(FontIdentity, u32)>>,
}

impl GlyphShapeLookup {
    /// Empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup over every mapped glyph of a detailed index.
    pub fn from_detailed_index(index: &DetailedGlyphIndex) -> Self {
        let mut lookup = Self::new();
        for (font, glyphs) in index.iter() {
            for (hash, details) in glyphs {
                for codepoint in details.iter().filter_map(|d| d.codepoint) {
                    lookup.insert(font, codepoint, hash.clone());
                }
            }
        }
        log::debug!("Glyph shape lookup covers {} characters", lookup.by_char.len());
        lookup
    }

    /// Record that `font` draws `codepoint` with shape `hash`.
    pub fn insert(&mut self, font: &str, codepoint: u32, hash: GlyphHash) {
        self.by_hash
            .entry(hash.clone())
            .or_default()
            .insert((font.to_string(), codepoint));
        self.by_char
            .entry((font.to_string(), codepoint))
            .or_default()
            .insert(hash);
    }

    /// `true` when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.by_char.is_empty()
    }

    /// Shapes `font` uses for `ch`.
    pub fn hashes_for(&self, font: &str, ch: char) -> Option<&BTreeSet<GlyphHash>> {
        self.by_char.get(&(font.to_string(), u32::from(ch)))
    }

    /// Every other `(font, char)` sharing a shape with `(font, ch)`, sorted
    /// and without duplicates.
    pub fn shape_alternatives(&self, font: &str, ch: char) -> Vec<(&str, char)> {
        let Some(hashes) = self.hashes_for(font, ch) else {
            return Vec::new();
        };
        let original = u32::from(ch);

        let alternatives: BTreeSet<(&str, char)> = hashes
            .iter()
            .filter_map(|hash| self.by_hash.get(hash))
            .flatten()
            .filter(|(other_font, cp)| !(other_font == font && *cp == original))
            .filter_map(|(other_font, cp)| char::from_u32(*cp).map(|c| (other_font.as_str(), c)))
            .collect();
        alternatives.into_iter().collect()
    }
}
