//! Font program access for glyph fingerprinting.
//!
//! This module wraps the `ttf-parser` crate to read what the index needs
//! from a TrueType font program: the PostScript name, units-per-em, glyph
//! names and the Unicode cmap. Outline points are decoded straight from
//! the `glyf` table.
//!
//! Programs with cubic (CFF/CFF2) outlines are rejected with
//! [`Error::UnsupportedGlyphFormat`]. [`extract_glyph_records`] can route
//! such programs through a [`FontRepair`] hook that rewrites them into a
//! supported form.

use std::collections::{BTreeSet, HashMap};

use ttf_parser::{Face, GlyphId, Tag};

use crate::error::{Error, Result};
use crate::fonts::glyf::GlyfTable;
use crate::fonts::glyph_hash::{GlyphHasher, GlyphRecord};
use crate::fonts::outline::GlyphOutline;
use crate::fonts::repair::FontRepair;

/// Parsed font program.
pub struct FontProgram<'a> {
    /// The parsed font face
    face: Face<'a>,
    /// Glyph ID -> sorted Unicode codepoints
    glyph_codepoints: HashMap<u16, Vec<u32>>,
    /// Raw quadratic outlines, absent for CFF programs
    glyf: Option<GlyfTable<'a>>,
}

impl<'a> FontProgram<'a> {
    /// Parse a font program from raw bytes.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyFont);
        }

        let face = Face::parse(data, 0).map_err(|e| Error::FontParse(e.to_string()))?;
        let glyph_codepoints = Self::build_codepoint_map(&face);
        let glyf = Self::glyf_table(&face)?;

        Ok(Self {
            face,
            glyph_codepoints,
            glyf,
        })
    }

    fn glyf_table(face: &Face<'a>) -> Result<Option<GlyfTable<'a>>> {
        let raw = face.raw_face();
        let (Some(head), Some(loca), Some(glyf)) = (
            raw.table(Tag::from_bytes(b"head")),
            raw.table(Tag::from_bytes(b"loca")),
            raw.table(Tag::from_bytes(b"glyf")),
        ) else {
            return Ok(None);
        };
        GlyfTable::parse(head, loca, glyf, face.number_of_glyphs()).map(Some)
    }

    /// Build the reverse cmap from the Unicode subtables.
    fn build_codepoint_map(face: &Face<'_>) -> HashMap<u16, Vec<u32>> {
        let mut sets: HashMap<u16, BTreeSet<u32>> = HashMap::new();

        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|codepoint| {
                    if let Some(gid) = subtable.glyph_index(codepoint) {
                        sets.entry(gid.0).or_default().insert(codepoint);
                    }
                });
            }
        }

        sets.into_iter()
            .map(|(gid, cps)| (gid, cps.into_iter().collect()))
            .collect()
    }

    /// Get the font's PostScript name (name ID 6).
    ///
    /// Records that cannot be decoded (e.g. Mac records in a non-Roman
    /// encoding) are skipped; the first non-empty one wins.
    pub fn postscript_name(&self) -> Option<String> {
        self.face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .filter_map(|name| name.to_string())
            .find(|name| !name.is_empty())
    }

    /// Get units per em for this font.
    pub fn units_per_em(&self) -> u16 {
        self.face.units_per_em()
    }

    /// Get the number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        self.face.number_of_glyphs()
    }

    /// `true` when the program carries quadratic `glyf` outlines.
    pub fn has_quadratic_outlines(&self) -> bool {
        self.glyf.is_some()
    }

    /// Glyph name from `post`/CFF, or `glyphNNNNN` when the font has none.
    pub fn glyph_name(&self, glyph_id: u16) -> String {
        self.face
            .glyph_name(GlyphId(glyph_id))
            .map(str::to_string)
            .unwrap_or_else(|| format!("glyph{:05}", glyph_id))
    }

    /// Unicode codepoints mapped to a glyph.
    pub fn codepoints(&self, glyph_id: u16) -> &[u32] {
        self.glyph_codepoints
            .get(&glyph_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Outline of one glyph: the stored points with their on-curve flags,
    /// composites flattened.
    pub fn outline(&self, glyph_id: u16) -> Result<GlyphOutline> {
        let Some(glyf) = &self.glyf else {
            return Err(Error::UnsupportedGlyphFormat(
                "font has no 'glyf' table".to_string(),
            ));
        };

        Ok(GlyphOutline {
            glyph_name: self.glyph_name(glyph_id),
            units_per_em: self.units_per_em(),
            contours: glyf.contours(glyph_id)?,
        })
    }

    /// Fingerprint every glyph of the font.
    pub fn glyph_records(&self, hasher: &GlyphHasher) -> Result<Vec<GlyphRecord>> {
        let mut records = Vec::with_capacity(self.num_glyphs() as usize);
        for glyph_id in 0..self.num_glyphs() {
            let outline = self.outline(glyph_id)?;
            records.push(GlyphRecord {
                hash: hasher.hash(&outline),
                glyph_name: outline.glyph_name,
                codepoints: self.codepoints(glyph_id).to_vec(),
            });
        }
        Ok(records)
    }
}

impl std::fmt::Debug for FontProgram<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontProgram")
            .field("postscript_name", &self.postscript_name())
            .field("num_glyphs", &self.num_glyphs())
            .field("units_per_em", &self.units_per_em())
            .finish()
    }
}

/// Glyph records of one font program plus the name it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFont {
    /// PostScript name declared by the program, if any
    pub declared_name: Option<String>,
    /// One record per glyph, in glyph ID order
    pub records: Vec<GlyphRecord>,
}

impl ExtractedFont {
    /// Declared name, or `fallback` when the program has none.
    pub fn name_or(&self, fallback: &str) -> String {
        self.declared_name
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Set of distinct glyph hashes.
    pub fn hash_set(&self) -> std::collections::HashSet<crate::fonts::GlyphHash> {
        self.records.iter().map(|r| r.hash.clone()).collect()
    }
}

fn extract_once(data: &[u8], hasher: &GlyphHasher) -> Result<ExtractedFont> {
    let program = FontProgram::parse(data)?;
    let records = program.glyph_records(hasher)?;
    Ok(ExtractedFont {
        declared_name: program.postscript_name(),
        records,
    })
}

/// Parse `data` and fingerprint all glyphs.
///
/// On failure the program is handed to `repair`; if the repaired bytes
/// extract cleanly they are used, otherwise the original error is returned.
pub fn extract_glyph_records(
    data: &[u8],
    hasher: &GlyphHasher,
    repair: &dyn FontRepair,
) -> Result<ExtractedFont> {
    match extract_once(data, hasher) {
        Ok(font) => Ok(font),
        Err(initial) => {
            log::debug!("Font extraction failed ({}), attempting repair", initial);
            let Some(repaired) = repair.repair(data) else {
                return Err(initial);
            };
            match extract_once(&repaired, hasher) {
                Ok(font) => {
                    log::info!("Extracted {} glyphs after font repair", font.records.len());
                    Ok(font)
                },
                Err(e) => {
                    log::debug!("Repaired font still unusable: {}", e);
                    Err(initial)
                },
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::repair::NoRepair;

    #[test]
    fn test_parse_empty_font() {
        assert!(matches!(FontProgram::parse(&[]), Err(Error::EmptyFont)));
    }

    #[test]
    fn test_parse_garbage_font() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        assert!(matches!(FontProgram::parse(&data), Err(Error::FontParse(_))));
    }

    #[test]
    fn test_extract_returns_original_error_without_repair() {
        let err = extract_glyph_records(b"not a font", &GlyphHasher::new(), &NoRepair).unwrap_err();
        assert!(matches!(err, Error::FontParse(_)));
    }

    #[test]
    fn test_extract_keeps_original_error_when_repair_output_is_bad() {
        let repair = |_: &[u8]| Some(b"still not a font".to_vec());
        let err = extract_glyph_records(&[], &GlyphHasher::new(), &repair).unwrap_err();
        assert!(matches!(err, Error::EmptyFont));
    }

    #[test]
    fn test_extracted_font_name_fallback() {
        let font = ExtractedFont {
            declared_name: None,
            records: Vec::new(),
        };
        assert_eq!(font.name_or("stem"), "stem");
    }
}
