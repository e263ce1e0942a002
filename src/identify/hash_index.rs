//! Reference font indexes.
//!
//! [`FontHashIndex`] maps each reference font to the set of its glyph shape
//! hashes and answers superset queries. [`DetailedGlyphIndex`] keeps, for
//! each font and hash, which glyph names and codepoints carry that shape. It
//! backs ambiguity diagnostics and the glyph-shape fallback during
//! conversion.
//!
//! Both can be persisted as a glyph database with one row per
//! `(font, glyph, codepoint)`:
//!
//! ```text
//! glyph_hash,font_postscript_name,glyph_name,codepoint,unicode_hex
//! 9f2c...,Dedris-a,uni0F40,3904,U+0F40
//! 51aa...,Dedris-a,space,,
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fonts::{FontIdentity, GlyphHash, GlyphRecord};
use crate::rows::{for_each_row, format_row};

/// Fonts whose glyph sets could contain an embedded subset, sorted.
pub type CandidateSet = BTreeSet<FontIdentity>;

/// Header written at the top of a glyph database.
pub const GLYPH_DB_HEADER: [&str; 5] = [
    "glyph_hash",
    "font_postscript_name",
    "glyph_name",
    "codepoint",
    "unicode_hex",
];

/// Map from reference font to its glyph hash set.
#[derive(Debug, Clone, Default)]
pub struct FontHashIndex {
    fonts: IndexMap<FontIdentity, HashSet<GlyphHash>>,
}

impl FontHashIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fonts in the index.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// `true` when the index holds no font.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// `true` when `font` is indexed.
    pub fn contains_font(&self, font: &str) -> bool {
        self.fonts.contains_key(font)
    }

    /// Hash set of one font.
    pub fn hashes(&self, font: &str) -> Option<&HashSet<GlyphHash>> {
        self.fonts.get(font)
    }

    /// Font names in insertion order.
    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Store a font's complete hash set, replacing any previous set.
    ///
    /// Returns the replaced set.
    pub fn insert_font(
        &mut self,
        font: impl Into<FontIdentity>,
        hashes: HashSet<GlyphHash>,
    ) -> Option<HashSet<GlyphHash>> {
        self.fonts.insert(font.into(), hashes)
    }

    /// Add one hash to a font, creating the font if needed.
    pub fn add_hash(&mut self, font: &str, hash: GlyphHash) {
        if let Some(set) = self.fonts.get_mut(font) {
            set.insert(hash);
        } else {
            self.fonts.insert(font.to_string(), HashSet::from([hash]));
        }
    }

    /// Every font whose hash set is a superset of `hashes`.
    ///
    /// An empty query matches nothing.
    pub fn candidates_for(&self, hashes: &HashSet<GlyphHash>) -> CandidateSet {
        if hashes.is_empty() {
            return CandidateSet::new();
        }
        self.fonts
            .iter()
            .filter(|(_, reference)| hashes.is_subset(reference))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Load from glyph database rows. Hashes of repeated fonts accumulate.
    pub fn from_glyph_db<R: BufRead>(reader: R) -> Result<Self> {
        let mut index = Self::new();
        read_glyph_db(reader, |font, detail| index.add_hash(&font, detail.glyph_hash))?;
        log::info!("Loaded hash index with {} fonts", index.len());
        Ok(index)
    }

    /// Load a glyph database file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_glyph_db(BufReader::new(File::open(path)?))
    }
}

impl From<&DetailedGlyphIndex> for FontHashIndex {
    fn from(detailed: &DetailedGlyphIndex) -> Self {
        let fonts = detailed
            .fonts
            .iter()
            .map(|(name, glyphs)| (name.clone(), glyphs.keys().cloned().collect()))
            .collect();
        Self { fonts }
    }
}

/// One glyph carrying a given shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GlyphDetail {
    /// Glyph name in the reference font
    pub glyph_name: String,
    /// Shape hash
    pub glyph_hash: GlyphHash,
    /// Unicode codepoint, if the glyph is mapped
    pub codepoint: Option<u32>,
}

/// Font -> hash -> glyphs with that shape.
#[derive(Debug, Clone, Default)]
pub struct DetailedGlyphIndex {
    fonts: IndexMap<FontIdentity, HashMap<GlyphHash, BTreeSet<GlyphDetail>>>,
}

impl DetailedGlyphIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// `true` when no font is indexed.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Add a single detail.
    pub fn add_detail(&mut self, font: &str, detail: GlyphDetail) {
        if !self.fonts.contains_key(font) {
            self.fonts.insert(font.to_string(), HashMap::new());
        }
        if let Some(glyphs) = self.fonts.get_mut(font) {
            glyphs.entry(detail.glyph_hash.clone()).or_default().insert(detail);
        }
    }

    /// Add a glyph record: one detail per codepoint, or one unmapped detail.
    pub fn add_record(&mut self, font: &str, record: &GlyphRecord) {
        if record.codepoints.is_empty() {
            self.add_detail(
                font,
                GlyphDetail {
                    glyph_name: record.glyph_name.clone(),
                    glyph_hash: record.hash.clone(),
                    codepoint: None,
                },
            );
        }
        for &cp in &record.codepoints {
            self.add_detail(
                font,
                GlyphDetail {
                    glyph_name: record.glyph_name.clone(),
                    glyph_hash: record.hash.clone(),
                    codepoint: Some(cp),
                },
            );
        }
    }

    /// Replace everything known about `font` with `records`.
    pub fn replace_font(&mut self, font: &str, records: &[GlyphRecord]) {
        self.fonts.shift_remove(font);
        self.fonts.insert(font.to_string(), HashMap::new());
        for record in records {
            self.add_record(font, record);
        }
    }

    /// Glyphs of `font` with shape `hash`.
    pub fn details(&self, font: &str, hash: &GlyphHash) -> Option<&BTreeSet<GlyphDetail>> {
        self.fonts.get(font)?.get(hash)
    }

    /// All glyphs of one font, keyed by hash.
    pub fn font_glyphs(&self, font: &str) -> Option<&HashMap<GlyphHash, BTreeSet<GlyphDetail>>> {
        self.fonts.get(font)
    }

    /// Iterate over `(font, hash -> glyphs)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<GlyphHash, BTreeSet<GlyphDetail>>)> {
        self.fonts.iter().map(|(name, glyphs)| (name.as_str(), glyphs))
    }

    /// Load from glyph database rows.
    pub fn from_glyph_db<R: BufRead>(reader: R) -> Result<Self> {
        let mut index = Self::new();
        read_glyph_db(reader, |font, detail| index.add_detail(&font, detail))?;
        log::info!("Loaded detailed glyph index with {} fonts", index.len());
        Ok(index)
    }

    /// Load a glyph database file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_glyph_db(BufReader::new(File::open(path)?))
    }

    /// Write the index as a glyph database.
    ///
    /// Fonts keep insertion order; rows within a font are sorted.
    pub fn write_glyph_db<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", format_row(&GLYPH_DB_HEADER)?)?;
        for (font, glyphs) in &self.fonts {
            let mut details: Vec<&GlyphDetail> = glyphs.values().flatten().collect();
            details.sort();
            for detail in details {
                let (codepoint, unicode_hex) = match detail.codepoint {
                    Some(cp) => (cp.to_string(), format!("U+{:04X}", cp)),
                    None => (String::new(), String::new()),
                };
                let row = format_row(&[
                    detail.glyph_hash.as_str(),
                    font.as_str(),
                    detail.glyph_name.as_str(),
                    codepoint.as_str(),
                    unicode_hex.as_str(),
                ])?;
                writeln!(writer, "{}", row)?;
            }
        }
        Ok(())
    }

    /// Write the index to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = std::io::BufWriter::new(File::create(path)?);
        self.write_glyph_db(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Column positions in a glyph database.
#[derive(Debug, Clone, Copy)]
struct GlyphDbColumns {
    hash: usize,
    font: usize,
    glyph_name: Option<usize>,
    codepoint: Option<usize>,
}

impl Default for GlyphDbColumns {
    fn default() -> Self {
        Self {
            hash: 0,
            font: 1,
            glyph_name: Some(2),
            codepoint: Some(3),
        }
    }
}

impl GlyphDbColumns {
    fn is_header(fields: &[String]) -> bool {
        fields.iter().any(|f| f == GLYPH_DB_HEADER[0])
    }

    fn from_header(fields: &[String], line: usize) -> Result<Self> {
        let position = |name: &str| fields.iter().position(|f| f.trim() == name);
        let missing = |name: &str| Error::RowFormat {
            line,
            reason: format!("glyph database header lacks '{}'", name),
        };
        Ok(Self {
            hash: position(GLYPH_DB_HEADER[0]).ok_or_else(|| missing(GLYPH_DB_HEADER[0]))?,
            font: position(GLYPH_DB_HEADER[1]).ok_or_else(|| missing(GLYPH_DB_HEADER[1]))?,
            glyph_name: position(GLYPH_DB_HEADER[2]),
            codepoint: position(GLYPH_DB_HEADER[3]),
        })
    }
}

/// Read glyph database rows, handing `(font, detail)` pairs to `sink`.
fn read_glyph_db<R, F>(reader: R, mut sink: F) -> Result<usize>
where
    R: BufRead,
    F: FnMut(String, GlyphDetail),
{
    let mut columns: Option<GlyphDbColumns> = None;
    let mut rows = 0;

    for_each_row(reader, |line, fields| {
        let known = columns;
        let cols = match known {
            Some(cols) => cols,
            None if GlyphDbColumns::is_header(&fields) => {
                columns = Some(GlyphDbColumns::from_header(&fields, line)?);
                return Ok(());
            },
            None => {
                let cols = GlyphDbColumns::default();
                columns = Some(cols);
                cols
            },
        };

        let get = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or("");
        let hash = get(cols.hash);
        let font = get(cols.font);
        if hash.is_empty() || font.is_empty() {
            log::debug!("Skipping glyph database row {} without hash or font", line);
            return Ok(());
        }

        // Older databases write `None` for glyphs without a codepoint.
        let codepoint_text = cols
            .codepoint
            .map(get)
            .filter(|c| !c.is_empty() && *c != "None");
        let codepoint = match codepoint_text {
            Some(text) => Some(text.parse::<u32>().map_err(|_| Error::RowFormat {
                line,
                reason: format!("invalid codepoint '{}'", text),
            })?),
            None => None,
        };

        sink(
            font.to_string(),
            GlyphDetail {
                glyph_name: cols.glyph_name.map(get).unwrap_or("").to_string(),
                glyph_hash: GlyphHash::from_hex(hash),
                codepoint,
            },
        );
        rows += 1;
        Ok(())
    })?;

    Ok(rows)
}
