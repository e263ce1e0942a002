//! Table-driven character conversion.

use crate::convert::error_handler::{ErrorCharHandler, Passthrough};
use crate::convert::glyph_lookup::GlyphShapeLookup;
use crate::convert::stats::ConversionStats;
use crate::convert::table::{ERROR_SENTINEL, TableLookup, TablePrecedence, TableStore};
use crate::convert::winansi::winansi_to_char;
use crate::fonts::{FontStyle, normalize_font_name};

/// Prefix of the placeholder text extractors emit for unmapped CIDs.
const CID_PLACEHOLDER: &str = "(cid:";

/// `true` for extractor placeholders such as `(cid:12)`.
pub fn is_placeholder(text: &str) -> bool {
    text.starts_with(CID_PLACEHOLDER)
}

/// Converts legacy-encoded text of a known font to Unicode.
///
/// # Example
///
/// ```
/// use deduff::convert::{CharTable, CharacterConverter, ConversionStats, TableStore};
///
/// let mut primary = CharTable::new();
/// primary.insert("Ededris-a", 'k', "ཀ");
/// let tables = TableStore::new(primary, CharTable::new());
///
/// let converter = CharacterConverter::new(&tables);
/// let mut stats = ConversionStats::new();
/// assert_eq!(converter.convert("k", "Dedris-a", &mut stats), Some("ཀ".to_string()));
/// assert_eq!(converter.convert("k", "Times", &mut stats), None);
/// ```
pub struct CharacterConverter<'a> {
    tables: &'a TableStore,
    precedence: TablePrecedence,
    sentinel: String,
    handler: Box<dyn ErrorCharHandler + 'a>,
    glyph_lookup: Option<&'a GlyphShapeLookup>,
}

impl<'a> CharacterConverter<'a> {
    /// Converter with primary precedence, passthrough handler and no shape
    /// lookup.
    pub fn new(tables: &'a TableStore) -> Self {
        Self {
            tables,
            precedence: TablePrecedence::default(),
            sentinel: ERROR_SENTINEL.to_string(),
            handler: Box::new(Passthrough),
            glyph_lookup: None,
        }
    }

    /// Table that wins disagreements.
    pub fn with_precedence(mut self, precedence: TablePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Replacement value meaning "deliberately unconvertible".
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Handler for unknown and unconvertible characters.
    pub fn with_error_handler(mut self, handler: impl ErrorCharHandler + 'a) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Shape lookup used to recover characters missing from both tables.
    pub fn with_glyph_lookup(mut self, lookup: &'a GlyphShapeLookup) -> Self {
        self.glyph_lookup = Some(lookup);
        self
    }

    /// `true` when a table has rows for the normalized font name.
    pub fn handles_font(&self, font: &str, style: FontStyle) -> bool {
        self.tables.handles_font(&normalize_font_name(font, style))
    }

    /// Convert `text` written in `font`.
    ///
    /// Returns `None` when no table knows the font; the caller decides what
    /// to emit instead.
    pub fn convert(&self, text: &str, font: &str, stats: &mut ConversionStats) -> Option<String> {
        self.convert_styled(text, font, FontStyle::empty(), stats)
    }

    /// Convert `text` written in a style variant of `font`.
    pub fn convert_styled(
        &self,
        text: &str,
        font: &str,
        style: FontStyle,
        stats: &mut ConversionStats,
    ) -> Option<String> {
        if is_placeholder(text) {
            return Some(String::new());
        }

        let normalized = normalize_font_name(font, style);
        if !self.tables.handles_font(&normalized) {
            log::debug!("No table for font '{}' ({})", normalized, font);
            stats.record_unhandled_font(&normalized);
            return None;
        }
        stats.record_handled_font(&normalized);

        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            out.push_str(&self.convert_char(ch, font, &normalized, stats));
        }
        Some(out)
    }

    /// Convert one Windows-1252 byte written in `font`.
    pub fn convert_byte(&self, byte: u8, font: &str, stats: &mut ConversionStats) -> Option<String> {
        self.convert_byte_styled(byte, font, FontStyle::empty(), stats)
    }

    /// Convert one Windows-1252 byte written in a style variant of `font`.
    pub fn convert_byte_styled(
        &self,
        byte: u8,
        font: &str,
        style: FontStyle,
        stats: &mut ConversionStats,
    ) -> Option<String> {
        let Some(ch) = winansi_to_char(byte) else {
            log::debug!("Byte 0x{:02X} is undefined in Windows-1252", byte);
            return None;
        };
        self.convert_styled(ch.encode_utf8(&mut [0; 4]), font, style, stats)
    }

    fn convert_char(
        &self,
        ch: char,
        source_font: &str,
        font: &str,
        stats: &mut ConversionStats,
    ) -> String {
        let ch = if ch == '\u{00A0}' { ' ' } else { ch };
        let codepoint = u32::from(ch);

        let lookup = self.tables.lookup(font, ch);
        if let TableLookup::Disagree { primary, secondary } = lookup {
            log::debug!(
                "Tables disagree on {} U+{:04X}: '{}' vs '{}'",
                font,
                codepoint,
                primary,
                secondary
            );
            stats.record_disagreement(font, codepoint);
        }

        let Some(value) = lookup.resolve(self.precedence) else {
            if let Some(recovered) = self.recover_by_shape(source_font, font, ch) {
                stats.record_recovery(font, ch);
                return recovered;
            }
            log::debug!("Unknown character U+{:04X} in {}", codepoint, font);
            stats.record_unknown_character(font, ch);
            return self.handler.handle(ch, font, codepoint);
        };

        if value == self.sentinel {
            stats.record_error_character();
            return self.handler.handle(ch, font, codepoint);
        }
        value.to_string()
    }

    /// First non-sentinel table value among the characters drawn with the
    /// same glyph shape, in sorted `(font, char)` order.
    fn recover_by_shape(&self, source_font: &str, font: &str, ch: char) -> Option<String> {
        let lookup = self.glyph_lookup?;

        let mut keys = vec![source_font];
        if font != source_font {
            keys.push(font);
        }

        for key in keys {
            for (alt_font, alt_ch) in lookup.shape_alternatives(key, ch) {
                let normalized = normalize_font_name(alt_font, FontStyle::empty());
                let usable = |name: &str| {
                    self.tables
                        .lookup(name, alt_ch)
                        .resolve(self.precedence)
                        .filter(|value| *value != self.sentinel)
                };
                let found = usable(&normalized).or_else(|| usable(alt_font));
                if let Some(value) = found {
                    log::debug!(
                        "Recovered U+{:04X} of {} through {} U+{:04X}",
                        u32::from(ch),
                        font,
                        alt_font,
                        u32::from(alt_ch)
                    );
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}
