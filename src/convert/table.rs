//! Character conversion tables.
//!
//! A [`CharTable`] maps `(font, legacy character)` to the Unicode text it
//! stands for. Two independently curated tables are loaded into a
//! [`TableStore`]; when both know a character and disagree, a
//! [`TablePrecedence`] decides.
//!
//! Table files hold one `font,codepoint,replacement` row per line, with the
//! codepoint in decimal.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::FontIdentity;
use crate::rows::{for_each_row, format_row};

/// Replacement marking a character as deliberately unconvertible.
pub const ERROR_SENTINEL: &str = "༠༠༠༠";

/// One conversion table.
#[derive(Debug, Clone, Default)]
pub struct CharTable {
    fonts: HashMap<FontIdentity, HashMap<char, String>>,
}

impl CharTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the replacement for `(font, ch)`, overwriting any previous one.
    pub fn insert(&mut self, font: &str, ch: char, replacement: impl Into<String>) {
        if let Some(chars) = self.fonts.get_mut(font) {
            chars.insert(ch, replacement.into());
        } else {
            self.fonts
                .insert(font.to_string(), HashMap::from([(ch, replacement.into())]));
        }
    }

    /// `true` when the table has rows for `font`.
    pub fn contains_font(&self, font: &str) -> bool {
        self.fonts.contains_key(font)
    }

    /// Replacement for `(font, ch)`.
    pub fn get(&self, font: &str, ch: char) -> Option<&str> {
        self.fonts.get(font)?.get(&ch).map(String::as_str)
    }

    /// Number of fonts.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Number of `(font, char)` entries.
    pub fn len(&self) -> usize {
        self.fonts.values().map(HashMap::len).sum()
    }

    /// `true` when the table has no entry.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Read table rows.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for_each_row(reader, |line, fields| {
            let [font, codepoint, replacement]: [String; 3] =
                fields.try_into().map_err(|fields: Vec<String>| Error::RowFormat {
                    line,
                    reason: format!("expected 3 fields, found {}", fields.len()),
                })?;
            let ch = parse_codepoint(&codepoint, line)?;
            table.insert(&font, ch, replacement);
            Ok(())
        })?;
        Ok(table)
    }

    /// Load a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::info!(
            "Loaded {} entries for {} fonts from {}",
            table.len(),
            table.font_count(),
            path.display()
        );
        Ok(table)
    }

    /// Write the table, sorted by font and codepoint.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let sorted: BTreeMap<&str, BTreeMap<char, &str>> = self
            .fonts
            .iter()
            .map(|(font, chars)| {
                let chars = chars.iter().map(|(c, r)| (*c, r.as_str())).collect();
                (font.as_str(), chars)
            })
            .collect();

        for (font, chars) in sorted {
            for (ch, replacement) in chars {
                let codepoint = u32::from(ch).to_string();
                writeln!(writer, "{}", format_row(&[font, codepoint.as_str(), replacement])?)?;
            }
        }
        Ok(())
    }
}

fn parse_codepoint(text: &str, line: usize) -> Result<char> {
    let value = text.trim().parse::<u32>().map_err(|_| Error::RowFormat {
        line,
        reason: format!("invalid codepoint '{}'", text),
    })?;
    char::from_u32(value).ok_or_else(|| Error::RowFormat {
        line,
        reason: format!("codepoint {} is not a Unicode scalar value", value),
    })
}

/// Which table wins when both define a character differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablePrecedence {
    /// The primary table wins
    #[default]
    Primary,
    /// The secondary table wins
    Secondary,
}

/// What the two tables say about one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLookup<'a> {
    /// Neither table has the character
    Missing,
    /// Only the primary table has it
    Primary(&'a str),
    /// Only the secondary table has it
    Secondary(&'a str),
    /// Both tables agree
    Agree(&'a str),
    /// Both tables have it with different values
    Disagree {
        /// Primary value
        primary: &'a str,
        /// Secondary value
        secondary: &'a str,
    },
}

impl<'a> TableLookup<'a> {
    /// Value selected under `precedence`.
    pub fn resolve(self, precedence: TablePrecedence) -> Option<&'a str> {
        match self {
            Self::Missing => None,
            Self::Primary(value) | Self::Secondary(value) | Self::Agree(value) => Some(value),
            Self::Disagree { primary, secondary } => match precedence {
                TablePrecedence::Primary => Some(primary),
                TablePrecedence::Secondary => Some(secondary),
            },
        }
    }
}

/// Primary and secondary tables, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    primary: CharTable,
    secondary: CharTable,
}

impl TableStore {
    /// Store over two loaded tables.
    pub fn new(primary: CharTable, secondary: CharTable) -> Self {
        Self { primary, secondary }
    }

    /// Load the primary table and, optionally, the secondary one.
    pub fn load(primary: impl AsRef<Path>, secondary: Option<&Path>) -> Result<Self> {
        let primary = CharTable::load(primary)?;
        let secondary = match secondary {
            Some(path) => CharTable::load(path)?,
            None => CharTable::new(),
        };
        Ok(Self::new(primary, secondary))
    }

    /// Primary table.
    pub fn primary(&self) -> &CharTable {
        &self.primary
    }

    /// Secondary table.
    pub fn secondary(&self) -> &CharTable {
        &self.secondary
    }

    /// `true` when either table has rows for `font`.
    pub fn handles_font(&self, font: &str) -> bool {
        self.primary.contains_font(font) || self.secondary.contains_font(font)
    }

    /// Look `(font, ch)` up in both tables.
    pub fn lookup(&self, font: &str, ch: char) -> TableLookup<'_> {
        match (self.primary.get(font, ch), self.secondary.get(font, ch)) {
            (None, None) => TableLookup::Missing,
            (Some(p), None) => TableLookup::Primary(p),
            (None, Some(s)) => TableLookup::Secondary(s),
            (Some(p), Some(s)) if p == s => TableLookup::Agree(p),
            (Some(primary), Some(secondary)) => TableLookup::Disagree { primary, secondary },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let data = "Ededris-a,97,ཀ\nEdedris-a,98,\"ཁ,\"\nEdedris-a,99,\n";
        let table = CharTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.get("Ededris-a", 'a'), Some("ཀ"));
        assert_eq!(table.get("Ededris-a", 'b'), Some("ཁ,"));
        assert_eq!(table.get("Ededris-a", 'c'), Some(""));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_later_rows_overwrite() {
        let data = "F,97,x\nF,97,y\n";
        let table = CharTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.get("F", 'a'), Some("y"));
    }

    #[test]
    fn test_wrong_field_count() {
        let err = CharTable::from_reader("F,97\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::RowFormat { line: 1, .. }));
        let err = CharTable::from_reader("F,97,a,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::RowFormat { line: 1, .. }));
    }

    #[test]
    fn test_invalid_codepoint() {
        assert!(CharTable::from_reader("F,abc,x\n".as_bytes()).is_err());
        // surrogate
        assert!(CharTable::from_reader("F,55296,x\n".as_bytes()).is_err());
    }

    #[test]
    fn test_write_round_trip_sorted() {
        let mut table = CharTable::new();
        table.insert("B", 'b', "2");
        table.insert("A", 'z', "\"q\"");
        table.insert("A", 'a', "1");

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "A,97,1\nA,122,\"\"\"q\"\"\"\nB,98,2\n");

        let back = CharTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(back.get("A", 'z'), Some("\"q\""));
    }

    #[test]
    fn test_lookup_variants() {
        let mut primary = CharTable::new();
        primary.insert("F", 'a', "1");
        primary.insert("F", 'b', "2");
        primary.insert("F", 'c', "3");
        let mut secondary = CharTable::new();
        secondary.insert("F", 'b', "2");
        secondary.insert("F", 'c', "x");
        secondary.insert("F", 'd', "4");
        let store = TableStore::new(primary, secondary);

        assert_eq!(store.lookup("F", 'a'), TableLookup::Primary("1"));
        assert_eq!(store.lookup("F", 'b'), TableLookup::Agree("2"));
        assert_eq!(
            store.lookup("F", 'c'),
            TableLookup::Disagree {
                primary: "3",
                secondary: "x"
            }
        );
        assert_eq!(store.lookup("F", 'd'), TableLookup::Secondary("4"));
        assert_eq!(store.lookup("F", 'e'), TableLookup::Missing);
        assert_eq!(store.lookup("F", 'c').resolve(TablePrecedence::Secondary), Some("x"));
        assert!(store.handles_font("F"));
        assert!(!store.handles_font("G"));
    }
}
