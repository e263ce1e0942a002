//! Per-pass conversion statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;

/// Counters collected during one conversion pass.
///
/// Maps are ordered so that the JSON dump is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Fonts no table knows -> number of conversion calls
    pub unhandled_fonts: BTreeMap<String, usize>,
    /// Fonts some table knows -> number of conversion calls
    pub handled_fonts: BTreeMap<String, usize>,
    /// Font -> character missing from both tables -> occurrences
    pub unknown_characters: BTreeMap<String, BTreeMap<char, usize>>,
    /// Font -> codepoint the two tables disagree on -> occurrences
    pub table_disagreements: BTreeMap<String, BTreeMap<u32, usize>>,
    /// Font -> character recovered through glyph shape -> occurrences
    pub recovered_characters: BTreeMap<String, BTreeMap<char, usize>>,
    /// Characters that resolved to the unconvertible sentinel
    pub error_characters: usize,
    /// Rotated runs dropped
    pub non_horizontal_removed: usize,
}

impl ConversionStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_unhandled_font(&mut self, font: &str) {
        *self.unhandled_fonts.entry(font.to_string()).or_default() += 1;
    }

    pub(crate) fn record_handled_font(&mut self, font: &str) {
        *self.handled_fonts.entry(font.to_string()).or_default() += 1;
    }

    pub(crate) fn record_unknown_character(&mut self, font: &str, ch: char) {
        *self
            .unknown_characters
            .entry(font.to_string())
            .or_default()
            .entry(ch)
            .or_default() += 1;
    }

    pub(crate) fn record_disagreement(&mut self, font: &str, codepoint: u32) {
        *self
            .table_disagreements
            .entry(font.to_string())
            .or_default()
            .entry(codepoint)
            .or_default() += 1;
    }

    pub(crate) fn record_recovery(&mut self, font: &str, ch: char) {
        *self
            .recovered_characters
            .entry(font.to_string())
            .or_default()
            .entry(ch)
            .or_default() += 1;
    }

    pub(crate) fn record_error_character(&mut self) {
        self.error_characters += 1;
    }

    pub(crate) fn record_non_horizontal(&mut self) {
        self.non_horizontal_removed += 1;
    }

    /// Total unknown character occurrences over all fonts.
    pub fn unknown_character_count(&self) -> usize {
        self.unknown_characters.values().flat_map(BTreeMap::values).sum()
    }

    /// Total disagreement occurrences over all fonts.
    pub fn disagreement_count(&self) -> usize {
        self.table_disagreements.values().flat_map(BTreeMap::values).sum()
    }

    /// Pretty-printed JSON dump.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Log a one-line summary at info level.
    pub fn log_summary(&self) {
        log::info!(
            "Conversion: {} handled fonts, {} unhandled, {} unknown chars, {} disagreements, {} error chars",
            self.handled_fonts.len(),
            self.unhandled_fonts.len(),
            self.unknown_character_count(),
            self.disagreement_count(),
            self.error_characters
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = ConversionStats::new();
        stats.record_unknown_character("F", 'x');
        stats.record_unknown_character("F", 'x');
        stats.record_unknown_character("G", 'y');
        stats.record_disagreement("F", 98);
        assert_eq!(stats.unknown_character_count(), 3);
        assert_eq!(stats.disagreement_count(), 1);
        assert_eq!(stats.unknown_characters["F"][&'x'], 2);
    }

    #[test]
    fn test_json_dump() {
        let mut stats = ConversionStats::new();
        stats.record_handled_font("Ededris-a");
        stats.record_disagreement("Ededris-a", 98);
        stats.record_error_character();

        let json = stats.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["handled_fonts"]["Ededris-a"], 1);
        assert_eq!(value["table_disagreements"]["Ededris-a"]["98"], 1);
        assert_eq!(value["error_characters"], 1);
    }
}
