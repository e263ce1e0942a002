//! Conversion of positioned text runs.
//!
//! The document engine hands over runs in reading order. Each run carries
//! the font it was drawn with; the identification result may override that
//! name with the reference font the embedded program was matched to.

use crate::convert::converter::CharacterConverter;
use crate::convert::stats::ConversionStats;
use crate::fonts::{FontStyle, strip_subset_tag};
use crate::identify::DocumentIdentification;
use crate::text::{collapse_blank_lines, simplify_font_sizes};

/// Default font-size marker; `{}` is replaced by the rounded size.
pub const DEFAULT_FONT_SIZE_FORMAT: &str = "<fs:{}>";

/// Default page separator; `{}` is replaced by the page number.
pub const DEFAULT_PAGE_BREAK_FORMAT: &str = "\n\n-- page {} --\n\n";

/// One run of text drawn with a single font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Extracted (legacy-encoded) text
    pub text: String,
    /// Font name as found in the document, possibly subset-tagged
    pub font_name: Option<String>,
    /// `true` when the text matrix is not horizontal
    pub rotated: bool,
    /// Font size in points
    pub font_size: Option<f32>,
    /// Weight and slant
    pub style: FontStyle,
}

impl TextRun {
    /// Horizontal run in `font_name` without size information.
    pub fn new(text: impl Into<String>, font_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_name: Some(font_name.into()),
            rotated: false,
            font_size: None,
            style: FontStyle::empty(),
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Mark the run as rotated.
    pub fn rotated(mut self) -> Self {
        self.rotated = true;
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

/// Accumulates converted runs into page text.
pub struct RunConverter<'a> {
    converter: CharacterConverter<'a>,
    identification: Option<&'a DocumentIdentification>,
    remove_non_horizontal: bool,
    font_size_format: Option<String>,
    page_break_format: String,
    simplify_sizes: bool,
    current_font_size: Option<i64>,
    output: String,
}

impl<'a> RunConverter<'a> {
    /// Run converter around a character converter. Rotated runs are removed,
    /// font sizes are not tracked.
    pub fn new(converter: CharacterConverter<'a>) -> Self {
        Self {
            converter,
            identification: None,
            remove_non_horizontal: true,
            font_size_format: None,
            page_break_format: DEFAULT_PAGE_BREAK_FORMAT.to_string(),
            simplify_sizes: false,
            current_font_size: None,
            output: String::new(),
        }
    }

    /// Use document identification results to override font names.
    pub fn with_identification(mut self, identification: &'a DocumentIdentification) -> Self {
        self.identification = Some(identification);
        self
    }

    /// Drop (`true`) or keep rotated runs.
    pub fn with_remove_non_horizontal(mut self, remove: bool) -> Self {
        self.remove_non_horizontal = remove;
        self
    }

    /// Emit a marker whenever the rounded font size changes.
    pub fn with_font_size_tracking(mut self, format: impl Into<String>) -> Self {
        self.font_size_format = Some(format.into());
        self
    }

    /// Page separator template.
    pub fn with_page_break_format(mut self, format: impl Into<String>) -> Self {
        self.page_break_format = format.into();
        self
    }

    /// Reduce font-size markup in [`finish`](Self::finish).
    pub fn with_simplified_font_sizes(mut self, enabled: bool) -> Self {
        self.simplify_sizes = enabled;
        self
    }

    /// Start a new page: write the separator and forget the font size.
    pub fn begin_page(&mut self, page_no: usize) {
        let separator = self.page_break_format.replace("{}", &page_no.to_string());
        self.output.push_str(&separator);
        self.reset_page();
    }

    /// Forget the current font size so the next sized run emits a marker.
    pub fn reset_page(&mut self) {
        self.current_font_size = None;
    }

    /// End of a text block.
    pub fn end_block(&mut self) {
        self.output.push('\n');
    }

    /// Convert a run and append it to the output.
    pub fn push_run(&mut self, run: &TextRun, stats: &mut ConversionStats) {
        if let Some(text) = self.convert_run(run, stats) {
            self.output.push_str(&text);
        }
    }

    /// Convert a run; `None` when the run is dropped.
    ///
    /// The result includes the font-size marker when one is due.
    pub fn convert_run(&mut self, run: &TextRun, stats: &mut ConversionStats) -> Option<String> {
        let Some(font_name) = run.font_name.as_deref() else {
            return Some(run.text.clone());
        };

        if self.remove_non_horizontal && run.rotated {
            stats.record_non_horizontal();
            return None;
        }

        let font = self.resolve_font(font_name, run.style);
        let converted = self
            .converter
            .convert_styled(&run.text, strip_subset_tag(&font), run.style, stats)
            .unwrap_or_else(|| run.text.clone());

        let mut out = String::with_capacity(converted.len());
        if let (Some(format), Some(size)) = (&self.font_size_format, run.font_size) {
            let rounded = size.round_ties_even() as i64;
            if self.current_font_size != Some(rounded) {
                self.current_font_size = Some(rounded);
                out.push_str(&format.replace("{}", &rounded.to_string()));
            }
        }
        out.push_str(&converted);
        Some(out)
    }

    /// Font name after identification override.
    ///
    /// The full name is looked up first, then the part after the subset tag.
    /// Among several candidates the first one the tables handle wins,
    /// otherwise the first one.
    fn resolve_font(&self, font_name: &str, style: FontStyle) -> String {
        let Some(candidates) = self
            .identification
            .and_then(|ident| ident.lookup_override(font_name))
        else {
            return font_name.to_string();
        };

        candidates
            .iter()
            .find(|candidate| self.converter.handles_font(candidate, style))
            .or_else(|| candidates.iter().next())
            .cloned()
            .unwrap_or_else(|| font_name.to_string())
    }

    /// Text produced so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Final text: blank lines collapsed and, if enabled, font-size markup
    /// simplified.
    pub fn finish(self) -> String {
        let text = collapse_blank_lines(&self.output);
        if self.simplify_sizes && self.font_size_format.is_some() {
            simplify_font_sizes(&text)
        } else {
            text
        }
    }
}
