//! Font name handling.
//!
//! Embedded fonts are usually subsets whose base name carries a tag prefix
//! (`ABCDEF+Dedris-a`). Character tables are keyed by a canonical name that
//! differs from the embedded one for several legacy families, and bold or
//! italic variants live under suffixed keys (`Ededris-a-b`).

use bitflags::bitflags;
use phf::phf_map;

bitflags! {
    /// Weight and slant of a text run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontStyle: u8 {
        /// Bold weight
        const BOLD = 0b01;
        /// Italic or oblique slant
        const ITALIC = 0b10;
    }
}

impl FontStyle {
    /// Suffix of the table key for this style variant.
    pub fn table_suffix(self) -> Option<&'static str> {
        match (self.contains(Self::BOLD), self.contains(Self::ITALIC)) {
            (true, true) => Some("-bi"),
            (true, false) => Some("-b"),
            (false, true) => Some("-i"),
            (false, false) => None,
        }
    }
}

/// Embedded names that are published under a different table name.
static FONT_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "Dedris-syma" => "Ededris-sym",
    "Ededris-syma" => "Ededris-sym",
    "TibetanClassicSkt" => "TibetanClassicSkt1",
    "TibetanChogyalSkt" => "TibetanChogyalSkt1",
};

/// Canonical table key for `name` in the given style.
///
/// Rules apply in order:
/// 1. explicit aliases;
/// 2. the `Dedris` family is published as `Ededris`;
/// 3. four-character `Sam?` names are published as `Es` + the rest (`Sama` -> `Esama`);
/// 4. anything from the first `,` on is dropped, as is trailing whitespace;
/// 5. bold and italic variants get `-b`, `-i` or `-bi`.
///
/// Each rule sees the output of the previous one, so an alias may land in
/// the `Dedris` or `Sam?` family and get rewritten again. The function is
/// total: unknown names pass through rules 1-3 unchanged.
pub fn normalize_font_name(name: &str, style: FontStyle) -> String {
    normalize_with_aliases(name, style, &FONT_ALIASES)
}

fn normalize_with_aliases(
    name: &str,
    style: FontStyle,
    aliases: &phf::Map<&'static str, &'static str>,
) -> String {
    let mut normalized = aliases
        .get(name)
        .map_or_else(|| name.to_string(), |alias| alias.to_string());
    if normalized.starts_with("Dedris") {
        normalized = format!("Ed{}", &normalized[1..]);
    }
    if normalized.starts_with("Sam") && normalized.chars().count() == 4 {
        normalized = format!("Es{}", &normalized[1..]);
    }

    if let Some(pos) = normalized.find(',') {
        normalized.truncate(pos);
    }
    normalized.truncate(normalized.trim_end().len());

    if let Some(suffix) = style.table_suffix() {
        normalized.push_str(suffix);
    }
    normalized
}

/// Split a subset-tagged name into `(tag, base)`.
///
/// The tag is whatever precedes the first `+`. Names without `+`, or with an
/// empty tag, yield `(None, name)`.
pub fn split_subset_tag(name: &str) -> (Option<&str>, &str) {
    match name.split_once('+') {
        Some((tag, base)) if !tag.is_empty() => (Some(tag), base),
        _ => (None, name),
    }
}

/// Name without its subset tag.
pub fn strip_subset_tag(name: &str) -> &str {
    split_subset_tag(name).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_lookup() {
        assert_eq!(normalize_font_name("Dedris-syma", FontStyle::empty()), "Ededris-sym");
        assert_eq!(normalize_font_name("Ededris-syma", FontStyle::empty()), "Ededris-sym");
        assert_eq!(
            normalize_font_name("TibetanClassicSkt", FontStyle::empty()),
            "TibetanClassicSkt1"
        );
        assert_eq!(
            normalize_font_name("TibetanChogyalSkt", FontStyle::empty()),
            "TibetanChogyalSkt1"
        );
    }

    #[test]
    fn test_dedris_prefix() {
        assert_eq!(normalize_font_name("Dedris-a", FontStyle::empty()), "Ededris-a");
        assert_eq!(normalize_font_name("Dedris-vowa", FontStyle::empty()), "Ededris-vowa");
    }

    #[test]
    fn test_sam_family() {
        assert_eq!(normalize_font_name("Sama", FontStyle::empty()), "Esama");
        assert_eq!(normalize_font_name("Samb", FontStyle::empty()), "Esamb");
        // only four-character names
        assert_eq!(normalize_font_name("Samyak", FontStyle::empty()), "Samyak");
    }

    #[test]
    fn test_strip_after_comma() {
        assert_eq!(normalize_font_name("TibetanMachine,Bold", FontStyle::empty()), "TibetanMachine");
        assert_eq!(normalize_font_name("Font X , Italic", FontStyle::empty()), "Font X");
    }

    #[test]
    fn test_style_suffix() {
        assert_eq!(normalize_font_name("Dedris-a", FontStyle::BOLD), "Ededris-a-b");
        assert_eq!(normalize_font_name("Dedris-a", FontStyle::ITALIC), "Ededris-a-i");
        assert_eq!(
            normalize_font_name("Dedris-a", FontStyle::BOLD | FontStyle::ITALIC),
            "Ededris-a-bi"
        );
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(normalize_font_name("Helvetica", FontStyle::empty()), "Helvetica");
        assert_eq!(normalize_font_name("", FontStyle::empty()), "");
    }

    static CHAINED_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
        "Chos-a" => "Dedris-c",
        "OldSam" => "Samc",
        "Legacy" => "Dedris-d, Bold",
    };

    #[test]
    fn test_rules_chain_after_alias() {
        let chained = |name| normalize_with_aliases(name, FontStyle::empty(), &CHAINED_ALIASES);
        assert_eq!(chained("Chos-a"), "Ededris-c");
        assert_eq!(chained("OldSam"), "Esamc");
        assert_eq!(chained("Legacy"), "Ededris-d");
        assert_eq!(
            normalize_with_aliases("Chos-a", FontStyle::BOLD, &CHAINED_ALIASES),
            "Ededris-c-b"
        );
    }

    #[test]
    fn test_split_subset_tag() {
        assert_eq!(split_subset_tag("ABCDEF+Dedris-a"), (Some("ABCDEF"), "Dedris-a"));
        assert_eq!(split_subset_tag("Dedris-a"), (None, "Dedris-a"));
        assert_eq!(split_subset_tag("+Odd"), (None, "+Odd"));
        assert_eq!(strip_subset_tag("XYZABC+Sama"), "Sama");
    }
}
