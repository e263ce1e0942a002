//! Configuration for text recovery.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::convert::{DEFAULT_FONT_SIZE_FORMAT, ERROR_SENTINEL, TablePrecedence};
use crate::error::{Error, Result};
use crate::fonts::DEFAULT_PRECISION;
use crate::layout::LineGroupingParams;

/// Largest accepted number of decimals for glyph hashing.
const MAX_HASH_PRECISION: usize = 12;

/// Recovery configuration.
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes:
///
/// ```
/// use deduff::RecoveryConfig;
///
/// let config = RecoveryConfig::from_json_str(r#"{ "primary_table": "tables/primary.csv" }"#).unwrap();
/// assert_eq!(config.hash_precision, 6);
/// assert!(config.remove_non_horizontal);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Primary character table.
    pub primary_table: PathBuf,

    /// Secondary character table.
    pub secondary_table: Option<PathBuf>,

    /// Glyph database for font identification and shape recovery.
    pub glyph_db: Option<PathBuf>,

    /// Table that wins disagreements.
    pub precedence: TablePrecedence,

    /// Table value marking a character as unconvertible.
    pub sentinel: String,

    /// Decimals used by the glyph hasher.
    pub hash_precision: usize,

    /// Try FontForge on unreadable font programs.
    pub enable_repair: bool,

    /// Log and report ambiguous font identifications.
    pub ambiguity_diagnostics: bool,

    /// Drop rotated runs.
    pub remove_non_horizontal: bool,

    /// Emit font-size markers during run conversion.
    pub track_font_size: bool,

    /// Font-size marker template.
    pub font_size_format: String,

    /// Simplify font-size markup in the final text.
    pub simplify_font_sizes: bool,

    /// Line grouping parameters.
    pub line_grouping: LineGroupingParams,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            primary_table: PathBuf::new(),
            secondary_table: None,
            glyph_db: None,
            precedence: TablePrecedence::Primary,
            sentinel: ERROR_SENTINEL.to_string(),
            hash_precision: DEFAULT_PRECISION,
            enable_repair: false,
            ambiguity_diagnostics: false,
            remove_non_horizontal: true,
            track_font_size: false,
            font_size_format: DEFAULT_FONT_SIZE_FORMAT.to_string(),
            simplify_font_sizes: false,
            line_grouping: LineGroupingParams::default(),
        }
    }

    /// Set the primary table path.
    pub fn with_primary_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.primary_table = path.into();
        self
    }

    /// Set the secondary table path.
    pub fn with_secondary_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary_table = Some(path.into());
        self
    }

    /// Set the glyph database path.
    pub fn with_glyph_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.glyph_db = Some(path.into());
        self
    }

    /// Set table precedence.
    pub fn with_precedence(mut self, precedence: TablePrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Set the unconvertible sentinel.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Set hash precision.
    pub fn with_hash_precision(mut self, precision: usize) -> Self {
        self.hash_precision = precision;
        self
    }

    /// Enable FontForge repair.
    pub fn with_repair(mut self, enable: bool) -> Self {
        self.enable_repair = enable;
        self
    }

    /// Enable ambiguity diagnostics.
    pub fn with_ambiguity_diagnostics(mut self, enable: bool) -> Self {
        self.ambiguity_diagnostics = enable;
        self
    }

    /// Drop or keep rotated runs.
    pub fn with_remove_non_horizontal(mut self, enable: bool) -> Self {
        self.remove_non_horizontal = enable;
        self
    }

    /// Enable font-size markers.
    pub fn with_font_size_tracking(mut self, enable: bool) -> Self {
        self.track_font_size = enable;
        self
    }

    /// Enable font-size markup simplification.
    pub fn with_simplified_font_sizes(mut self, enable: bool) -> Self {
        self.simplify_font_sizes = enable;
        self
    }

    /// Set line grouping parameters.
    pub fn with_line_grouping(mut self, params: LineGroupingParams) -> Self {
        self.line_grouping = params;
        self
    }

    /// Check the configuration for values no component accepts.
    pub fn validate(&self) -> Result<()> {
        if self.primary_table.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("primary_table is not set".to_string()));
        }
        if self.sentinel.is_empty() {
            return Err(Error::InvalidConfig("sentinel must not be empty".to_string()));
        }
        if self.hash_precision == 0 || self.hash_precision > MAX_HASH_PRECISION {
            return Err(Error::InvalidConfig(format!(
                "hash_precision must be between 1 and {}, got {}",
                MAX_HASH_PRECISION, self.hash_precision
            )));
        }
        if self.track_font_size && !self.font_size_format.contains("{}") {
            return Err(Error::InvalidConfig(
                "font_size_format must contain '{}'".to_string(),
            ));
        }
        self.line_grouping.validate()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    ///
    /// Relative table and database paths are resolved against the file's
    /// directory.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_json_str(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.primary_table);
        if let Some(p) = self.secondary_table.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.glyph_db.as_mut() {
            resolve(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecoveryConfig::default();
        assert_eq!(config.precedence, TablePrecedence::Primary);
        assert_eq!(config.sentinel, ERROR_SENTINEL);
        assert_eq!(config.hash_precision, DEFAULT_PRECISION);
        assert!(config.remove_non_horizontal);
        assert!(!config.track_font_size);
    }

    #[test]
    fn test_builder_pattern() {
        let config = RecoveryConfig::new()
            .with_primary_table("a.csv")
            .with_secondary_table("b.csv")
            .with_precedence(TablePrecedence::Secondary)
            .with_hash_precision(4);
        assert_eq!(config.primary_table, PathBuf::from("a.csv"));
        assert_eq!(config.secondary_table, Some(PathBuf::from("b.csv")));
        assert_eq!(config.precedence, TablePrecedence::Secondary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(RecoveryConfig::new().validate().is_err());
        let base = RecoveryConfig::new().with_primary_table("a.csv");
        assert!(base.clone().with_sentinel("").validate().is_err());
        assert!(base.clone().with_hash_precision(0).validate().is_err());
        assert!(base.clone().with_hash_precision(40).validate().is_err());
    }

    #[test]
    fn test_json_precedence_lowercase() {
        let config =
            RecoveryConfig::from_json_str(r#"{"primary_table": "p.csv", "precedence": "secondary"}"#)
                .unwrap();
        assert_eq!(config.precedence, TablePrecedence::Secondary);
    }

    #[test]
    fn test_json_invalid() {
        assert!(matches!(
            RecoveryConfig::from_json_str("{ not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            RecoveryConfig::from_json_str("{}"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
