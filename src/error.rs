//! Error types for the recovery library.
//!
//! Only hard failures live here. Conditions that the conversion pipeline
//! absorbs (unknown fonts, unknown characters, table disagreements) are
//! recorded in [`ConversionStats`](crate::convert::ConversionStats) instead.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while identifying fonts or loading tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The font stores its outlines in a representation the glyph hasher
    /// cannot fingerprint (CFF/CFF2 cubic outlines, bitmap-only fonts).
    #[error("Unsupported glyph format: {0}")]
    UnsupportedGlyphFormat(String),

    /// Font program could not be parsed
    #[error("Failed to parse font program: {0}")]
    FontParse(String),

    /// Font program is empty
    #[error("Font program is empty")]
    EmptyFont,

    /// Malformed row in a character table or glyph database
    #[error("Malformed row at line {line}: {reason}")]
    RowFormat {
        /// 1-based line number
        line: usize,
        /// Reason for the failure
        reason: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
