//! Loaded tables and indexes shared by every conversion.

use crate::config::RecoveryConfig;
use crate::convert::{CharacterConverter, GlyphShapeLookup, RunConverter, TableStore};
use crate::error::Result;
use crate::fonts::{FontForgeRepair, GlyphHasher};
use crate::geometry::Rect;
use crate::identify::{DetailedGlyphIndex, DocumentIdentification, FontHashIndex, FontIdentifier};
use crate::layout::group_into_lines;

/// Everything loaded once from a [`RecoveryConfig`].
///
/// Read-only after construction; share it by reference across passes and
/// threads. Per-pass state lives in [`ConversionStats`](crate::convert::ConversionStats).
#[derive(Debug)]
pub struct RecoveryContext {
    config: RecoveryConfig,
    tables: TableStore,
    index: Option<FontHashIndex>,
    detailed: Option<DetailedGlyphIndex>,
    glyph_lookup: Option<GlyphShapeLookup>,
}

impl RecoveryContext {
    /// Validate `config` and load the tables and the optional glyph
    /// database.
    pub fn load(config: &RecoveryConfig) -> Result<Self> {
        config.validate()?;
        let tables = TableStore::load(&config.primary_table, config.secondary_table.as_deref())?;
        let mut context = Self::from_parts(config.clone(), tables);

        if let Some(path) = &config.glyph_db {
            context = context.with_glyph_index(DetailedGlyphIndex::load(path)?);
        }

        log::info!(
            "Recovery context ready: {} primary fonts, {} secondary fonts, {} indexed fonts",
            context.tables.primary().font_count(),
            context.tables.secondary().font_count(),
            context.index.as_ref().map_or(0, FontHashIndex::len)
        );
        Ok(context)
    }

    /// Context over already loaded tables, without glyph database.
    pub fn from_parts(config: RecoveryConfig, tables: TableStore) -> Self {
        Self {
            config,
            tables,
            index: None,
            detailed: None,
            glyph_lookup: None,
        }
    }

    /// Attach a glyph database; the coarse index and the shape lookup are
    /// derived from it.
    pub fn with_glyph_index(mut self, detailed: DetailedGlyphIndex) -> Self {
        self.index = Some(FontHashIndex::from(&detailed));
        self.glyph_lookup = Some(GlyphShapeLookup::from_detailed_index(&detailed));
        self.detailed = Some(detailed);
        self
    }

    /// Configuration the context was built from.
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Conversion tables.
    pub fn tables(&self) -> &TableStore {
        &self.tables
    }

    /// Coarse font index, if a glyph database was loaded.
    pub fn index(&self) -> Option<&FontHashIndex> {
        self.index.as_ref()
    }

    /// Detailed glyph index, if a glyph database was loaded.
    pub fn detailed_index(&self) -> Option<&DetailedGlyphIndex> {
        self.detailed.as_ref()
    }

    /// Hasher matching the configured precision.
    pub fn hasher(&self) -> GlyphHasher {
        GlyphHasher::with_precision(self.config.hash_precision)
    }

    /// Character converter configured from the context.
    pub fn converter(&self) -> CharacterConverter<'_> {
        let converter = CharacterConverter::new(&self.tables)
            .with_precedence(self.config.precedence)
            .with_sentinel(self.config.sentinel.clone());
        match &self.glyph_lookup {
            Some(lookup) => converter.with_glyph_lookup(lookup),
            None => converter,
        }
    }

    /// Font identifier, or `None` without a glyph database.
    pub fn identifier(&self) -> Option<FontIdentifier<'_>> {
        let index = self.index.as_ref()?;
        let mut identifier = FontIdentifier::new(index)
            .with_hasher(self.hasher())
            .with_diagnostics(self.config.ambiguity_diagnostics);
        if let Some(detailed) = &self.detailed {
            identifier = identifier.with_detailed_index(detailed);
        }
        if self.config.enable_repair {
            match FontForgeRepair::detect() {
                Some(repair) => identifier = identifier.with_repair(repair),
                None => log::warn!("Font repair enabled but fontforge is not on PATH"),
            }
        }
        Some(identifier)
    }

    /// Run converter configured from the context.
    pub fn run_converter<'a>(
        &'a self,
        identification: Option<&'a DocumentIdentification>,
    ) -> RunConverter<'a> {
        let mut runs = RunConverter::new(self.converter())
            .with_remove_non_horizontal(self.config.remove_non_horizontal)
            .with_simplified_font_sizes(self.config.simplify_font_sizes);
        if self.config.track_font_size {
            runs = runs.with_font_size_tracking(self.config.font_size_format.clone());
        }
        if let Some(identification) = identification {
            runs = runs.with_identification(identification);
        }
        runs
    }

    /// Group positioned runs into lines with the configured parameters.
    pub fn group_lines(&self, boxes: &[Rect]) -> Vec<Vec<usize>> {
        group_into_lines(boxes, &self.config.line_grouping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{CharTable, ConversionStats};
    use crate::fonts::GlyphHash;
    use crate::identify::GlyphDetail;

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecoveryContext>();
    }

    #[test]
    fn test_converter_from_context() {
        let mut primary = CharTable::new();
        primary.insert("Ededris-a", 'k', "ཀ");
        let context = RecoveryContext::from_parts(
            RecoveryConfig::new().with_primary_table("unused.csv"),
            TableStore::new(primary, CharTable::new()),
        );
        let mut stats = ConversionStats::new();
        let out = context.converter().convert("k", "Dedris-a", &mut stats);
        assert_eq!(out, Some("ཀ".to_string()));
        assert!(context.identifier().is_none());
    }

    #[test]
    fn test_glyph_index_enables_identifier() {
        let mut detailed = DetailedGlyphIndex::new();
        detailed.add_detail(
            "Dedris-a",
            GlyphDetail {
                glyph_name: "ka".to_string(),
                glyph_hash: GlyphHash::from_hex("h1"),
                codepoint: Some(107),
            },
        );
        let context = RecoveryContext::from_parts(RecoveryConfig::new(), TableStore::default())
            .with_glyph_index(detailed);
        assert!(context.identifier().is_some());
        assert_eq!(context.index().map(FontHashIndex::len), Some(1));
    }

    #[test]
    fn test_group_lines_uses_configured_margins() {
        let boxes = [
            Rect::new(0.0, 0.0, 8.0, 10.0),
            Rect::new(9.0, 0.0, 8.0, 10.0),
            Rect::new(40.0, 0.0, 8.0, 10.0),
        ];
        let tight = RecoveryContext::from_parts(RecoveryConfig::new(), TableStore::default());
        assert_eq!(tight.group_lines(&boxes), vec![vec![0, 1], vec![2]]);

        let loose_config = RecoveryConfig::new()
            .with_line_grouping(crate::layout::LineGroupingParams::new(4.0, 0.5));
        let loose = RecoveryContext::from_parts(loose_config, TableStore::default());
        assert_eq!(loose.group_lines(&boxes), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_load_missing_table_fails() {
        let config = RecoveryConfig::new().with_primary_table("/nonexistent/deduff/primary.csv");
        assert!(RecoveryContext::load(&config).is_err());
    }
}
