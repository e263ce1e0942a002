//! Font identification by glyph shape.
//!
//! A font is identified by its declared PostScript name when the index knows
//! it; otherwise by the reference fonts whose glyph hash sets contain every
//! glyph of the embedded subset. Several fonts can pass that test (shared
//! glyphs across a family), in which case all of them are returned.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::fonts::{
    ExtractedFont, FontIdentity, FontRepair, GlyphHash, GlyphHasher, NoRepair,
    extract_glyph_records, split_subset_tag,
};
use crate::identify::hash_index::{CandidateSet, DetailedGlyphIndex, FontHashIndex, GlyphDetail};
use crate::identify::resources::{EmbeddedProgram, PageFonts, ProgramId};

/// Evidence samples per candidate for a single program.
const PROGRAM_SAMPLES: usize = 20;
/// Evidence samples per candidate for names merged from several programs.
const AGGREGATED_SAMPLES: usize = 10;

/// Diagnostic for a font that matched several reference fonts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguityReport {
    /// Resource or base name the ambiguity was found under
    pub font_label: String,
    /// Matching reference fonts
    pub candidates: CandidateSet,
    /// Sample glyphs supporting each candidate
    pub evidence: BTreeMap<FontIdentity, Vec<GlyphDetail>>,
    /// `true` when the candidates were merged from several programs
    pub aggregated: bool,
}

/// Identification result for a whole document.
#[derive(Debug, Clone, Default)]
pub struct DocumentIdentification {
    /// Resource names and base names -> candidate fonts
    pub names: BTreeMap<String, CandidateSet>,
    /// Ambiguities found (only in diagnostic mode)
    pub ambiguities: Vec<AmbiguityReport>,
}

impl DocumentIdentification {
    /// Candidates recorded under exactly `name`.
    pub fn candidates(&self, name: &str) -> Option<&CandidateSet> {
        self.names.get(name)
    }

    /// Candidates for a run's font name: the full name first, then the part
    /// after the subset tag.
    pub fn lookup_override(&self, font_name: &str) -> Option<&CandidateSet> {
        if let Some(found) = self.names.get(font_name) {
            return Some(found);
        }
        match split_subset_tag(font_name) {
            (Some(_), base) => self.names.get(base),
            (None, _) => None,
        }
    }

    /// `true` when nothing was identified.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Identifies fonts against a [`FontHashIndex`].
pub struct FontIdentifier<'a> {
    index: &'a FontHashIndex,
    detailed: Option<&'a DetailedGlyphIndex>,
    hasher: GlyphHasher,
    repair: Box<dyn FontRepair + 'a>,
    diagnostics: bool,
}

impl<'a> FontIdentifier<'a> {
    /// Identifier over `index` with the default hasher and no repair.
    pub fn new(index: &'a FontHashIndex) -> Self {
        Self {
            index,
            detailed: None,
            hasher: GlyphHasher::new(),
            repair: Box::new(NoRepair),
            diagnostics: false,
        }
    }

    /// Detailed index used for ambiguity evidence.
    pub fn with_detailed_index(mut self, detailed: &'a DetailedGlyphIndex) -> Self {
        self.detailed = Some(detailed);
        self
    }

    /// Hasher; must match the one the index was built with.
    pub fn with_hasher(mut self, hasher: GlyphHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Repair hook for unreadable programs.
    pub fn with_repair(mut self, repair: impl FontRepair + 'a) -> Self {
        self.repair = Box::new(repair);
        self
    }

    /// Log and report ambiguities.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Identify one font program.
    pub fn identify(&self, data: &[u8]) -> Result<CandidateSet> {
        let font = extract_glyph_records(data, &self.hasher, self.repair.as_ref())?;
        Ok(self.identify_font(&font))
    }

    /// Identify already extracted glyph records.
    pub fn identify_font(&self, font: &ExtractedFont) -> CandidateSet {
        if let Some(name) = font.declared_name.as_deref() {
            if self.index.contains_font(name) {
                log::debug!("Font '{}' identified by declared name", name);
                return CandidateSet::from([name.to_string()]);
            }
        }
        self.index.candidates_for(&font.hash_set())
    }

    /// Identify every font resource of a document.
    ///
    /// Programs shared by several resources are hashed once. Failures of a
    /// single program are logged and leave its names unmapped.
    pub fn identify_document(&self, pages: &[PageFonts]) -> DocumentIdentification {
        let mut result = DocumentIdentification::default();
        let mut by_program: HashMap<ProgramId, Option<CandidateSet>> = HashMap::new();
        let mut sources: HashMap<String, BTreeSet<Option<ProgramId>>> = HashMap::new();

        for (page_no, page) in pages.iter().enumerate() {
            for resource in &page.resources {
                let base = resource.base_name();

                if let Some(fast) = base.and_then(|b| self.fast_path(b)) {
                    log::trace!("Page {}: '{}' resolved by name", page_no, resource.resource_name);
                    record(&mut result, &mut sources, &resource.resource_name, base, None, &fast);
                    continue;
                }

                let Some(program) = &resource.program else {
                    log::debug!(
                        "Page {}: font '{}' has no embedded program",
                        page_no,
                        resource.resource_name
                    );
                    continue;
                };

                let label = base.unwrap_or(&resource.resource_name);
                let candidates = match by_program.get(&program.id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let found = self.identify_program(program, label, &mut result.ambiguities);
                        by_program.insert(program.id, found.clone());
                        found
                    },
                };

                match candidates {
                    Some(candidates) if !candidates.is_empty() => record(
                        &mut result,
                        &mut sources,
                        &resource.resource_name,
                        base,
                        Some(program.id),
                        &candidates,
                    ),
                    _ => log::debug!("Font '{}' not identified", label),
                }
            }
        }

        if self.diagnostics {
            self.report_aggregated(&result.names, &sources, &mut result.ambiguities);
        }

        log::info!(
            "Identified {} font names from {} programs",
            result.names.len(),
            by_program.len()
        );
        result
    }

    fn fast_path(&self, base_name: &str) -> Option<CandidateSet> {
        match split_subset_tag(base_name) {
            (Some(_), name) if self.index.contains_font(name) => {
                Some(CandidateSet::from([name.to_string()]))
            },
            _ => None,
        }
    }

    fn identify_program(
        &self,
        program: &EmbeddedProgram,
        label: &str,
        ambiguities: &mut Vec<AmbiguityReport>,
    ) -> Option<CandidateSet> {
        let font = match extract_glyph_records(&program.data, &self.hasher, self.repair.as_ref()) {
            Ok(font) => font,
            Err(e) => {
                log::warn!("Cannot identify font '{}': {}", label, e);
                return None;
            },
        };

        let candidates = self.identify_font(&font);
        if candidates.len() > 1 && self.diagnostics {
            let hashes = font.hash_set();
            let report = AmbiguityReport {
                font_label: label.to_string(),
                evidence: self.matching_evidence(&candidates, &hashes),
                candidates: candidates.clone(),
                aggregated: false,
            };
            log::warn!(
                "Font '{}' is ambiguous between {:?}",
                label,
                report.candidates
            );
            ambiguities.push(report);
        }
        Some(candidates)
    }

    /// Up to [`PROGRAM_SAMPLES`] glyphs per candidate that share a hash with
    /// the embedded program.
    fn matching_evidence(
        &self,
        candidates: &CandidateSet,
        hashes: &HashSet<GlyphHash>,
    ) -> BTreeMap<FontIdentity, Vec<GlyphDetail>> {
        let Some(detailed) = self.detailed else {
            return BTreeMap::new();
        };
        let mut sorted: Vec<&GlyphHash> = hashes.iter().collect();
        sorted.sort();

        candidates
            .iter()
            .map(|candidate| {
                let samples = sorted
                    .iter()
                    .filter_map(|hash| detailed.details(candidate, hash))
                    .flatten()
                    .take(PROGRAM_SAMPLES)
                    .cloned()
                    .collect();
                (candidate.clone(), samples)
            })
            .collect()
    }

    fn report_aggregated(
        &self,
        names: &BTreeMap<String, CandidateSet>,
        sources: &HashMap<String, BTreeSet<Option<ProgramId>>>,
        ambiguities: &mut Vec<AmbiguityReport>,
    ) {
        for (name, candidates) in names {
            let merged = sources.get(name).is_some_and(|s| s.len() > 1);
            if !merged || candidates.len() < 2 {
                continue;
            }
            let evidence = candidates
                .iter()
                .map(|candidate| (candidate.clone(), self.sample_glyphs(candidate)))
                .collect();
            log::warn!(
                "Font name '{}' maps to several fonts across programs: {:?}",
                name,
                candidates
            );
            ambiguities.push(AmbiguityReport {
                font_label: name.clone(),
                candidates: candidates.clone(),
                evidence,
                aggregated: true,
            });
        }
    }

    fn sample_glyphs(&self, font: &str) -> Vec<GlyphDetail> {
        let Some(glyphs) = self.detailed.and_then(|d| d.font_glyphs(font)) else {
            return Vec::new();
        };
        let mut all: Vec<&GlyphDetail> = glyphs.values().flatten().collect();
        all.sort();
        all.into_iter().take(AGGREGATED_SAMPLES).cloned().collect()
    }
}

/// Store candidates under the resource name and the base name. Names seen
/// with different programs accumulate candidates.
fn record(
    result: &mut DocumentIdentification,
    sources: &mut HashMap<String, BTreeSet<Option<ProgramId>>>,
    resource_name: &str,
    base_name: Option<&str>,
    program: Option<ProgramId>,
    candidates: &CandidateSet,
) {
    for name in std::iter::once(resource_name).chain(base_name) {
        result
            .names
            .entry(name.to_string())
            .or_default()
            .extend(candidates.iter().cloned());
        sources.entry(name.to_string()).or_default().insert(program);
    }
}
