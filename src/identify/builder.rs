//! Index construction from reference font programs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fonts::{
    FontIdentity, FontRepair, GlyphHasher, NoRepair, extract_glyph_records,
};
use crate::identify::hash_index::{DetailedGlyphIndex, FontHashIndex};

/// Outcome of an index build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Fonts added, with their glyph counts
    pub ingested: Vec<(FontIdentity, usize)>,
    /// Inputs that could not be used, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Builds a [`FontHashIndex`] and a [`DetailedGlyphIndex`] together.
///
/// A font whose declared name was already ingested replaces the coarse
/// entry and the detailed glyphs of the earlier one.
pub struct IndexBuilder {
    hasher: GlyphHasher,
    repair: Box<dyn FontRepair>,
    coarse: FontHashIndex,
    detailed: DetailedGlyphIndex,
    report: BuildReport,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    /// Builder with the default hasher and no repair.
    pub fn new() -> Self {
        Self {
            hasher: GlyphHasher::new(),
            repair: Box::new(NoRepair),
            coarse: FontHashIndex::new(),
            detailed: DetailedGlyphIndex::new(),
            report: BuildReport::default(),
        }
    }

    /// Use a specific hasher.
    pub fn with_hasher(mut self, hasher: GlyphHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Use a repair hook for unreadable programs.
    pub fn with_repair(mut self, repair: impl FontRepair + 'static) -> Self {
        self.repair = Box::new(repair);
        self
    }

    /// Add one font program.
    ///
    /// `label` names the font when the program declares no PostScript name
    /// (usually the file stem). Failures are recorded in the report and
    /// returned; the builder stays usable.
    pub fn add_font(&mut self, label: &str, data: &[u8]) -> Result<FontIdentity> {
        let font = match extract_glyph_records(data, &self.hasher, self.repair.as_ref()) {
            Ok(font) => font,
            Err(e) => {
                log::warn!("Skipping font '{}': {}", label, e);
                self.report.skipped.push((label.to_string(), e.to_string()));
                return Err(e);
            },
        };

        let name = font.name_or(label);
        if self.coarse.insert_font(name.clone(), font.hash_set()).is_some() {
            log::debug!("Font '{}' ({}) replaces an earlier entry", name, label);
        }
        self.detailed.replace_font(&name, &font.records);

        log::info!("Indexed font '{}' with {} glyphs", name, font.records.len());
        self.report.ingested.push((name.clone(), font.records.len()));
        Ok(name)
    }

    /// Add a font file, labelled by its file stem.
    pub fn add_file(&mut self, path: &Path) -> Result<FontIdentity> {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match fs::read(path) {
            Ok(data) => self.add_font(&label, &data),
            Err(e) => {
                log::warn!("Cannot read '{}': {}", path.display(), e);
                self.report
                    .skipped
                    .push((path.display().to_string(), e.to_string()));
                Err(e.into())
            },
        }
    }

    /// Add every font file below `dir` whose extension is in `extensions`
    /// (case-insensitive). Files are visited in sorted path order.
    ///
    /// Only an unreadable `dir` itself is an error. Subdirectories and
    /// entries that cannot be read are logged, recorded as skipped and
    /// passed over.
    pub fn add_directory(&mut self, dir: &Path, extensions: &[&str]) -> Result<usize> {
        let entries = fs::read_dir(dir)?;
        let mut files = Vec::new();
        self.collect_files(entries, extensions, &mut files);
        files.sort();

        let mut added = 0;
        for file in &files {
            if self.add_file(file).is_ok() {
                added += 1;
            }
        }
        Ok(added)
    }

    fn collect_files(
        &mut self,
        entries: fs::ReadDir,
        extensions: &[&str],
        out: &mut Vec<PathBuf>,
    ) {
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    self.skip_unreadable("directory entry", e);
                    continue;
                },
            };
            if path.is_dir() {
                match fs::read_dir(&path) {
                    Ok(sub) => self.collect_files(sub, extensions, out),
                    Err(e) => self.skip_unreadable(&path.display().to_string(), e),
                }
                continue;
            }
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
            if matches {
                out.push(path);
            }
        }
    }

    fn skip_unreadable(&mut self, what: &str, e: std::io::Error) {
        log::warn!("Cannot read '{}': {}", what, e);
        self.report.skipped.push((what.to_string(), e.to_string()));
    }

    /// Current coarse index.
    pub fn index(&self) -> &FontHashIndex {
        &self.coarse
    }

    /// Finish, returning both indexes and the report.
    pub fn finish(self) -> (FontHashIndex, DetailedGlyphIndex, BuildReport) {
        log::info!(
            "Index build finished: {} fonts, {} skipped",
            self.coarse.len(),
            self.report.skipped.len()
        );
        (self.coarse, self.detailed, self.report)
    }
}

impl FontHashIndex {
    /// Build an index from font files; unusable files are skipped.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> (Self, BuildReport) {
        let mut builder = IndexBuilder::new();
        for path in paths {
            let _ = builder.add_file(path.as_ref());
        }
        let (coarse, _, report) = builder.finish();
        (coarse, report)
    }
}
