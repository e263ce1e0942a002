//! Font resources as supplied by the document engine.

/// Identifier of an embedded program inside its document (object number and
/// generation), used to hash shared programs only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId {
    /// Object number
    pub object: u32,
    /// Generation number
    pub generation: u16,
}

impl ProgramId {
    /// Create a program id.
    pub fn new(object: u32, generation: u16) -> Self {
        Self { object, generation }
    }
}

/// Embedded font program bytes.
#[derive(Debug, Clone)]
pub struct EmbeddedProgram {
    /// Document-wide identity of the program
    pub id: ProgramId,
    /// Decoded program bytes
    pub data: Vec<u8>,
}

/// One font resource of a page.
#[derive(Debug, Clone)]
pub struct FontResource {
    /// Resource key in the page's font dictionary (e.g. `F1`)
    pub resource_name: String,
    /// Base font name, possibly subset-tagged, with or without a leading `/`
    pub base_font: Option<String>,
    /// Embedded program, when the document carries one
    pub program: Option<EmbeddedProgram>,
}

impl FontResource {
    /// Resource without embedded program.
    pub fn new(resource_name: impl Into<String>, base_font: Option<&str>) -> Self {
        Self {
            resource_name: resource_name.into(),
            base_font: base_font.map(str::to_string),
            program: None,
        }
    }

    /// Attach an embedded program.
    pub fn with_program(mut self, id: ProgramId, data: Vec<u8>) -> Self {
        self.program = Some(EmbeddedProgram { id, data });
        self
    }

    /// Base font name without a leading `/`.
    pub fn base_name(&self) -> Option<&str> {
        self.base_font
            .as_deref()
            .map(|name| name.strip_prefix('/').unwrap_or(name))
            .filter(|name| !name.is_empty())
    }
}

/// Font resources of one page.
#[derive(Debug, Clone, Default)]
pub struct PageFonts {
    /// Resources in dictionary order
    pub resources: Vec<FontResource>,
}

impl PageFonts {
    /// Page with the given resources.
    pub fn new(resources: Vec<FontResource>) -> Self {
        Self { resources }
    }
}
