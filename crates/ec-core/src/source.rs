//! The boundary between the engine and whatever produces declaration text.
//!
//! The engine never reads files itself. A [`DeclSource`] hands it already
//! tokenised blocks; `ec-dsl` provides implementations backed by a `def/`
//! directory and by in-memory text.

use serde::Serialize;

use crate::diagnostic::Diagnostic;

/// Mod name used when a source does not know better.
pub const DEFAULT_MOD: &str = "base";

/// Where a declaration block was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// Path of the declaration file, relative to the source root.
    pub file: String,
    /// Mod (root directory) the file belongs to.
    pub mod_name: String,
}

impl SourceInfo {
    /// Create source info for a file.
    pub fn new(file: impl Into<String>, mod_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            mod_name: mod_name.into(),
        }
    }
}

/// An `entityDef <name> { key value ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefBlock {
    /// Declared class name.
    pub name: String,
    /// Key/value pairs in authoring order.
    pub pairs: Vec<(String, String)>,
    /// Origin of the block.
    pub source: SourceInfo,
}

/// A `model <name> { ... }` block, reduced to the parts the engine uses.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefBlock {
    /// Declared model name.
    pub name: String,
    /// Parent model (`inherit`).
    pub inherit: Option<String>,
    /// Mesh path (`mesh`).
    pub mesh: Option<String>,
    /// Skin name (`skin`).
    pub skin: Option<String>,
    /// `anim <name> <file>` entries in authoring order.
    pub anims: Vec<(String, String)>,
    /// Origin of the block.
    pub source: SourceInfo,
}

/// One parsed declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclBlock {
    /// An entity class declaration.
    EntityDef(EntityDefBlock),
    /// A model declaration.
    Model(ModelDefBlock),
}

/// Result of reading every declaration a source currently provides.
#[derive(Debug, Clone, Default)]
pub struct SourceLoad {
    /// Blocks in file order.
    pub blocks: Vec<DeclBlock>,
    /// Problems met while reading or parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Supplies declaration blocks to the registry.
///
/// `load` is called once per load or reload and must return the complete,
/// current set of declarations.
pub trait DeclSource {
    /// Read and parse every declaration.
    fn load(&self) -> SourceLoad;
}

impl DeclSource for Vec<DeclBlock> {
    fn load(&self) -> SourceLoad {
        SourceLoad {
            blocks: self.clone(),
            diagnostics: Vec::new(),
        }
    }
}
