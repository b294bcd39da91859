//! [`DeclSource`] implementations backed by declaration text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ec_core::source::DEFAULT_MOD;
use ec_core::{DeclSource, Diagnostic, SourceInfo, SourceLoad};
use tracing::{debug, error};

use crate::diagnostics::{from_lex_error, from_parse_error};
use crate::{compiler, lexer, parser};

/// Default directory, relative to the root, holding declaration files.
pub const DEFAULT_DEF_DIR: &str = "def";
/// Default declaration file extension.
pub const DEFAULT_EXTENSION: &str = "def";

/// Lex, parse and lower one file's text.
///
/// A file that fails to parse contributes no blocks, only error diagnostics.
pub fn parse_text(text: &str, source: &SourceInfo) -> SourceLoad {
    let (tokens, lex_errors) = lexer::lex(text);
    let mut diagnostics: Vec<Diagnostic> = lex_errors
        .into_iter()
        .map(|e| from_lex_error(e, &source.file))
        .collect();

    let file = match parser::parse(&tokens) {
        Ok(file) => file,
        Err(parse_errors) => {
            error!("failed to parse {}", source.file);
            diagnostics.extend(
                parse_errors
                    .into_iter()
                    .map(|e| from_parse_error(e, &source.file)),
            );
            return SourceLoad {
                blocks: Vec::new(),
                diagnostics,
            };
        }
    };

    let lowered = compiler::lower(&file, source);
    diagnostics.extend(lowered.diagnostics);
    SourceLoad {
        blocks: lowered.blocks,
        diagnostics,
    }
}

/// Declaration files under `<root>/def/*.def`.
///
/// Files are read in sorted order on every load, so a reload sees edits made
/// since the previous one. The mod name is the root directory's name.
#[derive(Debug, Clone)]
pub struct DefDirectory {
    root: PathBuf,
    def_dir: String,
    extension: String,
}

impl DefDirectory {
    /// A source reading `<root>/def/*.def`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            def_dir: DEFAULT_DEF_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Read declarations from `dir` (relative to the root) instead of `def`.
    pub fn with_def_dir(mut self, dir: impl Into<String>) -> Self {
        self.def_dir = dir.into();
        self
    }

    /// Read files with this extension instead of `def`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute or root-relative path of a file named in a diagnostic.
    pub fn resolve_file(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Name of the mod the files belong to.
    pub fn mod_name(&self) -> String {
        std::fs::canonicalize(&self.root)
            .ok()
            .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| DEFAULT_MOD.to_string())
    }

    /// Declaration files, sorted by path.
    pub fn files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.root.join(&self.def_dir))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file() && p.extension().is_some_and(|ext| ext == self.extension.as_str())
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl DeclSource for DefDirectory {
    fn load(&self) -> SourceLoad {
        let dir = self.root.join(&self.def_dir);
        let files = match self.files() {
            Ok(files) => files,
            Err(e) => {
                error!("cannot read directory {}: {}", dir.display(), e);
                return SourceLoad {
                    blocks: Vec::new(),
                    diagnostics: vec![Diagnostic::error(format!(
                        "cannot read directory {}: {e}",
                        dir.display()
                    ))],
                };
            }
        };

        let mod_name = self.mod_name();
        let mut load = SourceLoad::default();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let info = SourceInfo::new(format!("{}/{file_name}", self.def_dir), mod_name.as_str());

            match std::fs::read_to_string(path) {
                Ok(text) => {
                    let parsed = parse_text(&text, &info);
                    load.blocks.extend(parsed.blocks);
                    load.diagnostics.extend(parsed.diagnostics);
                }
                Err(e) => {
                    error!("cannot read {}: {}", path.display(), e);
                    load.diagnostics.push(
                        Diagnostic::error(format!("cannot read file: {e}")).in_file(info.file),
                    );
                }
            }
        }

        debug!(
            "read {} files from {}: {} blocks",
            files.len(),
            dir.display(),
            load.blocks.len()
        );
        load
    }
}

/// Declaration text held in memory, keyed by file name.
#[derive(Debug, Clone)]
pub struct TextSource {
    files: BTreeMap<String, String>,
    mod_name: String,
}

impl Default for TextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource {
    /// An empty source in the `base` mod.
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            mod_name: DEFAULT_MOD.to_string(),
        }
    }

    /// Add a file, builder style.
    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }

    /// Remove a file. Returns its text if it existed.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.files.remove(name)
    }

    /// Text of a file.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }
}

impl DeclSource for TextSource {
    fn load(&self) -> SourceLoad {
        let mut load = SourceLoad::default();
        for (name, text) in &self.files {
            let parsed = parse_text(text, &SourceInfo::new(name.as_str(), self.mod_name.as_str()));
            load.blocks.extend(parsed.blocks);
            load.diagnostics.extend(parsed.diagnostics);
        }
        load
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_core::{ClassType, DeclarationRegistry, Visibility};

    const LIGHTS: &str = r#"
entityDef light {
    "editor_color"  "0 1 0"
    "editor_mins"   "-8 -8 -8"
    "editor_maxs"   "8 8 8"
    "spawnclass"    "idLight"
    "editor_usage"  "Light source."
}

entityDef light_torch {
    "inherit" "light"
}
"#;

    #[test]
    fn parse_text_reports_parse_failures_without_blocks() {
        let info = SourceInfo::new("def/broken.def", "base");
        let load = parse_text("entityDef broken { \"a\" \"b\"", &info);
        assert!(load.blocks.is_empty());
        assert!(load.diagnostics.iter().all(Diagnostic::is_error));
        assert_eq!(load.diagnostics[0].file.as_deref(), Some("def/broken.def"));
    }

    #[test]
    fn text_source_feeds_registry() {
        let source = TextSource::new().with_file("def/lights.def", LIGHTS);
        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&source);

        let torch = registry.require_class("light_torch").unwrap();
        assert_eq!(torch.class_type(), ClassType::Light);
        assert_eq!(torch.usage(), "Light source.");
        assert_eq!(torch.mod_name(), "base");
        assert_eq!(torch.source().unwrap().file, "def/lights.def");
    }

    #[test]
    fn reload_sees_edited_text() {
        let mut source = TextSource::new().with_file("def/lights.def", LIGHTS);
        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&source);
        let id = registry.find_class("light_torch").unwrap();

        source.insert("def/lights.def", "entityDef light { }");
        registry.reload_defs(&source);

        assert_eq!(registry.find_class("light_torch"), Some(id));
        assert_eq!(registry[id].visibility(), Visibility::Hidden);
        assert!(!registry.require_class("light").unwrap().is_light());
    }

    #[test]
    fn broken_file_does_not_block_others() {
        let source = TextSource::new()
            .with_file("def/a.def", "entityDef a { }")
            .with_file("def/b.def", "entityDef b {");
        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&source);

        assert!(registry.class_by_name("a").is_some());
        assert!(registry.class_by_name("b").is_none());
        assert!(registry.diagnostics().iter().any(|d| d.is_error()));
    }

    #[test]
    fn def_directory_reads_sorted_files() {
        let dir = tempfile::tempdir().unwrap();
        let def = dir.path().join("def");
        std::fs::create_dir(&def).unwrap();
        std::fs::write(def.join("b.def"), "entityDef dup { \"from\" \"b\" }").unwrap();
        std::fs::write(def.join("a.def"), "entityDef dup { \"from\" \"a\" }").unwrap();
        std::fs::write(def.join("notes.txt"), "entityDef ignored { }").unwrap();

        let source = DefDirectory::new(dir.path());
        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&source);

        let dup = registry.require_class("dup").unwrap();
        assert_eq!(dup.attribute_value("from", true), "b");
        assert_eq!(dup.source().unwrap().file, "def/b.def");
        assert!(registry.class_by_name("ignored").is_none());
        assert!(registry.diagnostics().iter().any(|d| d.message.contains("redefined")));
    }

    #[test]
    fn def_directory_mod_name_is_root_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("darkmod");
        std::fs::create_dir_all(root.join("def")).unwrap();
        std::fs::write(root.join("def").join("a.def"), "entityDef a { }").unwrap();

        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&DefDirectory::new(&root));
        assert_eq!(registry.require_class("a").unwrap().mod_name(), "darkmod");
    }

    #[test]
    fn missing_def_directory_is_an_error_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let load = DefDirectory::new(dir.path()).load();
        assert!(load.blocks.is_empty());
        assert!(load.diagnostics[0].message.starts_with("cannot read directory"));
    }
}
