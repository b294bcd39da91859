pub mod check;
pub mod export;
pub mod list;
pub mod model;
pub mod models;
pub mod show;

use std::collections::BTreeMap;
use std::path::Path;

use ec_core::{DeclarationRegistry, Diagnostic, Severity};
use ec_dsl::{DefDirectory, render_diagnostics};

use crate::config::CliConfig;

/// Load every declaration under `dir` and print diagnostics.
/// Returns the registry if there are no errors.
fn load_registry(dir: &Path, config: &CliConfig) -> Result<DeclarationRegistry, String> {
    let source = DefDirectory::new(dir)
        .with_def_dir(config.def_dir.as_str())
        .with_extension(config.extension.as_str());

    let mut registry = DeclarationRegistry::new(config.registry.clone());
    registry.load_defs(&source);

    let diagnostics = registry.take_diagnostics();
    print_diagnostics(&source, &diagnostics);

    if diagnostics.iter().any(Diagnostic::is_error) {
        Err("loading declarations failed with errors".into())
    } else {
        Ok(registry)
    }
}

/// Print diagnostics to stderr using ariadne, one file at a time.
fn print_diagnostics(source: &DefDirectory, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    // Diagnostics without a file go first
    let mut by_file: BTreeMap<Option<&str>, Vec<Diagnostic>> = BTreeMap::new();
    for diag in diagnostics {
        by_file
            .entry(diag.file.as_deref())
            .or_default()
            .push(diag.clone());
    }

    for (file, diags) in &by_file {
        let rendered = match file {
            Some(file) => {
                let text = std::fs::read_to_string(source.resolve_file(file)).unwrap_or_default();
                render_diagnostics(&text, file, diags)
            }
            None => render_diagnostics("", "", diags),
        };
        eprint!("{rendered}");
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            if errors == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    } else {
        eprintln!(
            "  {} warning{}",
            warnings,
            if warnings == 1 { "" } else { "s" },
        );
    }
}

/// Text for an empty value in tables.
fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
