use ariadne::{Color, Label, Report, ReportKind, Source};
use ec_core::{Diagnostic, Severity};

use crate::lexer::LexError;
use crate::parser::ParseError;

/// Convert a lexer error into an error diagnostic for `file`.
pub fn from_lex_error(error: LexError, file: &str) -> Diagnostic {
    Diagnostic::error(error.message)
        .in_file(file)
        .with_span(error.span)
}

/// Convert a parser error into an error diagnostic for `file`.
pub fn from_parse_error(error: ParseError, file: &str) -> Diagnostic {
    Diagnostic::error(error.message)
        .in_file(file)
        .with_span(error.span)
}

/// Render diagnostics using ariadne for pretty terminal output.
///
/// Diagnostics without a span are rendered as a single line.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let Some(span) = diag.span.clone() else {
            output.extend_from_slice(format!("{diag}\n").as_bytes());
            continue;
        };

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        Report::build(kind, (filename, span.clone()))
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, span))
                    .with_message(&diag.message)
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_spanned_diagnostic() {
        let source = "entityDef a {\n    \"health\"\n}";
        let diags = vec![Diagnostic::warning("key \"health\" without value").with_span(18..26)];
        let output = render_diagnostics(source, "def/a.def", &diags);
        assert!(output.contains("without value"));
        assert!(output.contains("def/a.def"));
    }

    #[test]
    fn render_unspanned_diagnostic() {
        let diags = vec![Diagnostic::warning("entity class \"a\" redefined").in_file("def/a.def")];
        let output = render_diagnostics("", "def/a.def", &diags);
        assert_eq!(output, "warning: def/a.def: entity class \"a\" redefined\n");
    }

    #[test]
    fn lex_errors_become_error_diagnostics() {
        let diag = from_lex_error(
            LexError {
                span: 3..4,
                message: "unterminated string".into(),
            },
            "def/x.def",
        );
        assert!(diag.is_error());
        assert_eq!(diag.file.as_deref(), Some("def/x.def"));
        assert_eq!(diag.span, Some(3..4));
    }
}
