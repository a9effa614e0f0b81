//! Rich terminal output using miette.

use crate::diagnostic::Severity;
use crate::report::{byte_offset, LintResult, ReportedWarning};
use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode,
};
use sgraffito_carton::FxHashMap;
use sgraffito_relief::Position;
use std::fmt::Display;
use std::sync::Arc;

/// A reported warning bound to the source it points into
#[derive(Debug, thiserror::Error)]
#[error("{text}")]
struct WarningReport<'a> {
    text: &'a str,
    rule: &'a str,
    severity: Severity,
    named_source: Option<Arc<NamedSource<String>>>,
    span: Option<miette::SourceSpan>,
}

impl Diagnostic for WarningReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn Display + 'b>> {
        Some(Box::new(self.rule))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.named_source
            .as_deref()
            .map(|source| source as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            None, span,
        ))))
    }
}

/// Byte span of a warning inside `source`
fn warning_span(source: &str, warning: &ReportedWarning) -> Option<miette::SourceSpan> {
    let start = byte_offset(source, Position::new(warning.line, warning.column))?;
    let end = byte_offset(source, Position::new(warning.end_line, warning.end_column))
        .unwrap_or(start)
        .max(start);
    Some((start, end - start).into())
}

/// Format lint results as rich terminal output
pub fn format_text(results: &[LintResult], sources: &[(String, String)]) -> String {
    let mut output = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());

    // Create a map of filename to source
    let source_map: FxHashMap<&str, &str> = sources
        .iter()
        .map(|(f, s)| (f.as_str(), s.as_str()))
        .collect();

    for result in results {
        for message in &result.invalid_options {
            let report = WarningReport {
                text: message,
                rule: crate::rule::RULE_NAME,
                severity: Severity::Error,
                named_source: None,
                span: None,
            };
            let mut buf = String::new();
            if handler.render_report(&mut buf, &report).is_ok() {
                output.push_str(&buf);
                output.push('\n');
            }
        }

        if result.warnings.is_empty() {
            continue;
        }

        let source = source_map.get(result.filename.as_str()).copied();
        let named_source =
            source.map(|source| Arc::new(NamedSource::new(&result.filename, source.to_string())));

        for warning in &result.warnings {
            let report = WarningReport {
                text: &warning.text,
                rule: warning.rule,
                severity: warning.severity,
                span: source.and_then(|source| warning_span(source, warning)),
                named_source: named_source.clone(),
            };

            let mut buf = String::new();
            if handler.render_report(&mut buf, &report).is_ok() {
                output.push_str(&buf);
                output.push('\n');
            }
        }
    }

    let error_count = results.iter().map(|r| r.error_count).sum();
    let warning_count = results.iter().map(|r| r.warning_count).sum();
    let summary = format_summary(error_count, warning_count);
    if !summary.is_empty() {
        output.push_str(&summary);
        output.push('\n');
    }

    output
}

/// Format a summary line
pub fn format_summary(error_count: usize, warning_count: usize) -> String {
    let mut parts = Vec::new();

    if error_count > 0 {
        parts.push(format!(
            "{} error{}",
            error_count,
            if error_count == 1 { "" } else { "s" }
        ));
    }

    if warning_count > 0 {
        parts.push(format!(
            "{} warning{}",
            warning_count,
            if warning_count == 1 { "" } else { "s" }
        ));
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RULE_NAME;

    fn warning(line: u32, column: u32, end_column: u32) -> ReportedWarning {
        ReportedWarning {
            line,
            column,
            end_line: line,
            end_column,
            rule: RULE_NAME,
            severity: Severity::Warning,
            text: "Undefined function. (plugin/sass-render-errors)".to_string(),
        }
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(format_summary(0, 0), "");
        assert_eq!(format_summary(1, 0), "1 error");
        assert_eq!(format_summary(2, 1), "2 errors, 1 warning");
        assert_eq!(format_summary(0, 3), "3 warnings");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(format_text(&[], &[]), "");
    }

    #[test]
    fn test_warning_span() {
        let source = "a {}\nbody { width: becky(1); }\n";
        let span = warning_span(source, &warning(2, 15, 21)).unwrap();
        assert_eq!(span.offset(), 19);
        assert_eq!(span.len(), 6);
        assert_eq!(&source[span.offset()..span.offset() + span.len()], "becky(");

        assert!(warning_span(source, &warning(9, 1, 2)).is_none());
    }

    #[test]
    fn test_renders_through_report_handler() {
        let source = "body { width: becky(1); }\n";
        let result = LintResult {
            filename: "a.scss".to_string(),
            warnings: vec![warning(1, 15, 21)],
            invalid_options: Vec::new(),
            error_count: 0,
            warning_count: 1,
        };
        let text = format_text(&[result], &[("a.scss".to_string(), source.to_string())]);

        assert!(text.contains("Undefined function. (plugin/sass-render-errors)"));
        assert!(text.contains(RULE_NAME));
        assert!(text.contains("a.scss"));
        assert!(text.contains("body { width: becky(1); }"));
        assert!(text.ends_with("1 warning\n"));
    }

    #[test]
    fn test_missing_source_still_renders_message() {
        let result = LintResult {
            filename: "stdin".to_string(),
            warnings: vec![warning(1, 1, 2)],
            invalid_options: vec!["bad option".to_string()],
            error_count: 0,
            warning_count: 1,
        };
        let text = format_text(&[result], &[]);

        assert!(text.contains("Undefined function. (plugin/sass-render-errors)"));
        assert!(text.contains("bad option"));
    }
}
