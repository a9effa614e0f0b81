//! Output formatters for lint results.

mod text;

pub use text::*;

use crate::report::{LintResult, ReportedWarning};
use serde::Serialize;

/// Output format for lint results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Rich terminal output with code snippets
    #[default]
    Text,
    /// Stylelint-compatible JSON
    Json,
}

/// Format lint results according to the specified format
pub fn format_results(
    results: &[LintResult],
    sources: &[(String, String)],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => format_text(results, sources),
        OutputFormat::Json => format_json(results),
    }
}

/// JSON output structure for a single file
#[derive(Debug, Serialize)]
pub struct JsonFileResult<'a> {
    pub source: &'a str,
    pub errored: bool,
    pub warnings: &'a [ReportedWarning],
    #[serde(rename = "invalidOptionWarnings")]
    pub invalid_option_warnings: Vec<JsonInvalidOption<'a>>,
}

/// An invalid option report in JSON output
#[derive(Debug, Serialize)]
pub struct JsonInvalidOption<'a> {
    pub text: &'a str,
}

/// Format results as JSON
fn format_json(results: &[LintResult]) -> String {
    let json_results: Vec<JsonFileResult<'_>> = results
        .iter()
        .map(|r| JsonFileResult {
            source: &r.filename,
            errored: r.has_errors(),
            warnings: &r.warnings,
            invalid_option_warnings: r
                .invalid_options
                .iter()
                .map(|text| JsonInvalidOption { text })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&json_results).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::rule::RULE_NAME;

    fn result() -> LintResult {
        LintResult {
            filename: "a.scss".to_string(),
            warnings: vec![ReportedWarning {
                line: 1,
                column: 1,
                end_line: 1,
                end_column: 12,
                rule: RULE_NAME,
                severity: Severity::Error,
                text: "Can't find stylesheet to import. (plugin/sass-render-errors)".to_string(),
            }],
            invalid_options: Vec::new(),
            error_count: 1,
            warning_count: 0,
        }
    }

    #[test]
    fn test_json_output() {
        let json = format_results(&[result()], &[], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        insta::assert_snapshot!(value.to_string(), @r#"[{"errored":true,"invalidOptionWarnings":[],"source":"a.scss","warnings":[{"column":1,"endColumn":12,"endLine":1,"line":1,"rule":"plugin/sass-render-errors","severity":"error","text":"Can't find stylesheet to import. (plugin/sass-render-errors)"}]}]"#);
    }

    #[test]
    fn test_text_output() {
        let sources = [("a.scss".to_string(), "@use \"loki\";\n".to_string())];
        let text = format_results(&[result()], &sources, OutputFormat::Text);
        assert!(text.contains("Can't find stylesheet to import."));
        assert!(text.contains("@use \"loki\";"));
        assert!(text.ends_with("1 error\n"));
    }
}
