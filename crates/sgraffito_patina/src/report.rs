//! Reporting adapter between the rule and the host lint engine.

use serde::Serialize;
use sgraffito_relief::{Position, SyntaxNode};

use crate::diagnostic::Severity;
use crate::rule::RULE_NAME;

/// A warning handed to the host.
///
/// The host derives the column from `node` and `word`.
#[derive(Debug)]
pub struct Warning<'a, N> {
    pub node: &'a N,
    pub line: u32,
    /// Source text the warning points at
    pub word: Option<&'a str>,
    pub message: String,
    pub severity: Severity,
}

/// Host reporting sink.
pub trait Reporter<N> {
    fn report(&mut self, warning: Warning<'_, N>);

    /// Called instead of linting when the rule options fail validation
    fn invalid_option(&mut self, message: &str);
}

/// Format a message the way the host shows rule messages
#[inline]
pub fn rule_message(message: &str) -> String {
    format!("{message} ({RULE_NAME})")
}

/// A warning as recorded by [`WarningCollector`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedWarning {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub rule: &'static str,
    pub severity: Severity,
    pub text: String,
}

/// Lint result for a single file
#[derive(Debug, Clone, Default)]
pub struct LintResult {
    /// Filename that was linted
    pub filename: String,
    pub warnings: Vec<ReportedWarning>,
    /// Option validation failures
    pub invalid_options: Vec<String>,
    /// Number of errors
    pub error_count: usize,
    /// Number of warnings
    pub warning_count: usize,
}

impl LintResult {
    /// Check if there are any errors
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// In-process reporting sink.
///
/// Columns are resolved against `document` like a host engine does: the
/// first occurrence of `word` at or after the node start. Without a
/// document, or when the word is not found, the node start is used.
#[derive(Debug, Default)]
pub struct WarningCollector<'d> {
    document: Option<&'d str>,
    warnings: Vec<ReportedWarning>,
    invalid_options: Vec<String>,
}

impl<'d> WarningCollector<'d> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector resolving word positions inside `document`
    pub fn with_document(document: &'d str) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    #[inline]
    pub fn warnings(&self) -> &[ReportedWarning] {
        &self.warnings
    }

    #[inline]
    pub fn invalid_options(&self) -> &[String] {
        &self.invalid_options
    }

    pub fn into_result(self, filename: impl Into<String>) -> LintResult {
        let error_count = self
            .warnings
            .iter()
            .filter(|w| w.severity == Severity::Error)
            .count();
        LintResult {
            filename: filename.into(),
            warning_count: self.warnings.len() - error_count,
            error_count,
            warnings: self.warnings,
            invalid_options: self.invalid_options,
        }
    }

    fn locate_word(&self, from: Position, word: &str) -> Option<(Position, Position)> {
        let document = self.document?;
        if word.is_empty() {
            return None;
        }
        let start = byte_offset(document, from)?;
        let found = start + document[start..].find(word)?;
        Some((
            position_at(document, found),
            position_at(document, found + word.len()),
        ))
    }
}

impl<N: SyntaxNode> Reporter<N> for WarningCollector<'_> {
    fn report(&mut self, warning: Warning<'_, N>) {
        let node_start = warning
            .node
            .start()
            .unwrap_or(Position::new(warning.line, 1));
        let (start, end) = warning
            .word
            .and_then(|word| self.locate_word(node_start, word))
            .unwrap_or_else(|| {
                let start = Position::new(warning.line, node_start.column);
                (start, start)
            });
        self.warnings.push(ReportedWarning {
            line: start.line,
            column: start.column,
            end_line: end.line,
            end_column: end.column,
            rule: RULE_NAME,
            severity: warning.severity,
            text: warning.message,
        });
    }

    fn invalid_option(&mut self, message: &str) {
        self.invalid_options.push(message.to_string());
    }
}

/// Byte offset of a 1-based (line, column) position, columns counted in chars
pub(crate) fn byte_offset(document: &str, position: Position) -> Option<usize> {
    let line_index = usize::try_from(position.line.checked_sub(1)?).ok()?;
    let mut line_start = 0;
    for _ in 0..line_index {
        line_start += document[line_start..].find('\n')? + 1;
    }
    let line = &document[line_start..];
    let column = usize::try_from(position.column.saturating_sub(1)).ok()?;
    let within = line
        .char_indices()
        .nth(column)
        .map_or(line.len(), |(index, _)| index);
    Some(line_start + within)
}

/// 1-based (line, column) of a byte offset
fn position_at(document: &str, offset: usize) -> Position {
    let before = &document[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |index| index + 1);
    let column = before[line_start..].chars().count() + 1;
    Position::new(
        u32::try_from(line).unwrap_or(u32::MAX),
        u32::try_from(column).unwrap_or(u32::MAX),
    )
}
