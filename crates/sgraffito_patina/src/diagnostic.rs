//! Diagnostic types produced by the Sass renderers.

use serde::{Deserialize, Serialize};
use sgraffito_relief::Position;

/// Severity of a reported warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What produced a render diagnostic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Hard compiler error (syntax error, missing import, ...)
    #[default]
    Error,
    /// Deprecation warning emitted during compilation
    Deprecation,
    /// Call to a function that is neither Sass, CSS nor allow-listed
    UndefinedFunction,
}

impl DiagnosticKind {
    /// Compiler-level errors are reported with a stronger severity than
    /// deprecations and undefined functions.
    #[inline]
    pub fn severity(self) -> Severity {
        match self {
            Self::Error => Severity::Error,
            Self::Deprecation | Self::UndefinedFunction => Severity::Warning,
        }
    }
}

/// Where in the compiled source a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosticSource {
    /// Source text the diagnostic matched
    pub pattern: String,
    pub start: Position,
    pub end: Position,
}

impl DiagnosticSource {
    pub fn new(pattern: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            pattern: pattern.into(),
            start,
            end,
        }
    }
}

/// A structured diagnostic extracted from a compiler run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDiagnostic {
    /// Source the diagnostic belongs to (`"stdin"` for in-memory content)
    pub file: String,
    pub message: String,
    #[serde(default)]
    pub kind: DiagnosticKind,
    pub source: DiagnosticSource,
    /// Compiler stack trace; not part of the diagnostic's identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RenderDiagnostic {
    pub fn new(
        file: impl Into<String>,
        message: impl Into<String>,
        kind: DiagnosticKind,
        source: DiagnosticSource,
    ) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            kind,
            source,
            stack: None,
        }
    }

    /// Attach a stack trace
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}
