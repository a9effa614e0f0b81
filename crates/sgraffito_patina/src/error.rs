//! Error types for sgraffito_patina.

use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::DiagnosticSource;

/// Errors raised while turning a `sassOptions` value into compiler options.
///
/// These never abort a lint run: the rule reports them as a single warning
/// at the document root.
#[derive(Debug, Error)]
pub enum ConfigResolutionError {
    /// The module specifier did not resolve to a file
    #[error("Cannot find module '{specifier}' from '{}'", base.display())]
    ModuleNotFound { specifier: String, base: PathBuf },

    /// The resolved module could not be read
    #[error("Failed to read config module '{}': {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// The resolved module could not be parsed
    #[error("Failed to parse config module '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The resolved module has no loader for its format
    #[error("Unsupported config module format: '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A config factory failed while producing its options
    #[error("Config factory failed: {0}")]
    Factory(String),

    /// The module (or its factory) produced something other than an object
    #[error("Config module '{}' must provide an object, got {kind}", path.display())]
    NotAnObject { path: PathBuf, kind: &'static str },
}

/// Error thrown by the compiler itself (syntax errors, missing imports, ...).
///
/// Propagated to the host unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub file: Option<String>,
    pub span: Option<DiagnosticSource>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
            span: None,
        }
    }

    /// Attach the file the compiler blamed
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach the source span the compiler blamed
    pub fn with_span(mut self, span: DiagnosticSource) -> Self {
        self.span = Some(span);
        self
    }
}

/// Rule options failed validation against the options schema.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Options were neither a boolean nor an object
    #[error("Invalid option value for rule \"plugin/sass-render-errors\": expected a boolean or an object, got {0}")]
    UnexpectedType(&'static str),

    /// Object options contained unknown keys or mistyped values
    #[error("Invalid option value for rule \"plugin/sass-render-errors\": {0}")]
    Schema(#[from] serde_json::Error),
}
