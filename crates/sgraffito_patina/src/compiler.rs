//! Collaborator seams: the Sass compiler and the diagnostic extractor that
//! wraps it, plus the option set they are invoked with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::diagnostic::RenderDiagnostic;
use crate::error::CompileError;
use crate::options::UndefinedFunctionsOptions;

/// How the compiler is told what to compile. Exactly one mode per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileInput {
    /// Compile a stylesheet by path
    File(PathBuf),
    /// Compile source text held in memory
    Content(String),
}

/// The option set a compiler invocation receives.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    base: Map<String, Value>,
    input: CompileInput,
}

impl CompilerOptions {
    pub fn new(base: Map<String, Value>, input: CompileInput) -> Self {
        Self { base, input }
    }

    /// Options taken from configuration, before the fixed fields are applied
    #[inline]
    pub fn base(&self) -> &Map<String, Value> {
        &self.base
    }

    #[inline]
    pub fn input(&self) -> &CompileInput {
        &self.input
    }

    /// Warnings from dependencies are always silenced
    #[inline]
    pub fn quiet_deps(&self) -> bool {
        true
    }

    #[inline]
    pub fn file(&self) -> Option<&Path> {
        match &self.input {
            CompileInput::File(path) => Some(path),
            CompileInput::Content(_) => None,
        }
    }

    #[inline]
    pub fn content(&self) -> Option<&str> {
        match &self.input {
            CompileInput::File(_) => None,
            CompileInput::Content(content) => Some(content),
        }
    }

    /// The merged option object in the compiler's own key names.
    ///
    /// Addressing keys from the base object are dropped so only the
    /// active mode (`file` or `data`) is present.
    pub fn to_value(&self) -> Value {
        let mut options = self.base.clone();
        options.remove("file");
        options.remove("data");
        options.insert("quietDeps".to_string(), Value::Bool(self.quiet_deps()));
        match &self.input {
            CompileInput::File(path) => {
                options.insert(
                    "file".to_string(),
                    Value::String(path.to_string_lossy().into_owned()),
                );
            }
            CompileInput::Content(content) => {
                options.insert("data".to_string(), Value::String(content.clone()));
            }
        }
        Value::Object(options)
    }
}

/// Compiled output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutput {
    pub css: String,
}

/// The Sass compiler, treated as a black box.
pub trait Compiler: Send + Sync {
    fn compile(&self, options: &CompilerOptions) -> Result<CompileOutput, CompileError>;
}

/// A diagnostic-producing renderer built around a compiler.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Non-blocking render
    async fn render(&self, options: &CompilerOptions)
        -> Result<Vec<RenderDiagnostic>, CompileError>;

    /// Blocking render
    fn render_sync(&self, options: &CompilerOptions) -> Result<Vec<RenderDiagnostic>, CompileError>;
}

/// Builds renderers for a compiler instance.
pub trait DiagnosticExtractor: Send + Sync {
    /// Renderer reporting render errors and deprecations
    fn renderer(&self, compiler: Arc<dyn Compiler>) -> Arc<dyn Renderer>;

    /// Renderer reporting undefined function calls
    fn undefined_functions_renderer(
        &self,
        compiler: Arc<dyn Compiler>,
        options: &UndefinedFunctionsOptions,
    ) -> Arc<dyn Renderer>;
}

/// Identity of a compiler instance, used to key memoized renderers.
#[inline]
pub fn compiler_identity(compiler: &Arc<dyn Compiler>) -> usize {
    Arc::as_ptr(compiler) as *const () as usize
}
