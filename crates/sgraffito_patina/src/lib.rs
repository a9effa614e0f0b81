//! # sgraffito_patina
//!
//! Patina - Sass render errors re-projected onto the linted stylesheet.
//!
//! ## Name Origin
//!
//! **Patina** (/ˈpætɪnə/) is the layer that forms on a surface over time and
//! reveals what happened underneath. `sgraffito_patina` compiles the linted
//! stylesheet with Sass and brings the compiler's errors, deprecations and
//! undefined function calls back up to the surface of the host tree.
//!
//! ## Pipeline
//!
//! 1. Validate the rule options (`true`, `false` or an options object)
//! 2. Resolve the Sass options (inline object or config module)
//! 3. Compile with one or two renderers, concurrently or blocking
//! 4. Deduplicate diagnostics and keep those for the linted file
//! 5. Compensate the line offset of extracted fragments
//! 6. Report each diagnostic on the nearest node of the host tree
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sgraffito_patina::{format_results, HostContext, OutputFormat, SassRenderErrors};
//!
//! let rule = SassRenderErrors::new(compiler, extractor);
//! let host = HostContext::new("src/app.scss", source, &root);
//! let result = rule.run(&serde_json::json!({ "checkUndefinedFunctions": true }), &host).await?;
//! println!("{}", format_results(&[result], &[("src/app.scss".to_string(), source.to_string())], OutputFormat::Text));
//! ```

pub mod compiler;
pub mod config;
pub mod dedupe;
pub mod diagnostic;
pub mod error;
pub mod loader;
pub mod locate;
pub mod options;
pub mod output;
pub mod renderer;
pub mod report;
pub mod rule;
pub mod target;

pub use compiler::{
    compiler_identity, CompileInput, CompileOutput, Compiler, CompilerOptions, DiagnosticExtractor,
    Renderer,
};
pub use config::{ConfigSource, ModuleLoader, OptionsResolver, PackageLocator, ResolvedOptions};
pub use diagnostic::{DiagnosticKind, DiagnosticSource, RenderDiagnostic, Severity};
pub use error::{CompileError, ConfigResolutionError, OptionsError};
pub use loader::{FsModuleLoader, FsPackageLocator};
pub use options::{RenderMode, RuleOptions, SassOptionsValue, UndefinedFunctionsOptions, RULE_OPTIONS_SCHEMA};
pub use output::{format_results, OutputFormat};
pub use renderer::RendererCache;
pub use report::{LintResult, ReportedWarning, Reporter, Warning, WarningCollector};
pub use rule::{HostContext, RuleMeta, SassRenderErrors, META, RULE_NAME};
pub use target::{TargetFile, STDIN_SENTINEL};

pub use sgraffito_relief::{Position, SourceSpan, StyleNode, SyntaxNode};
