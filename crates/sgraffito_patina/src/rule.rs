//! The `plugin/sass-render-errors` rule.

use std::sync::Arc;

use serde_json::Value;
use sgraffito_relief::SyntaxNode;

use crate::compiler::{Compiler, DiagnosticExtractor};
use crate::config::OptionsResolver;
use crate::dedupe::{retain_for_file, unique};
use crate::diagnostic::Severity;
use crate::error::CompileError;
use crate::locate::{closest_node, document_position, line_offset};
use crate::options::RuleOptions;
use crate::renderer::{render_all, RendererCache};
use crate::report::{rule_message, LintResult, Reporter, Warning, WarningCollector};
use crate::target::TargetFile;

pub const RULE_NAME: &str = "plugin/sass-render-errors";

/// Rule metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// Rule name as configured in the host
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Severity of diagnostics without a more specific one
    pub default_severity: Severity,
}

pub static META: RuleMeta = RuleMeta {
    name: RULE_NAME,
    description: "Report Sass render errors, deprecations and undefined functions",
    default_severity: Severity::Warning,
};

/// What the host hands the rule for one stylesheet.
#[derive(Debug)]
pub struct HostContext<'a, N> {
    pub target: TargetFile,
    /// Source text the tree was parsed from
    pub content: &'a str,
    pub root: &'a N,
    /// Whole host document, when `content` was extracted from a larger file
    pub document: Option<&'a str>,
}

impl<'a, N> HostContext<'a, N> {
    pub fn new(target: &str, content: &'a str, root: &'a N) -> Self {
        Self {
            target: TargetFile::parse(target),
            content,
            root,
            document: None,
        }
    }

    /// Set the whole host document. Node positions of extracted fragments
    /// are document coordinates, so word columns can only be resolved
    /// against it.
    pub fn with_document(mut self, document: &'a str) -> Self {
        self.document = Some(document);
        self
    }

    /// Whether `content` was extracted from a larger file
    #[inline]
    pub fn is_fragment(&self) -> bool {
        self.target.path().is_some() && !self.target.is_style_file()
    }

    /// Text word columns are resolved against. `None` for fragments
    /// without a host document.
    pub fn word_source(&self) -> Option<&'a str> {
        self.document
            .or_else(|| (!self.is_fragment()).then_some(self.content))
    }
}

/// Compiles the linted stylesheet with Sass and reports what the compiler
/// complains about on the closest node of the host tree.
pub struct SassRenderErrors {
    compiler: Arc<dyn Compiler>,
    extractor: Arc<dyn DiagnosticExtractor>,
    resolver: Arc<OptionsResolver>,
    renderers: Arc<RendererCache>,
}

impl SassRenderErrors {
    /// Create the rule with a filesystem options resolver
    pub fn new(compiler: Arc<dyn Compiler>, extractor: Arc<dyn DiagnosticExtractor>) -> Self {
        Self {
            compiler,
            extractor,
            resolver: Arc::new(OptionsResolver::filesystem()),
            renderers: Arc::new(RendererCache::new()),
        }
    }

    /// Share an options resolver (and its caches) with other rule instances
    pub fn with_resolver(mut self, resolver: Arc<OptionsResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Share a renderer cache with other rule instances
    pub fn with_renderers(mut self, renderers: Arc<RendererCache>) -> Self {
        self.renderers = renderers;
        self
    }

    #[inline]
    pub fn meta(&self) -> &'static RuleMeta {
        &META
    }

    #[inline]
    pub fn resolver(&self) -> &OptionsResolver {
        &self.resolver
    }

    #[inline]
    pub fn renderers(&self) -> &RendererCache {
        &self.renderers
    }

    /// Lint one stylesheet, reporting through `reporter`.
    ///
    /// Invalid options and configuration failures are reported; compiler
    /// failures are returned.
    pub async fn check<N: SyntaxNode>(
        &self,
        raw: &Value,
        host: &HostContext<'_, N>,
        reporter: &mut dyn Reporter<N>,
    ) -> Result<(), CompileError> {
        let options = match RuleOptions::parse(raw) {
            Ok(Some(options)) => options,
            Ok(None) => return Ok(()),
            Err(err) => {
                tracing::debug!("invalid {} options: {}", RULE_NAME, err);
                reporter.invalid_option(&err.to_string());
                return Ok(());
            }
        };

        let resolved = match self
            .resolver
            .resolve(&host.target, host.content, &options.sass_options)
            .await
        {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!("sass options for {}: {}", host.target.identifier(), err);
                reporter.report(Warning {
                    node: host.root,
                    line: 1,
                    word: None,
                    message: rule_message(&err.to_string()),
                    severity: Severity::Error,
                });
                return Ok(());
            }
        };

        let undefined_functions = options.undefined_functions();
        let renderers = self.renderers.renderers(
            &self.compiler,
            self.extractor.as_ref(),
            undefined_functions.as_ref(),
        );
        tracing::debug!(
            "rendering {} with {} renderer(s)",
            host.target.identifier(),
            renderers.len()
        );
        let diagnostics = render_all(&renderers, &resolved.options, options.render_mode()).await?;
        let diagnostics = retain_for_file(
            unique(diagnostics),
            &host.target,
            resolved.attributed_file.as_deref(),
        );

        let offset = line_offset(host.root, host.target.is_style_file());
        for diagnostic in &diagnostics {
            let start = diagnostic.source.start;
            let node = closest_node(host.root, document_position(start, offset));
            reporter.report(Warning {
                node,
                line: node.start().map_or(start.line, |position| position.line),
                word: Some(diagnostic.source.pattern.as_str()),
                message: rule_message(&diagnostic.message),
                severity: diagnostic.severity(),
            });
        }
        Ok(())
    }

    /// Lint one stylesheet and collect the warnings.
    ///
    /// Columns come from the word position in [`HostContext::word_source`].
    /// Fragments given without their host document report the start column
    /// of the located node.
    pub async fn run<N: SyntaxNode>(
        &self,
        raw: &Value,
        host: &HostContext<'_, N>,
    ) -> Result<LintResult, CompileError> {
        let mut collector = host
            .word_source()
            .map_or_else(WarningCollector::new, WarningCollector::with_document);
        self.check(raw, host, &mut collector).await?;
        Ok(collector.into_result(host.target.identifier()))
    }

    /// [`SassRenderErrors::run`] driven to completion on the current thread
    pub fn check_blocking<N: SyntaxNode>(
        &self,
        raw: &Value,
        host: &HostContext<'_, N>,
    ) -> Result<LintResult, CompileError> {
        futures::executor::block_on(self.run(raw, host))
    }
}

impl std::fmt::Debug for SassRenderErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SassRenderErrors")
            .field("resolver", &self.resolver)
            .field("renderers", &self.renderers)
            .finish_non_exhaustive()
    }
}
