//! Compiler invocation layer.
//!
//! Renderers are built once per compiler instance (and, for the
//! undefined-function renderer, per option set) and reused for the
//! lifetime of the cache.

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use sgraffito_carton::MemoCache;

use crate::compiler::{compiler_identity, Compiler, CompilerOptions, DiagnosticExtractor, Renderer};
use crate::diagnostic::RenderDiagnostic;
use crate::error::CompileError;
use crate::options::{RenderMode, UndefinedFunctionsOptions};

/// Cached renderer together with the compiler it was built for. Holding the
/// compiler keeps its identity from being reused by another instance.
type Pinned = (Arc<dyn Compiler>, Arc<dyn Renderer>);

/// Memoized renderer instances.
#[derive(Default)]
pub struct RendererCache {
    base: MemoCache<usize, Pinned>,
    undefined_functions: MemoCache<(usize, String), Pinned>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render-error renderer for `compiler`
    pub fn renderer(
        &self,
        compiler: &Arc<dyn Compiler>,
        extractor: &dyn DiagnosticExtractor,
    ) -> Arc<dyn Renderer> {
        let (_, renderer) = self.base.get_or_insert_with(compiler_identity(compiler), || {
            tracing::debug!("building render error renderer");
            (Arc::clone(compiler), extractor.renderer(Arc::clone(compiler)))
        });
        renderer
    }

    /// Undefined-function renderer for `compiler` and `options`
    pub fn undefined_functions_renderer(
        &self,
        compiler: &Arc<dyn Compiler>,
        extractor: &dyn DiagnosticExtractor,
        options: &UndefinedFunctionsOptions,
    ) -> Arc<dyn Renderer> {
        let key = (compiler_identity(compiler), options.cache_key());
        let (_, renderer) = self.undefined_functions.get_or_insert_with(key, || {
            tracing::debug!("building undefined function renderer: {}", options.cache_key());
            (
                Arc::clone(compiler),
                extractor.undefined_functions_renderer(Arc::clone(compiler), options),
            )
        });
        renderer
    }

    /// Every renderer active for one invocation, base renderer first
    pub fn renderers(
        &self,
        compiler: &Arc<dyn Compiler>,
        extractor: &dyn DiagnosticExtractor,
        undefined_functions: Option<&UndefinedFunctionsOptions>,
    ) -> Vec<Arc<dyn Renderer>> {
        let mut renderers = vec![self.renderer(compiler, extractor)];
        if let Some(options) = undefined_functions {
            renderers.push(self.undefined_functions_renderer(compiler, extractor, options));
        }
        renderers
    }

    /// Number of cached renderers
    pub fn len(&self) -> usize {
        self.base.len() + self.undefined_functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached renderer
    pub fn clear(&self) {
        self.base.clear();
        self.undefined_functions.clear();
    }
}

impl fmt::Debug for RendererCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererCache")
            .field("base", &self.base)
            .field("undefined_functions", &self.undefined_functions)
            .finish()
    }
}

/// Run every renderer and concatenate their diagnostics in renderer order.
///
/// In [`RenderMode::Async`] the renderers run concurrently and the first
/// failure aborts the whole invocation.
pub async fn render_all(
    renderers: &[Arc<dyn Renderer>],
    options: &CompilerOptions,
    mode: RenderMode,
) -> Result<Vec<RenderDiagnostic>, CompileError> {
    let batches = match mode {
        RenderMode::Async => try_join_all(renderers.iter().map(|r| r.render(options))).await?,
        RenderMode::Sync => renderers
            .iter()
            .map(|r| r.render_sync(options))
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(batches.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileInput, CompileOutput};
    use crate::diagnostic::{DiagnosticKind, DiagnosticSource};
    use async_trait::async_trait;
    use serde_json::Map;
    use sgraffito_relief::Position;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullCompiler;

    impl Compiler for NullCompiler {
        fn compile(&self, _options: &CompilerOptions) -> Result<CompileOutput, CompileError> {
            Ok(CompileOutput::default())
        }
    }

    /// Renderer returning one diagnostic tagged with its label
    struct Labelled {
        label: &'static str,
        fail: bool,
        async_calls: AtomicUsize,
        sync_calls: AtomicUsize,
    }

    impl Labelled {
        fn new(label: &'static str, fail: bool) -> Self {
            Self {
                label,
                fail,
                async_calls: AtomicUsize::new(0),
                sync_calls: AtomicUsize::new(0),
            }
        }

        fn output(&self) -> Result<Vec<RenderDiagnostic>, CompileError> {
            if self.fail {
                return Err(CompileError::new(format!("{} failed", self.label)));
            }
            Ok(vec![RenderDiagnostic::new(
                "stdin",
                self.label,
                DiagnosticKind::Error,
                DiagnosticSource::new("x", Position::new(1, 1), Position::new(1, 2)),
            )])
        }
    }

    #[async_trait]
    impl Renderer for Labelled {
        async fn render(
            &self,
            _options: &CompilerOptions,
        ) -> Result<Vec<RenderDiagnostic>, CompileError> {
            self.async_calls.fetch_add(1, Ordering::SeqCst);
            self.output()
        }

        fn render_sync(
            &self,
            _options: &CompilerOptions,
        ) -> Result<Vec<RenderDiagnostic>, CompileError> {
            self.sync_calls.fetch_add(1, Ordering::SeqCst);
            self.output()
        }
    }

    #[derive(Default)]
    struct CountingExtractor {
        base_builds: AtomicUsize,
        undefined_builds: AtomicUsize,
    }

    impl DiagnosticExtractor for CountingExtractor {
        fn renderer(&self, _compiler: Arc<dyn Compiler>) -> Arc<dyn Renderer> {
            self.base_builds.fetch_add(1, Ordering::SeqCst);
            Arc::new(Labelled::new("base", false))
        }

        fn undefined_functions_renderer(
            &self,
            _compiler: Arc<dyn Compiler>,
            _options: &UndefinedFunctionsOptions,
        ) -> Arc<dyn Renderer> {
            self.undefined_builds.fetch_add(1, Ordering::SeqCst);
            Arc::new(Labelled::new("undefined", false))
        }
    }

    fn options() -> CompilerOptions {
        CompilerOptions::new(Map::new(), CompileInput::Content(String::new()))
    }

    fn disallow(names: &[&str]) -> UndefinedFunctionsOptions {
        UndefinedFunctionsOptions {
            disallowed_known_css_functions: names.iter().map(|s| s.to_string()).collect(),
            additional_known_css_functions: Vec::new(),
        }
    }

    #[test]
    fn test_renderers_are_memoized_per_compiler() {
        let cache = RendererCache::new();
        let extractor = CountingExtractor::default();
        let sass: Arc<dyn Compiler> = Arc::new(NullCompiler);
        let other: Arc<dyn Compiler> = Arc::new(NullCompiler);

        let first = cache.renderer(&sass, &extractor);
        let second = cache.renderer(&sass, &extractor);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(extractor.base_builds.load(Ordering::SeqCst), 1);

        cache.renderer(&other, &extractor);
        assert_eq!(extractor.base_builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_undefined_renderer_keyed_by_options() {
        let cache = RendererCache::new();
        let extractor = CountingExtractor::default();
        let sass: Arc<dyn Compiler> = Arc::new(NullCompiler);

        cache.undefined_functions_renderer(&sass, &extractor, &disallow(&["rem"]));
        cache.undefined_functions_renderer(&sass, &extractor, &disallow(&["rem"]));
        assert_eq!(extractor.undefined_builds.load(Ordering::SeqCst), 1);

        cache.undefined_functions_renderer(&sass, &extractor, &disallow(&["rem", "min"]));
        assert_eq!(extractor.undefined_builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_renderer_selection() {
        let cache = RendererCache::new();
        let extractor = CountingExtractor::default();
        let sass: Arc<dyn Compiler> = Arc::new(NullCompiler);

        assert_eq!(cache.renderers(&sass, &extractor, None).len(), 1);
        assert_eq!(
            cache
                .renderers(&sass, &extractor, Some(&disallow(&[])))
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_render_modes_concatenate_in_order() {
        let base = Arc::new(Labelled::new("base", false));
        let undefined = Arc::new(Labelled::new("undefined", false));
        let renderers: Vec<Arc<dyn Renderer>> = vec![base.clone(), undefined.clone()];

        for mode in [RenderMode::Async, RenderMode::Sync] {
            let messages: Vec<String> = render_all(&renderers, &options(), mode)
                .await
                .unwrap()
                .into_iter()
                .map(|d| d.message)
                .collect();
            assert_eq!(messages, vec!["base", "undefined"]);
        }

        assert_eq!(base.async_calls.load(Ordering::SeqCst), 1);
        assert_eq!(base.sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(undefined.async_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_any_failure_fails_the_invocation() {
        let renderers: Vec<Arc<dyn Renderer>> = vec![
            Arc::new(Labelled::new("base", false)),
            Arc::new(Labelled::new("undefined", true)),
        ];

        for mode in [RenderMode::Async, RenderMode::Sync] {
            let err = render_all(&renderers, &options(), mode).await.unwrap_err();
            assert_eq!(err.message, "undefined failed");
        }
    }
}
