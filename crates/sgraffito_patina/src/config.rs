//! Compilation option resolution.
//!
//! Turns a `sassOptions` value into the [`CompilerOptions`] for one lint
//! invocation. Module specifiers are resolved from the nearest package root
//! above the working directory and imported through a [`ModuleLoader`].
//! Both steps are memoized for the lifetime of the resolver; edits to a
//! config module are not picked up until [`OptionsResolver::clear`] is
//! called.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use sgraffito_carton::MemoCache;

use crate::compiler::{CompileInput, CompilerOptions};
use crate::error::ConfigResolutionError;
use crate::loader::{FsModuleLoader, FsPackageLocator};
use crate::options::{json_kind, SassOptionsValue};
use crate::target::TargetFile;

/// Result of running a config factory
pub type FactoryResult = Result<Value, ConfigResolutionError>;

type SyncFactory = dyn Fn() -> FactoryResult + Send + Sync;
type AsyncFactory = dyn Fn() -> BoxFuture<'static, FactoryResult> + Send + Sync;

/// What an imported config module provides.
#[derive(Clone)]
pub enum ConfigSource {
    /// A plain options value
    Inline(Value),
    /// A function producing the options
    Factory(Arc<SyncFactory>),
    /// An async function producing the options
    AsyncFactory(Arc<AsyncFactory>),
}

impl ConfigSource {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> FactoryResult + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    pub fn async_factory<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FactoryResult> + Send + 'static,
    {
        Self::AsyncFactory(Arc::new(move || -> BoxFuture<'static, FactoryResult> {
            Box::pin(factory())
        }))
    }

    /// Produce the options object, invoking the factory if there is one.
    ///
    /// `origin` names the module in error messages.
    pub async fn resolve(&self, origin: &Path) -> Result<Map<String, Value>, ConfigResolutionError> {
        let value = match self {
            Self::Inline(value) => value.clone(),
            Self::Factory(factory) => factory()?,
            Self::AsyncFactory(factory) => factory().await?,
        };
        match value {
            Value::Object(map) => Ok(map),
            other => Err(ConfigResolutionError::NotAnObject {
                path: origin.to_path_buf(),
                kind: json_kind(&other),
            }),
        }
    }
}

impl fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(value) => f.debug_tuple("Inline").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::AsyncFactory(_) => f.write_str("AsyncFactory(..)"),
        }
    }
}

/// Imports a resolved config module.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<ConfigSource, ConfigResolutionError>;
}

/// Locates package roots and resolves module specifiers.
pub trait PackageLocator: Send + Sync {
    /// Directory of the nearest package at or above `cwd`
    fn find_package_root(&self, cwd: &Path) -> Option<PathBuf>;

    /// Resolve `specifier` relative to `base` to an absolute module path
    fn resolve_from(&self, base: &Path, specifier: &str) -> Result<PathBuf, ConfigResolutionError>;
}

/// Compiler options for one invocation plus the file diagnostics should be
/// attributed to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub options: CompilerOptions,
    /// Real path of the lint target; `None` for stdin content
    pub attributed_file: Option<String>,
}

/// Resolves `sassOptions` values into compiler options.
pub struct OptionsResolver {
    cwd: PathBuf,
    locator: Arc<dyn PackageLocator>,
    loader: Arc<dyn ModuleLoader>,
    /// (cwd, specifier) -> resolved module path
    locations: MemoCache<(PathBuf, String), PathBuf>,
    /// resolved module path -> options object
    imports: MemoCache<PathBuf, Arc<Map<String, Value>>>,
}

impl OptionsResolver {
    /// Create a resolver rooted at the process working directory
    pub fn new(locator: Arc<dyn PackageLocator>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            locator,
            loader,
            locations: MemoCache::new(),
            imports: MemoCache::new(),
        }
    }

    /// Create a resolver backed by the filesystem
    pub fn filesystem() -> Self {
        Self::new(
            Arc::new(FsPackageLocator::default()),
            Arc::new(FsModuleLoader),
        )
    }

    /// Override the working directory specifiers are resolved from
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    #[inline]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Build the compiler options for a lint target.
    pub async fn resolve(
        &self,
        target: &TargetFile,
        content: &str,
        value: &SassOptionsValue,
    ) -> Result<ResolvedOptions, ConfigResolutionError> {
        let base = self.base_options(value).await?;

        let input = match target.path() {
            Some(path) if target.is_style_file() => CompileInput::File(path.to_path_buf()),
            _ => CompileInput::Content(content.to_string()),
        };
        let attributed_file = target
            .path()
            .map(|path| path.to_string_lossy().into_owned());

        Ok(ResolvedOptions {
            options: CompilerOptions::new(base, input),
            attributed_file,
        })
    }

    /// The options object a `sassOptions` value stands for
    pub async fn base_options(
        &self,
        value: &SassOptionsValue,
    ) -> Result<Map<String, Value>, ConfigResolutionError> {
        match value {
            SassOptionsValue::Inline(map) => Ok(map.clone()),
            SassOptionsValue::Module(specifier) => {
                let location = self.config_location(specifier)?;
                let imported = self.import_config(&location).await?;
                Ok(imported.as_ref().clone())
            }
        }
    }

    /// Resolve a module specifier from the nearest package root (memoized)
    pub fn config_location(&self, specifier: &str) -> Result<PathBuf, ConfigResolutionError> {
        let key = (self.cwd.clone(), specifier.to_string());
        self.locations.get_or_try_insert_with(key, || {
            let base = self
                .locator
                .find_package_root(&self.cwd)
                .unwrap_or_else(|| fallback_base(&self.cwd));
            let location = self.locator.resolve_from(&base, specifier)?;
            tracing::debug!(
                "resolved sass options module {} to {}",
                specifier,
                location.display()
            );
            Ok(location)
        })
    }

    /// Import a resolved config module (memoized by path)
    pub async fn import_config(
        &self,
        location: &Path,
    ) -> Result<Arc<Map<String, Value>>, ConfigResolutionError> {
        self.imports
            .get_or_try_insert_async(location.to_path_buf(), || async {
                tracing::debug!("importing sass options from {}", location.display());
                let source = self.loader.load(location).await?;
                let options = source.resolve(location).await?;
                Ok(Arc::new(options))
            })
            .await
    }

    /// Number of memoized (locations, imports)
    pub fn cached(&self) -> (usize, usize) {
        (self.locations.len(), self.imports.len())
    }

    /// Forget every memoized location and import
    pub fn clear(&self) {
        self.locations.clear();
        self.imports.clear();
    }
}

/// Base directory when no package root exists: the directory holding `cwd`,
/// or `cwd` itself at the filesystem root.
fn fallback_base(cwd: &Path) -> PathBuf {
    cwd.parent().unwrap_or(cwd).to_path_buf()
}

impl fmt::Debug for OptionsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsResolver")
            .field("cwd", &self.cwd)
            .field("locations", &self.locations)
            .field("imports", &self.imports)
            .finish()
    }
}
