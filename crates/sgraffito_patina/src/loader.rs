//! Filesystem-backed config module collaborators.
//!
//! Config modules are JSON or TOML documents. A specifier such as
//! `./config/sass` resolves to the first existing file among:
//!
//! - `./config/sass`
//! - `./config/sass.json`
//! - `./config/sass.toml`
//! - `./config/sass/index.json`
//! - `./config/sass/index.toml`
//!
//! Every specifier, bare ones included, is joined onto the base directory.
//! A bare specifier such as `my-sass-config` is therefore looked up next to
//! the package root, not inside `node_modules`.
//!
//! Both collaborators use blocking `std::fs` calls. Resolution and loading
//! are memoized per resolver, so the filesystem is touched once per config
//! module, and the loader stays usable without an async runtime (see
//! `SassRenderErrors::check_blocking`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ConfigSource, ModuleLoader, PackageLocator};
use crate::error::ConfigResolutionError;

/// Extensions tried when a specifier has none
const MODULE_EXTENSIONS: [&str; 2] = ["json", "toml"];

/// Finds package roots by walking up to a directory holding a marker file.
#[derive(Debug, Clone)]
pub struct FsPackageLocator {
    markers: Vec<String>,
}

impl FsPackageLocator {
    /// Use custom marker file names (e.g. `Cargo.toml`)
    pub fn with_markers(markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for FsPackageLocator {
    fn default() -> Self {
        Self::with_markers(["package.json"])
    }
}

impl PackageLocator for FsPackageLocator {
    fn find_package_root(&self, cwd: &Path) -> Option<PathBuf> {
        cwd.ancestors()
            .find(|dir| self.markers.iter().any(|marker| dir.join(marker).is_file()))
            .map(Path::to_path_buf)
    }

    fn resolve_from(&self, base: &Path, specifier: &str) -> Result<PathBuf, ConfigResolutionError> {
        let requested = base.join(specifier);
        module_candidates(&requested)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConfigResolutionError::ModuleNotFound {
                specifier: specifier.to_string(),
                base: base.to_path_buf(),
            })
    }
}

fn module_candidates(requested: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![requested.to_path_buf()];
    for extension in MODULE_EXTENSIONS {
        let mut with_extension = OsString::from(requested.as_os_str());
        with_extension.push(".");
        with_extension.push(extension);
        candidates.push(PathBuf::from(with_extension));
    }
    for extension in MODULE_EXTENSIONS {
        candidates.push(requested.join(format!("index.{}", extension)));
    }
    candidates
}

/// Loads JSON and TOML config modules as inline options.
///
/// Reads the file with blocking I/O on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModuleLoader;

#[async_trait]
impl ModuleLoader for FsModuleLoader {
    async fn load(&self, path: &Path) -> Result<ConfigSource, ConfigResolutionError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigResolutionError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parse_error = |message: String| ConfigResolutionError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::from_str::<Value>(&text).map_err(|e| parse_error(e.to_string()))?
            }
            Some("toml") => {
                let table =
                    toml::from_str::<toml::Table>(&text).map_err(|e| parse_error(e.to_string()))?;
                serde_json::to_value(table).map_err(|e| parse_error(e.to_string()))?
            }
            _ => {
                return Err(ConfigResolutionError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(ConfigSource::Inline(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_find_package_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("packages/ui/src");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("packages/ui/package.json"), "{}").unwrap();

        let locator = FsPackageLocator::default();
        assert_eq!(
            locator.find_package_root(&nested),
            Some(dir.path().join("packages/ui"))
        );

        let cargo = FsPackageLocator::with_markers(["Cargo.toml"]);
        assert_eq!(cargo.find_package_root(&nested), None);
    }

    #[test]
    fn test_resolve_tries_extensions_and_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config/theme")).unwrap();
        fs::write(dir.path().join("config/sass.toml"), "").unwrap();
        fs::write(dir.path().join("config/theme/index.json"), "{}").unwrap();

        let locator = FsPackageLocator::default();
        assert_eq!(
            locator.resolve_from(dir.path(), "./config/sass").unwrap(),
            dir.path().join("./config/sass.toml")
        );
        assert_eq!(
            locator.resolve_from(dir.path(), "./config/theme").unwrap(),
            dir.path().join("./config/theme").join("index.json")
        );

        let err = locator.resolve_from(dir.path(), "./nope").unwrap_err();
        assert!(err.to_string().starts_with("Cannot find module './nope' from"));
    }

    #[tokio::test]
    async fn test_load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("sass.json");
        let toml_path = dir.path().join("sass.toml");
        fs::write(&json_path, r#"{ "includePaths": ["loki"] }"#).unwrap();
        fs::write(&toml_path, "includePaths = [\"loki\"]\nprecision = 5\n").unwrap();

        for path in [json_path, toml_path] {
            let options = FsModuleLoader
                .load(&path)
                .await
                .unwrap()
                .resolve(&path)
                .await
                .unwrap();
            assert_eq!(options.get("includePaths"), Some(&json!(["loki"])));
        }
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        let yaml = dir.path().join("sass.yaml");
        fs::write(&broken, "{ nope").unwrap();
        fs::write(&yaml, "a: 1").unwrap();

        assert!(matches!(
            FsModuleLoader.load(&broken).await,
            Err(ConfigResolutionError::Parse { .. })
        ));
        assert!(matches!(
            FsModuleLoader.load(&yaml).await,
            Err(ConfigResolutionError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            FsModuleLoader.load(&dir.path().join("gone.json")).await,
            Err(ConfigResolutionError::Read { .. })
        ));
    }

    #[test]
    fn test_bare_specifier_resolves_from_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my-sass-config.json"), "{}").unwrap();

        let locator = FsPackageLocator::default();
        assert_eq!(
            locator.resolve_from(dir.path(), "my-sass-config").unwrap(),
            dir.path().join("my-sass-config.json")
        );
    }

    #[test]
    fn test_load_without_async_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sass.json");
        fs::write(&path, r#"{ "precision": 5 }"#).unwrap();

        let source = futures::executor::block_on(FsModuleLoader.load(&path)).unwrap();
        let options = futures::executor::block_on(source.resolve(&path)).unwrap();
        assert_eq!(options.get("precision"), Some(&json!(5)));
    }
}
