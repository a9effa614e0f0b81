//! Lint target identity and style-file classification.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Identifier used for content that is not backed by a file, both for the
/// lint target and by compilers reporting on in-memory content.
pub const STDIN_SENTINEL: &str = "stdin";

/// Extensions of files the compiler can read directly
pub const STYLE_FILE_EXTENSIONS: [&str; 3] = [".scss", ".sass", ".css"];

/// The file currently under lint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetFile {
    /// Content piped in without a backing file
    Stdin,
    /// Content read from (or extracted out of) a file on disk
    Path(PathBuf),
}

impl TargetFile {
    /// Build from a host identifier. Empty strings and `"stdin"` map to
    /// [`TargetFile::Stdin`].
    pub fn parse(identifier: &str) -> Self {
        if identifier.is_empty() || identifier == STDIN_SENTINEL {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(identifier))
        }
    }

    /// The backing path, if any
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::Path(path) => Some(path),
        }
    }

    /// The identifier diagnostics are compared against
    pub fn identifier(&self) -> Cow<'_, str> {
        match self {
            Self::Stdin => Cow::Borrowed(STDIN_SENTINEL),
            Self::Path(path) => path.to_string_lossy(),
        }
    }

    /// Whether the target is a standalone stylesheet the compiler can read
    /// by path. Extracted fragments (e.g. `<style>` blocks of a `.vue` file)
    /// and stdin content are not.
    pub fn is_style_file(&self) -> bool {
        match self {
            Self::Stdin => false,
            Self::Path(path) => has_style_extension(path),
        }
    }
}

impl From<Option<PathBuf>> for TargetFile {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdin, Self::Path)
    }
}

/// Classify a host identifier. Extension matching is exact and
/// case-sensitive.
#[inline]
pub fn is_style_file(identifier: &str) -> bool {
    TargetFile::parse(identifier).is_style_file()
}

fn has_style_extension(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    STYLE_FILE_EXTENSIONS
        .iter()
        .any(|known| known.strip_prefix('.') == Some(extension))
}
