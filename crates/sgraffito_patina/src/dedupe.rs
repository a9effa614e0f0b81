//! Diagnostic deduplication and file filtering.

use sgraffito_carton::FxHashSet;

use crate::diagnostic::RenderDiagnostic;
use crate::target::{TargetFile, STDIN_SENTINEL};

/// Identity of a diagnostic: its JSON serialization without the stack.
pub fn identity_key(diagnostic: &RenderDiagnostic) -> String {
    let mut key = serde_json::to_value(diagnostic).unwrap_or_default();
    if let Some(object) = key.as_object_mut() {
        object.remove("stack");
    }
    key.to_string()
}

/// Drop repeated diagnostics. The first occurrence wins and keeps its
/// position.
pub fn unique(diagnostics: Vec<RenderDiagnostic>) -> Vec<RenderDiagnostic> {
    let mut seen = FxHashSet::default();
    diagnostics
        .into_iter()
        .filter(|diagnostic| seen.insert(identity_key(diagnostic)))
        .collect()
}

/// The file a diagnostic is attributed to. In-memory diagnostics take the
/// path the content was extracted from, when one is known.
#[inline]
pub fn attributed_file<'a>(diagnostic: &'a RenderDiagnostic, recorded: Option<&'a str>) -> &'a str {
    match recorded {
        Some(path) if diagnostic.file == STDIN_SENTINEL => path,
        _ => diagnostic.file.as_str(),
    }
}

/// Whether `diagnostic` belongs to `target`
pub fn belongs_to(diagnostic: &RenderDiagnostic, target: &TargetFile, recorded: Option<&str>) -> bool {
    attributed_file(diagnostic, recorded) == target.identifier()
}

/// Keep only the diagnostics that belong to `target`
pub fn retain_for_file(
    diagnostics: Vec<RenderDiagnostic>,
    target: &TargetFile,
    recorded: Option<&str>,
) -> Vec<RenderDiagnostic> {
    let total = diagnostics.len();
    let kept: Vec<_> = diagnostics
        .into_iter()
        .filter(|diagnostic| belongs_to(diagnostic, target, recorded))
        .collect();
    if kept.len() < total {
        tracing::debug!(
            "dropped {} diagnostic(s) for other files than {}",
            total - kept.len(),
            target.identifier()
        );
    }
    kept
}
