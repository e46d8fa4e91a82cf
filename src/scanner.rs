//! Declaration scanning: walk source roots and derive declaration names.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::SourceRoot;
use crate::error::Error;
use crate::types::DeclName;

/// Derive a fully-qualified declaration name from a namespace prefix and a
/// root-relative source path.
///
/// Rules: the file extension is stripped, path separators become `.`, and
/// the result is prefixed with `namespace` (itself stripped of any leading
/// or trailing `.`). `app.repository` + `Default/FooRepositoryInterface.php`
/// yields `app.repository.Default.FooRepositoryInterface`.
pub fn declaration_name(namespace: &str, relative_path: &Path) -> DeclName {
    let stripped = relative_path.with_extension("");
    let mut segments: Vec<String> = Vec::new();

    let prefix = namespace.trim_matches('.');
    if !prefix.is_empty() {
        segments.push(prefix.to_string());
    }
    for component in stripped.components() {
        segments.push(component.as_os_str().to_string_lossy().into_owned());
    }

    return DeclName(segments.join("."));
}

/// Check a candidate file against the root's exclude patterns.
/// A pattern may match the bare file name or the root-relative path;
/// the first matching pattern excludes.
fn is_excluded(patterns: &[glob::Pattern], relative: &Path) -> bool {
    let file_name = relative
        .file_name()
        .map(|n| return n.to_string_lossy().into_owned())
        .unwrap_or_default();

    return patterns
        .iter()
        .any(|p| return p.matches(&file_name) || p.matches_path(relative));
}

/// Enumerate candidate declarations under one source root.
///
/// Walks every regular file with the given source extension, skipping
/// excluded paths, and derives each declaration name from the root's
/// namespace prefix. Each call is a fresh traversal; ordering follows the
/// filesystem and is deterministic within a run but not across platforms,
/// so callers must not depend on it for correctness.
///
/// # Errors
///
/// Returns `Error::Scan` if the root path does not exist or is not a
/// directory (the orchestrator aborts only this root, not the whole run),
/// or `Error::ConfigInvalid` if an exclude pattern is not a valid glob.
pub fn scan(root: &SourceRoot, extension: &str) -> Result<Vec<DeclName>, Error> {
    if !root.path.is_dir() {
        return Err(Error::Scan {
            path: root.path.clone(),
            reason: "not a readable directory".to_string(),
        });
    }

    let mut patterns = Vec::with_capacity(root.exclude.len());
    for pattern in &root.exclude {
        let compiled = glob::Pattern::new(pattern).map_err(|e| {
            return Error::ConfigInvalid {
                reason: format!("bad exclude pattern `{pattern}`: {e}"),
            };
        })?;
        patterns.push(compiled);
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(&root.path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == extension))
    {
        let path = entry.path();
        let relative = path.strip_prefix(&root.path).unwrap_or(path);
        if is_excluded(&patterns, relative) {
            continue;
        }
        names.push(declaration_name(&root.namespace, relative));
    }

    return Ok(names);
}
