//! Path utilities.
//!
//! Snapshot manifests and ignore rules work on project-relative paths with
//! forward slashes, regardless of platform.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => {
                result.push(component);
            }
        }
    }

    result
}

/// Make a path relative to a base directory.
///
/// Relative inputs are returned normalized. Returns `None` if an absolute
/// path is not within the base directory.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        normalize(path)
            .strip_prefix(normalize(base))
            .ok()
            .map(|p| p.to_path_buf())
    } else {
        Some(normalize(path))
    }
}

/// Render a relative path with `/` separators.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `path` relative to `base`, rendered with `/` separators.
pub fn relative_slash(path: &Path, base: &Path) -> Option<String> {
    relative_to(path, base).map(|p| to_slash(&p))
}
