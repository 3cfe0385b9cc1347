//! Project tree walking.
//!
//! Blocking; run on the blocking pool.

use crate::IgnoreMatcher;
use rewind_util::path::to_slash;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// `/`-separated path of `entry` under `root`; `None` unless valid UTF-8.
fn relative(entry: &DirEntry, root: &Path) -> Option<String> {
    let rel = entry.path().strip_prefix(root).ok()?;
    Some(to_slash(Path::new(rel.to_str()?)))
}

fn is_ignored(entry: &DirEntry, root: &Path, matcher: &IgnoreMatcher) -> bool {
    match relative(entry, root) {
        Some(rel) => matcher.is_ignored(&rel, entry.file_type().is_dir()),
        None => {
            warn!(path = %entry.path().display(), "Skipping non-UTF-8 path");
            true
        }
    }
}

/// List every non-ignored regular file under `root`.
///
/// Ignored directories are pruned rather than descended. Symlinks are
/// neither followed nor listed. Paths that are not valid UTF-8 are skipped
/// with a warning. Paths are `/`-separated and sorted.
///
/// Fails on the first directory that cannot be read, so a snapshot never
/// silently misses part of the tree.
pub fn enumerate(root: &Path, matcher: &IgnoreMatcher) -> io::Result<Vec<String>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry, root, matcher));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(rel) = relative(&entry, root) {
            files.push(rel);
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "Enumerated project files");
    Ok(files)
}

/// Remove empty directories under `root`, deepest first.
///
/// Never removes `root` itself, `protected`, or anything inside an ignored
/// directory. Returns the number of directories removed.
pub fn cleanup_empty_directories(root: &Path, matcher: &IgnoreMatcher, protected: &Path) -> usize {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_entry(|entry| entry.path() != protected && !is_ignored(entry, root, matcher));

    let mut removed = 0;
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let is_empty = std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }
        match std::fs::remove_dir(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed empty directory");
                removed += 1;
            }
            Err(e) => debug!(path = %path.display(), error = %e, "Could not remove directory"),
        }
    }

    removed
}
