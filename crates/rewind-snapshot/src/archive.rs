//! Gzip-compressed tar archives of project files.
//!
//! These functions block; callers run them on the blocking pool.

use crate::{CheckpointError, CheckpointResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rewind_util::path::to_slash;
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tar::{Archive, Builder};
use tracing::debug;

/// File name of the archive inside a snapshot directory.
pub const ARCHIVE_FILE: &str = "files.tar.gz";

/// Archive `files` (relative to `root`) into `dest`.
///
/// Returns the summed on-disk size of the archived files.
pub fn write_archive(root: &Path, files: &[String], dest: &Path) -> io::Result<u64> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut total_size = 0u64;
    for relative in files {
        let source = root.join(relative);
        total_size += std::fs::metadata(&source)?.len();
        builder.append_path_with_name(&source, relative)?;
    }

    let encoder = builder.into_inner()?;
    let file = encoder.finish()?;
    file.sync_all()?;

    debug!(dest = %dest.display(), files = files.len(), total_size, "Wrote archive");
    Ok(total_size)
}

/// Unpack `archive` into `dest`, checking every expected file came out.
///
/// Any failure, including entries escaping `dest`, is reported as
/// [`CheckpointError::ArchiveCorruption`].
pub fn unpack_archive(archive: &Path, dest: &Path, expected_files: &[String]) -> CheckpointResult<()> {
    let file = File::open(archive)
        .map_err(|e| CheckpointError::corrupted(format!("{}: {}", archive.display(), e)))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut unpacked = HashSet::new();
    let entries = archive.entries().map_err(corrupted)?;
    for entry in entries {
        let mut entry = entry.map_err(corrupted)?;
        let path = entry.path().map_err(corrupted)?.into_owned();
        if !entry.unpack_in(dest).map_err(corrupted)? {
            return Err(CheckpointError::corrupted(format!(
                "entry escapes the project root: {}",
                path.display()
            )));
        }
        unpacked.insert(to_slash(&path));
    }

    if let Some(missing) = expected_files.iter().find(|f| !unpacked.contains(*f)) {
        return Err(CheckpointError::corrupted(format!(
            "missing file in archive: {}",
            missing
        )));
    }

    debug!(dest = %dest.display(), entries = unpacked.len(), "Unpacked archive");
    Ok(())
}

fn corrupted(e: io::Error) -> CheckpointError {
    CheckpointError::corrupted(e.to_string())
}
