//! Text rendering shared by the CLI and the MCP tools.

use chrono::{DateTime, Local, Utc};
use rewind_snapshot::{
    format_size, ChangelogEntry, CheckpointError, CreatedCheckpoint, Manifest, RestoreOutcome,
    RestorePreview, RestoredCheckpoint, SetupReport, CHECKPOINT_DIR, IGNORE_FILE,
};
use std::fmt::Write;

/// Timestamp in the local timezone.
pub fn local_time(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn setup_report(report: &SetupReport) -> String {
    let mut out = String::from("Checkpoint setup complete\n\n");
    let _ = writeln!(out, "  Checkpoint directory: {CHECKPOINT_DIR}/");
    let _ = writeln!(
        out,
        "  {IGNORE_FILE}: {}",
        if report.ignore_file_updated {
            "updated"
        } else {
            "already up to date"
        }
    );
    let _ = writeln!(
        out,
        "  Configuration: {}",
        if report.config_created {
            "created with defaults"
        } else {
            "kept"
        }
    );
    if let Some(name) = &report.initial_checkpoint {
        let _ = writeln!(out, "  Initial checkpoint: {name}");
    }
    out
}

pub fn created(created: &CreatedCheckpoint) -> String {
    format!(
        "Checkpoint created: {}\n  Files: {}\n  Size: {}\n  Description: {}\n",
        created.name,
        created.file_count,
        created.size,
        created.description.as_deref().unwrap_or("Manual checkpoint"),
    )
}

/// Numbered checkpoint listing, newest first.
pub fn checkpoint_list(checkpoints: &[Manifest], empty_hint: &str) -> String {
    if checkpoints.is_empty() {
        return format!("No checkpoints found. {empty_hint}\n");
    }

    let mut out = format!("Available checkpoints ({}):\n\n", checkpoints.len());
    for (index, checkpoint) in checkpoints.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, checkpoint.name);
        let _ = writeln!(out, "   {}", checkpoint.display_description());
        let _ = writeln!(
            out,
            "   {} | {} files | {}\n",
            local_time(&checkpoint.timestamp),
            checkpoint.file_count,
            format_size(checkpoint.total_size)
        );
    }
    out
}

/// Changelog entries, newest first. With a `limit`, the remainder is
/// summarized in one line.
pub fn changelog(entries: &[ChangelogEntry], limit: Option<usize>) -> String {
    if entries.is_empty() {
        return "No development history found.\n".to_string();
    }

    let shown = limit.unwrap_or(entries.len()).min(entries.len());
    let mut out = format!("Development history ({} entries):\n\n", entries.len());
    for (index, entry) in entries.iter().take(shown).enumerate() {
        let _ = writeln!(
            out,
            "{}. {} - {}",
            index + 1,
            entry.action,
            local_time(&entry.timestamp)
        );
        let _ = writeln!(out, "   {}", entry.description);
        if let Some(details) = &entry.details {
            let _ = writeln!(out, "   {details}");
        }
        out.push('\n');
    }

    if entries.len() > shown {
        let _ = writeln!(
            out,
            "... and {} more entries. Run `rewind changelog` for the full history.",
            entries.len() - shown
        );
    }
    out
}

pub fn restore_outcome(outcome: &RestoreOutcome) -> String {
    match outcome {
        RestoreOutcome::Preview(preview) => restore_preview(preview),
        RestoreOutcome::Restored(restored) => restored_checkpoint(restored),
    }
}

fn restore_preview(preview: &RestorePreview) -> String {
    let checkpoint = &preview.checkpoint;
    let mut out = format!("Dry run: would restore {}\n", checkpoint.name);
    let _ = writeln!(out, "  Description: {}", checkpoint.display_description());
    let _ = writeln!(out, "  Date: {}", local_time(&checkpoint.timestamp));
    let _ = writeln!(out, "  Files: {}", checkpoint.file_count);

    if !preview.files_to_delete.is_empty() {
        let _ = writeln!(
            out,
            "  Would delete {} files not in the checkpoint:",
            preview.files_to_delete.len()
        );
        for path in &preview.files_to_delete {
            let _ = writeln!(out, "    {path}");
        }
    }
    out
}

fn restored_checkpoint(restored: &RestoredCheckpoint) -> String {
    let mut out = String::from("Checkpoint restored\n");
    match &restored.emergency_backup {
        Some(backup) => {
            let _ = writeln!(out, "  Emergency backup: {backup}");
        }
        None => out.push_str("  Emergency backup: none (no files to back up)\n"),
    }
    let _ = writeln!(out, "  Restored: {}", restored.restored);
    let _ = writeln!(out, "  Files restored: {}", restored.file_count);
    if restored.files_deleted > 0 {
        let _ = writeln!(out, "  Files removed: {}", restored.files_deleted);
    }
    out
}

/// User-facing text for a failed operation.
pub fn error(err: &CheckpointError) -> String {
    match err {
        CheckpointError::NotFound {
            identifier,
            candidates,
        } => {
            let mut out = format!("Checkpoint not found: {identifier}\n");
            if candidates.is_empty() {
                out.push_str("\nNo checkpoints available.");
            } else {
                out.push_str("\nAvailable checkpoints:");
                for name in candidates {
                    let _ = write!(out, "\n  - {name}");
                }
            }
            out
        }
        CheckpointError::NoFilesFound => "No files found to checkpoint. Make sure you are in a \
             project directory and that not every file is ignored."
            .to_string(),
        other => other.to_string(),
    }
}
