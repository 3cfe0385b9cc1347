//! Checkpoint command handlers.

use crate::render;
use rewind_snapshot::changelog::ACTION_CODE_CHANGE;
use rewind_snapshot::{CheckpointError, CheckpointManager};

/// Turn a checkpoint error into a command failure with readable text.
fn fail(err: CheckpointError) -> anyhow::Error {
    anyhow::anyhow!(render::error(&err))
}

/// Initialize checkpointing in the project.
pub async fn handle_setup(manager: &CheckpointManager) -> anyhow::Result<()> {
    let report = manager.setup().await.map_err(fail)?;
    print!("{}", render::setup_report(&report));
    Ok(())
}

/// Snapshot the project.
pub async fn handle_create(
    manager: &CheckpointManager,
    name: Option<String>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let created = manager
        .create(name.as_deref(), description.as_deref())
        .await
        .map_err(fail)?;
    print!("{}", render::created(&created));
    Ok(())
}

pub async fn handle_list(manager: &CheckpointManager) -> anyhow::Result<()> {
    let checkpoints = manager.get_checkpoints().await.map_err(fail)?;
    print!(
        "{}",
        render::checkpoint_list(&checkpoints, "Create one with `rewind create`.")
    );
    Ok(())
}

/// Restore a checkpoint by full or partial name.
pub async fn handle_restore(
    manager: &CheckpointManager,
    checkpoint: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let outcome = manager.restore(checkpoint, dry_run).await.map_err(fail)?;
    print!("{}", render::restore_outcome(&outcome));
    if dry_run {
        println!("\nRun without --dry-run to proceed.");
    }
    Ok(())
}

/// Print the full changelog.
pub async fn handle_changelog(manager: &CheckpointManager) -> anyhow::Result<()> {
    let entries = manager.get_changelog().await;
    print!("{}", render::changelog(&entries, None));
    Ok(())
}

/// Record a custom changelog entry.
pub async fn handle_log(
    manager: &CheckpointManager,
    description: &str,
    details: Option<String>,
    action: Option<String>,
) -> anyhow::Result<()> {
    if description.trim().is_empty() {
        anyhow::bail!("Description is required for a changelog entry");
    }

    manager.ensure_directories().await.map_err(fail)?;
    let action = action.unwrap_or_else(|| ACTION_CODE_CHANGE.to_string());
    manager
        .log_to_changelog(&action, description, details.as_deref())
        .await;
    println!("Changelog entry added: {description}");
    Ok(())
}
