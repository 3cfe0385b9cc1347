//! MCP server exposing checkpoint operations as tools.

use crate::render;
use async_trait::async_trait;
use rewind_mcp::{McpServer, McpServerToolBuilder, McpToolExecutor};
use rewind_snapshot::changelog::ACTION_CODE_CHANGE;
use rewind_snapshot::CheckpointManager;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Changelog entries returned by `get_changelog`.
pub const MCP_CHANGELOG_LIMIT: usize = 10;

/// Serve the checkpoint tools over stdio until the client disconnects.
pub async fn run_mcp_server(manager: Arc<CheckpointManager>) -> anyhow::Result<()> {
    info!(root = %manager.project_root().display(), "Starting checkpoint MCP server");
    build_mcp_server(manager).serve_stdio().await?;
    Ok(())
}

/// Register every checkpoint tool on a new server.
pub fn build_mcp_server(manager: Arc<CheckpointManager>) -> McpServer {
    McpServer::new("rewind", env!("CARGO_PKG_VERSION"))
        .with_tool(
            McpServerToolBuilder::new("setup_checkpoints")
                .description(
                    "Set up checkpoints in the current project: creates the .checkpoints \
                     directory, adds it to .gitignore and takes an initial checkpoint",
                )
                .build(SetupTool(manager.clone())),
        )
        .with_tool(
            McpServerToolBuilder::new("create_checkpoint")
                .description("Create a new checkpoint of the current codebase")
                .parameters(json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Optional custom name for the checkpoint"
                        },
                        "description": {
                            "type": "string",
                            "description": "Description of what this checkpoint represents"
                        }
                    }
                }))
                .build(CreateTool(manager.clone())),
        )
        .with_tool(
            McpServerToolBuilder::new("list_checkpoints")
                .description("List all available checkpoints in the current project")
                .build(ListTool(manager.clone())),
        )
        .with_tool(
            McpServerToolBuilder::new("restore_checkpoint")
                .description("Restore a previous checkpoint (creates an emergency backup first)")
                .parameters(json!({
                    "type": "object",
                    "properties": {
                        "checkpoint": {
                            "type": "string",
                            "description": "Name or partial name of the checkpoint to restore"
                        },
                        "dry_run": {
                            "type": "boolean",
                            "description": "Preview changes without actually restoring",
                            "default": false
                        }
                    },
                    "required": ["checkpoint"]
                }))
                .build(RestoreTool(manager.clone())),
        )
        .with_tool(
            McpServerToolBuilder::new("get_changelog")
                .description("Get the history of checkpoint and code change activity")
                .build(GetChangelogTool(manager.clone())),
        )
        .with_tool(
            McpServerToolBuilder::new("set_changelog")
                .description("Add a custom entry to the development history")
                .parameters(json!({
                    "type": "object",
                    "properties": {
                        "description": {
                            "type": "string",
                            "description": "Brief description of what changes were made"
                        },
                        "details": {
                            "type": "string",
                            "description": "Optional detailed explanation of the changes"
                        },
                        "action_type": {
                            "type": "string",
                            "description": "Type of action (e.g., REFACTOR, ADD_FEATURE, BUG_FIX, OPTIMIZATION)",
                            "default": ACTION_CODE_CHANGE
                        }
                    },
                    "required": ["description"]
                }))
                .build(SetChangelogTool(manager)),
        )
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, String> {
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments: {e}"))
}

struct SetupTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for SetupTool {
    async fn execute(&self, _args: Value) -> Result<String, String> {
        let report = self.0.setup().await.map_err(|e| render::error(&e))?;
        Ok(render::setup_report(&report))
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateArgs {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

struct CreateTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for CreateTool {
    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: CreateArgs = parse_args(args)?;
        let created = self
            .0
            .create(args.name.as_deref(), args.description.as_deref())
            .await
            .map_err(|e| render::error(&e))?;
        Ok(render::created(&created))
    }
}

struct ListTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for ListTool {
    async fn execute(&self, _args: Value) -> Result<String, String> {
        let checkpoints = self.0.get_checkpoints().await.map_err(|e| render::error(&e))?;
        Ok(render::checkpoint_list(
            &checkpoints,
            "Create your first checkpoint with create_checkpoint.",
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RestoreArgs {
    checkpoint: String,
    #[serde(default)]
    dry_run: bool,
}

struct RestoreTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for RestoreTool {
    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: RestoreArgs = parse_args(args)?;
        let outcome = self
            .0
            .restore(&args.checkpoint, args.dry_run)
            .await
            .map_err(|e| render::error(&e))?;

        let mut text = render::restore_outcome(&outcome);
        if args.dry_run {
            text.push_str("\nUse restore_checkpoint without dry_run to proceed.");
        }
        Ok(text)
    }
}

struct GetChangelogTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for GetChangelogTool {
    async fn execute(&self, _args: Value) -> Result<String, String> {
        let entries = self.0.get_changelog().await;
        Ok(render::changelog(&entries, Some(MCP_CHANGELOG_LIMIT)))
    }
}

#[derive(Debug, Deserialize)]
struct SetChangelogArgs {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    action_type: Option<String>,
}

struct SetChangelogTool(Arc<CheckpointManager>);

#[async_trait]
impl McpToolExecutor for SetChangelogTool {
    async fn execute(&self, args: Value) -> Result<String, String> {
        let args: SetChangelogArgs = parse_args(args)?;
        let description = args
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| "Description is required for a changelog entry".to_string())?;
        let action = args
            .action_type
            .unwrap_or_else(|| ACTION_CODE_CHANGE.to_string());

        self.0
            .ensure_directories()
            .await
            .map_err(|e| render::error(&e))?;
        self.0
            .log_to_changelog(&action, &description, args.details.as_deref())
            .await;
        Ok(format!("Changelog entry added: {description}"))
    }
}
