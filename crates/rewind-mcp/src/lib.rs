//! Model Context Protocol (MCP) server for rewind.
//!
//! Exposes checkpoint operations as MCP tools to an assistant over stdio.
//!
//! ```text
//! ┌─────────────┐   JSON-RPC over stdio   ┌─────────────┐
//! │ MCP client  │ ◄─────────────────────► │  McpServer  │
//! └─────────────┘                         └─────────────┘
//!                                                │
//!                                                ▼
//!                                         McpServerTool executors
//! ```
//!
//! # Example
//!
//! ```no_run
//! use rewind_mcp::{ClosureExecutor, McpServer, McpServerToolBuilder};
//!
//! # async fn example() -> rewind_mcp::McpResult<()> {
//! let ping = McpServerToolBuilder::new("ping")
//!     .description("Reply with pong")
//!     .build(ClosureExecutor::new(|_args| Ok("pong".to_string())));
//!
//! McpServer::new("rewind", "0.1.0")
//!     .with_tool(ping)
//!     .serve_stdio()
//!     .await
//! # }
//! ```

mod error;
pub mod protocol;
mod server;
mod tool;

pub use error::{McpError, McpResult};
pub use protocol::{McpTool, ToolCallResult, ToolContent};
pub use server::McpServer;
pub use tool::{ClosureExecutor, McpServerTool, McpServerToolBuilder, McpToolExecutor};
