//! Tool registry and MCP server for gitlab-mcp.
//!
//! Tools are grouped into [`Toolset`]s owned by a [`ToolsetGroup`]. At
//! startup the enabled toolsets hand their tools to an [`McpServer`], which
//! serves them over stdio.

pub mod protocol;
pub mod server;
pub mod tool;
pub mod toolsets;
pub mod transport;

pub use protocol::{ToolCallResult, ToolDefinition};
pub use server::McpServer;
pub use tool::{handler_fn, with_pagination, ServerTool, ToolHandler, ToolSink};
pub use toolsets::{Toolset, ToolsetGroup, ALL_TOOLSETS};
