//! GitLab provider for gitlab-mcp.
//!
//! This crate provides the GitLab REST client, the MCP tools built on it
//! and the toolset catalog that groups them.

mod client;
pub mod tools;
pub mod toolsets;
pub mod types;

pub use client::GitLabClient;
pub use tools::{static_client, GetClientFn};
pub use toolsets::{build_toolsets, init_toolsets, DEFAULT_TOOLSETS};

/// Default GitLab instance.
pub const DEFAULT_GITLAB_URL: &str = gitlab_mcp_core::config::DEFAULT_GITLAB_HOST;
