//! MCP tools backed by the GitLab REST API.
//!
//! Each constructor returns a [`ServerTool`](gitlab_mcp::ServerTool) whose
//! handler parses its arguments with [`gitlab_mcp_core::params`], calls
//! [`GitLabClient`] and returns the upstream JSON as text.

use std::sync::Arc;

use gitlab_mcp::ToolCallResult;
use gitlab_mcp_core::params::{self, Arguments};
use gitlab_mcp_core::{Error, ParamError, Result};
use serde::Serialize;

use crate::GitLabClient;

pub mod issues;
pub mod merge_requests;
pub mod projects;
pub mod repository;

/// Hands out a configured client on demand.
///
/// Tools hold this instead of a client so construction can be deferred or
/// swapped (tests point it at a mock server).
pub type GetClientFn = Arc<dyn Fn() -> Result<Arc<GitLabClient>> + Send + Sync>;

/// Wrap a ready client as a [`GetClientFn`].
pub fn static_client(client: GitLabClient) -> GetClientFn {
    let client = Arc::new(client);
    Arc::new(move || -> Result<Arc<GitLabClient>> { Ok(client.clone()) })
}

const PROJECT_ID_DESCRIPTION: &str =
    "The ID (integer) or URL-encoded path (string) of the project.";

/// Serialize an upstream result for the caller.
///
/// A 404 becomes a tool error built by `not_found`; every other failure
/// propagates.
fn json_result<T: Serialize>(
    result: Result<T>,
    not_found: impl FnOnce() -> String,
) -> Result<ToolCallResult> {
    match result {
        Ok(value) => Ok(ToolCallResult::text(serde_json::to_string(&value)?)),
        Err(Error::NotFound(_)) => Ok(ToolCallResult::error(format!(
            "{} (404)",
            not_found()
        ))),
        Err(err) => Err(err),
    }
}

/// Read a required internal ID (issue or merge request IID).
///
/// IIDs are declared as JSON numbers, so they arrive as floats and must be
/// whole and positive.
fn required_iid(args: &Arguments, name: &str) -> std::result::Result<u64, ParamError> {
    let value: f64 = params::required_value(args, name)?;
    if value.fract() != 0.0 {
        return Err(ParamError::NotWholeNumber {
            name: name.to_string(),
            value,
        });
    }
    if value < 0.0 || value > u64::MAX as f64 {
        return Err(ParamError::NotConvertible {
            name: name.to_string(),
            actual: "negative or out-of-range number",
        });
    }
    Ok(value as u64)
}

/// Optional string filter; empty means unset.
fn optional_string(args: &Arguments, name: &str) -> std::result::Result<Option<String>, ParamError> {
    let value: String = params::optional_value(args, name)?;
    Ok(Some(value).filter(|v| !v.is_empty()))
}

/// Optional user ID filter; `0` means unset.
fn optional_id(args: &Arguments, name: &str) -> std::result::Result<Option<i64>, ParamError> {
    let value = params::optional_integer(args, name)?;
    Ok(Some(value).filter(|v| *v != 0))
}

/// Comma-separated label list, normalized to `a,b,c`.
fn optional_labels(args: &Arguments, name: &str) -> std::result::Result<Option<String>, ParamError> {
    let Some(raw) = optional_string(args, name)? else {
        return Ok(None);
    };
    let labels: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    Ok(Some(labels.join(",")).filter(|l| !l.is_empty()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn args(value: serde_json::Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    pub fn mock_client(server: &httpmock::MockServer) -> GetClientFn {
        static_client(GitLabClient::new("test-token", &server.base_url()).unwrap())
    }
}
