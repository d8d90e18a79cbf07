//! Repository browsing tools: files, tree, branches and commits.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gitlab_mcp::{handler_fn, with_pagination, ServerTool, ToolCallResult, ToolDefinition};
use gitlab_mcp_core::params::{self, Arguments};
use gitlab_mcp_core::{Error, Result};
use serde_json::json;

use super::{json_result, optional_string, GetClientFn, PROJECT_ID_DESCRIPTION};
use crate::types::{ListBranchesOptions, ListCommitsOptions, ListTreeOptions, RepositoryFile};

// =============================================================================
// getProjectFile
// =============================================================================

/// `getProjectFile`: decoded content of one file.
pub fn get_project_file(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getProjectFile",
        "Retrieves the content of a specific file within a GitLab project repository.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "filePath": {
                    "type": "string",
                    "description": "The path to the file within the repository."
                },
                "ref": {
                    "type": "string",
                    "description": "The name of branch, tag, or commit SHA (defaults to the repository's default branch)."
                }
            },
            "required": ["projectId", "filePath"]
        }),
    )
    .with_annotations("Get Project File Content", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_project_file(get_client.clone(), args)),
    )
}

async fn run_get_project_file(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let file_path: String = params::required_value(&args, "filePath")?;
    let git_ref = optional_string(&args, "ref")?;

    let client = get_client()?;
    match client.get_file(&project, &file_path, git_ref.as_deref()).await {
        Ok(file) => Ok(ToolCallResult::text(decode_content(&file)?)),
        Err(Error::NotFound(_)) => Ok(ToolCallResult::error(format!(
            "project {:?} or file {:?} not found, or access denied (ref: {:?}) (404)",
            project,
            file_path,
            git_ref.unwrap_or_default()
        ))),
        Err(err) => Err(err),
    }
}

fn decode_content(file: &RepositoryFile) -> Result<String> {
    if file.encoding != "base64" {
        return Ok(file.content.clone());
    }

    // GitLab may wrap long base64 payloads.
    let compact: String = file.content.split_whitespace().collect();
    let bytes = STANDARD.decode(compact).map_err(|e| {
        Error::InvalidData(format!(
            "failed to decode base64 content for file {:?}: {}",
            file.file_path, e
        ))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// =============================================================================
// listProjectFiles
// =============================================================================

/// `listProjectFiles`: repository tree entries under a path.
pub fn list_project_files(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "listProjectFiles",
        "Retrieves a list of files and directories within a specific path in a GitLab project repository.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "path": {
                    "type": "string",
                    "description": "The path inside the repository. Used to list files in a subdirectory. Defaults to the root directory."
                },
                "ref": {
                    "type": "string",
                    "description": "The name of branch, tag, or commit SHA (defaults to the repository's default branch)."
                },
                "recursive": {
                    "type": "boolean",
                    "description": "Flag indicating whether to list files recursively."
                }
            },
            "required": ["projectId"]
        })),
    )
    .with_annotations("List Project Files/Directories", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_list_project_files(get_client.clone(), args)),
    )
}

async fn run_list_project_files(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let opts = ListTreeOptions {
        path: optional_string(&args, "path")?,
        git_ref: optional_string(&args, "ref")?,
        recursive: params::optional_boolean(&args, "recursive")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(client.list_tree(&project, &opts, pagination).await, || {
        format!(
            "project {:?} or path {:?} not found, or access denied (ref: {:?})",
            project,
            opts.path.clone().unwrap_or_default(),
            opts.git_ref.clone().unwrap_or_default()
        )
    })
}

// =============================================================================
// getProjectBranches
// =============================================================================

/// `getProjectBranches`: branches sorted by name.
pub fn get_project_branches(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getProjectBranches",
        "Retrieves a list of repository branches from a project, sorted by name alphabetically.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "search": {
                    "type": "string",
                    "description": "Return list of branches matching the search criteria."
                }
            },
            "required": ["projectId"]
        })),
    )
    .with_annotations("List Project Branches", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_project_branches(get_client.clone(), args)),
    )
}

async fn run_get_project_branches(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let opts = ListBranchesOptions {
        search: optional_string(&args, "search")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(
        client.list_branches(&project, &opts, pagination).await,
        || format!("project {:?} not found or access denied", project),
    )
}

// =============================================================================
// getProjectCommits
// =============================================================================

/// `getProjectCommits`: commit history, optionally filtered.
pub fn get_project_commits(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getProjectCommits",
        "Retrieves a list of repository commits in a project, optionally filtered by ref, path, dates, and stats.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "ref": {
                    "type": "string",
                    "description": "The name of a repository branch, tag or commit SHA. Default: the repository's default branch."
                },
                "path": {
                    "type": "string",
                    "description": "The file path to retrieve commits for."
                },
                "since": {
                    "type": "string",
                    "description": "Only commits after or on this date are returned (YYYY-MM-DDTHH:MM:SSZ). Format: ISO 8601"
                },
                "until": {
                    "type": "string",
                    "description": "Only commits before or on this date are returned (YYYY-MM-DDTHH:MM:SSZ). Format: ISO 8601"
                },
                "withStats": {
                    "type": "boolean",
                    "description": "Include commit stats (additions, deletions). Default is false."
                }
            },
            "required": ["projectId"]
        })),
    )
    .with_annotations("List Project Commits", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_project_commits(get_client.clone(), args)),
    )
}

async fn run_get_project_commits(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let opts = ListCommitsOptions {
        ref_name: optional_string(&args, "ref")?,
        path: optional_string(&args, "path")?,
        since: params::optional_timestamp(&args, "since")?,
        until: params::optional_timestamp(&args, "until")?,
        with_stats: params::optional_boolean(&args, "withStats")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(
        client.list_commits(&project, &opts, pagination).await,
        || format!("project {:?} not found or access denied", project),
    )
}
