//! Project lookup tools.

use gitlab_mcp::{handler_fn, with_pagination, ServerTool, ToolCallResult, ToolDefinition};
use gitlab_mcp_core::params::{self, Arguments};
use gitlab_mcp_core::Result;
use serde_json::json;

use super::{json_result, optional_string, GetClientFn, PROJECT_ID_DESCRIPTION};
use crate::types::ListProjectsOptions;

/// `getProject`: details of a single project.
pub fn get_project(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getProject",
        "Retrieves details for a specific GitLab project.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION}
            },
            "required": ["projectId"]
        }),
    )
    .with_annotations("Get Project Details", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_project(get_client.clone(), args)),
    )
}

async fn run_get_project(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;

    let client = get_client()?;
    json_result(client.get_project(&project).await, || {
        format!("project {:?} not found or access denied", project)
    })
}

/// `listProjects`: projects visible to the authenticated user.
pub fn list_projects(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "listProjects",
        "Retrieves a list of GitLab projects accessible to the authenticated user, with filtering and pagination.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "search": {
                    "type": "string",
                    "description": "Return projects matching the search criteria."
                },
                "owned": {
                    "type": "boolean",
                    "description": "Limit to projects explicitly owned by the current user."
                },
                "membership": {
                    "type": "boolean",
                    "description": "Limit to projects the current user is a member of."
                },
                "starred": {
                    "type": "boolean",
                    "description": "Limit to projects starred by the current user."
                },
                "visibility": {
                    "type": "string",
                    "description": "Limit by visibility (public, internal, private).",
                    "enum": ["public", "internal", "private"]
                },
                "orderBy": {
                    "type": "string",
                    "description": "Return projects ordered by this field.",
                    "enum": ["id", "name", "path", "created_at", "updated_at", "last_activity_at"]
                },
                "sort": {
                    "type": "string",
                    "description": "Return projects sorted in asc or desc order.",
                    "enum": ["asc", "desc"]
                }
            }
        })),
    )
    .with_annotations("List GitLab Projects", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_list_projects(get_client.clone(), args)),
    )
}

async fn run_list_projects(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let opts = ListProjectsOptions {
        search: optional_string(&args, "search")?,
        owned: params::optional_boolean(&args, "owned")?,
        membership: params::optional_boolean(&args, "membership")?,
        starred: params::optional_boolean(&args, "starred")?,
        visibility: optional_string(&args, "visibility")?,
        order_by: optional_string(&args, "orderBy")?,
        sort: optional_string(&args, "sort")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(client.list_projects(&opts, pagination).await, || {
        "projects not found or access denied".to_string()
    })
}
