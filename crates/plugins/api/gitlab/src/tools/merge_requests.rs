//! Merge request tools.

use gitlab_mcp::{handler_fn, with_pagination, ServerTool, ToolCallResult, ToolDefinition};
use gitlab_mcp_core::params::{self, Arguments};
use gitlab_mcp_core::Result;
use serde_json::json;

use super::{
    json_result, optional_id, optional_labels, optional_string, required_iid, GetClientFn,
    PROJECT_ID_DESCRIPTION,
};
use crate::types::ListMergeRequestsOptions;

const MR_IID_DESCRIPTION: &str =
    "The IID (internal ID, integer) of the merge request within the project.";

fn mr_not_found(iid: u64, project: &str) -> String {
    format!(
        "merge request {} not found in project {:?} or access denied",
        iid, project
    )
}

/// `getMergeRequest`
pub fn get_merge_request(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getMergeRequest",
        "Retrieves details for a specific GitLab merge request.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "mergeRequestIid": {"type": "number", "description": MR_IID_DESCRIPTION}
            },
            "required": ["projectId", "mergeRequestIid"]
        }),
    )
    .with_annotations("Get GitLab Merge Request", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_merge_request(get_client.clone(), args)),
    )
}

async fn run_get_merge_request(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let iid = required_iid(&args, "mergeRequestIid")?;

    let client = get_client()?;
    json_result(client.get_merge_request(&project, iid).await, || {
        mr_not_found(iid, &project)
    })
}

/// `getMergeRequestComments`
pub fn get_merge_request_comments(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getMergeRequestComments",
        "Retrieves comments or notes from a specific merge request in a GitLab project.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "mergeRequestIid": {"type": "number", "description": MR_IID_DESCRIPTION}
            },
            "required": ["projectId", "mergeRequestIid"]
        })),
    )
    .with_annotations("Get Merge Request Comments", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_merge_request_comments(get_client.clone(), args)),
    )
}

async fn run_get_merge_request_comments(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let iid = required_iid(&args, "mergeRequestIid")?;
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(
        client
            .list_merge_request_notes(&project, iid, pagination)
            .await,
        || mr_not_found(iid, &project),
    )
}

/// `listMergeRequests`
///
/// Filter names are snake_case here, unlike the camelCase of `listIssues`.
pub fn list_merge_requests(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "listMergeRequests",
        "Lists merge requests for a GitLab project with filtering and pagination options.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "state": {
                    "type": "string",
                    "description": "Return merge requests with the specified state ('opened', 'closed', 'locked', 'merged', or 'all'). Default: 'all'.",
                    "enum": ["opened", "closed", "locked", "merged", "all"]
                },
                "scope": {
                    "type": "string",
                    "description": "Return merge requests for the specified scope ('created_by_me', 'assigned_to_me', or 'all'). Default: 'all'.",
                    "enum": ["created_by_me", "assigned_to_me", "all"]
                },
                "author_id": {
                    "type": "string",
                    "description": "Return merge requests created by the specified user ID."
                },
                "assignee_id": {
                    "type": "string",
                    "description": "Return merge requests assigned to the specified user ID."
                },
                "labels": {
                    "type": "string",
                    "description": "Return merge requests matching the comma-separated list of labels."
                },
                "milestone": {
                    "type": "string",
                    "description": "Return merge requests for the specified milestone title."
                },
                "search": {
                    "type": "string",
                    "description": "Return merge requests matching the search query in their title or description."
                },
                "created_after": {
                    "type": "string",
                    "description": "Return merge requests created on or after the given datetime (ISO 8601 format)."
                },
                "created_before": {
                    "type": "string",
                    "description": "Return merge requests created on or before the given datetime (ISO 8601 format)."
                },
                "updated_after": {
                    "type": "string",
                    "description": "Return merge requests updated on or after the given datetime (ISO 8601 format)."
                },
                "updated_before": {
                    "type": "string",
                    "description": "Return merge requests updated on or before the given datetime (ISO 8601 format)."
                },
                "sort": {
                    "type": "string",
                    "description": "Return merge requests sorted in the specified order ('asc' or 'desc'). Default: 'desc'.",
                    "enum": ["asc", "desc"]
                },
                "order_by": {
                    "type": "string",
                    "description": "Return merge requests ordered by the specified field ('created_at', 'updated_at', or 'title'). Default: 'created_at'.",
                    "enum": ["created_at", "updated_at", "title"]
                }
            },
            "required": ["projectId"]
        })),
    )
    .with_annotations("List GitLab Merge Requests", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_list_merge_requests(get_client.clone(), args)),
    )
}

async fn run_list_merge_requests(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let opts = ListMergeRequestsOptions {
        state: optional_string(&args, "state")?,
        scope: optional_string(&args, "scope")?,
        author_id: optional_id(&args, "author_id")?,
        assignee_id: optional_id(&args, "assignee_id")?,
        labels: optional_labels(&args, "labels")?,
        milestone: optional_string(&args, "milestone")?,
        search: optional_string(&args, "search")?,
        created_after: params::optional_timestamp(&args, "created_after")?,
        created_before: params::optional_timestamp(&args, "created_before")?,
        updated_after: params::optional_timestamp(&args, "updated_after")?,
        updated_before: params::optional_timestamp(&args, "updated_before")?,
        sort: optional_string(&args, "sort")?,
        order_by: optional_string(&args, "order_by")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(
        client
            .list_merge_requests(&project, &opts, pagination)
            .await,
        || format!("project {:?} not found or access denied", project),
    )
}

/// `createMergeRequestComment`
pub fn create_merge_request_comment(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "createMergeRequestComment",
        "Adds a comment (note) to a specific GitLab merge request.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "mergeRequestIid": {"type": "number", "description": MR_IID_DESCRIPTION},
                "body": {"type": "string", "description": "The content of the comment (Markdown)."}
            },
            "required": ["projectId", "mergeRequestIid", "body"]
        }),
    )
    .with_annotations("Comment on GitLab Merge Request", false);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_create_merge_request_comment(get_client.clone(), args)),
    )
}

async fn run_create_merge_request_comment(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let iid = required_iid(&args, "mergeRequestIid")?;
    let body: String = params::required_value(&args, "body")?;

    let client = get_client()?;
    json_result(
        client.create_merge_request_note(&project, iid, &body).await,
        || mr_not_found(iid, &project),
    )
}
