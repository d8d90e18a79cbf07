//! Issue tools.

use gitlab_mcp::{handler_fn, with_pagination, ServerTool, ToolCallResult, ToolDefinition};
use gitlab_mcp_core::params::{self, Arguments};
use gitlab_mcp_core::Result;
use serde_json::json;

use super::{
    json_result, optional_id, optional_labels, optional_string, required_iid, GetClientFn,
    PROJECT_ID_DESCRIPTION,
};
use crate::types::{CreateIssueRequest, ListIssuesOptions};

const ISSUE_IID_DESCRIPTION: &str = "The IID (internal ID, integer) of the issue within the project.";

/// `getIssue`
pub fn get_issue(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "getIssue",
        "Retrieves details for a specific GitLab issue.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "issueIid": {"type": "number", "description": ISSUE_IID_DESCRIPTION}
            },
            "required": ["projectId", "issueIid"]
        }),
    )
    .with_annotations("Get GitLab Issue", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_get_issue(get_client.clone(), args)),
    )
}

async fn run_get_issue(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let iid = required_iid(&args, "issueIid")?;

    let client = get_client()?;
    json_result(client.get_issue(&project, iid).await, || {
        format!(
            "issue {} not found in project {:?} or access denied",
            iid, project
        )
    })
}

/// `listIssues`
pub fn list_issues(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "listIssues",
        "Retrieves a list of issues in a GitLab project with pagination and filtering.",
        with_pagination(json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "state": {
                    "type": "string",
                    "description": "Return issues with the specified state (opened, closed, all).",
                    "enum": ["opened", "closed", "all"]
                },
                "labels": {
                    "type": "string",
                    "description": "Comma-separated list of label names to filter by."
                },
                "milestone": {
                    "type": "string",
                    "description": "Milestone title to filter by."
                },
                "scope": {
                    "type": "string",
                    "description": "Return issues for the given scope (created_by_me, assigned_to_me, all).",
                    "enum": ["created_by_me", "assigned_to_me", "all"]
                },
                "authorId": {
                    "type": "number",
                    "description": "Return issues created by the given user ID (integer)."
                },
                "assigneeId": {
                    "type": "number",
                    "description": "Return issues assigned to the given user ID (integer)."
                },
                "search": {
                    "type": "string",
                    "description": "Search issues against their title and description."
                },
                "orderBy": {
                    "type": "string",
                    "description": "Return issues ordered by this field (created_at, updated_at, priority).",
                    "enum": ["created_at", "updated_at", "priority"]
                },
                "sort": {
                    "type": "string",
                    "description": "Return issues sorted in asc or desc order.",
                    "enum": ["asc", "desc"]
                },
                "createdAfter": {
                    "type": "string",
                    "description": "Return issues created on or after the given time (ISO 8601 format: YYYY-MM-DDTHH:MM:SSZ)."
                },
                "createdBefore": {
                    "type": "string",
                    "description": "Return issues created on or before the given time (ISO 8601 format: YYYY-MM-DDTHH:MM:SSZ)."
                },
                "updatedAfter": {
                    "type": "string",
                    "description": "Return issues updated on or after the given time (ISO 8601 format: YYYY-MM-DDTHH:MM:SSZ)."
                },
                "updatedBefore": {
                    "type": "string",
                    "description": "Return issues updated on or before the given time (ISO 8601 format: YYYY-MM-DDTHH:MM:SSZ)."
                }
            },
            "required": ["projectId"]
        })),
    )
    .with_annotations("List GitLab Issues", true);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_list_issues(get_client.clone(), args)),
    )
}

async fn run_list_issues(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let opts = ListIssuesOptions {
        state: optional_string(&args, "state")?,
        labels: optional_labels(&args, "labels")?,
        milestone: optional_string(&args, "milestone")?,
        scope: optional_string(&args, "scope")?,
        author_id: optional_id(&args, "authorId")?,
        assignee_id: optional_id(&args, "assigneeId")?,
        search: optional_string(&args, "search")?,
        order_by: optional_string(&args, "orderBy")?,
        sort: optional_string(&args, "sort")?,
        created_after: params::optional_timestamp(&args, "createdAfter")?,
        created_before: params::optional_timestamp(&args, "createdBefore")?,
        updated_after: params::optional_timestamp(&args, "updatedAfter")?,
        updated_before: params::optional_timestamp(&args, "updatedBefore")?,
    };
    let pagination = params::pagination_params(&args)?;

    let client = get_client()?;
    json_result(client.list_issues(&project, &opts, pagination).await, || {
        format!("project {:?} not found or access denied", project)
    })
}

/// `createIssue`
pub fn create_issue(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "createIssue",
        "Creates a new issue in a GitLab project.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "title": {"type": "string", "description": "The title of the issue."},
                "description": {
                    "type": "string",
                    "description": "The description of the issue (Markdown)."
                },
                "labels": {
                    "type": "string",
                    "description": "Comma-separated list of label names to apply."
                },
                "milestoneId": {
                    "type": "number",
                    "description": "The global ID of a milestone to assign the issue to."
                },
                "confidential": {
                    "type": "boolean",
                    "description": "Whether the issue is confidential."
                }
            },
            "required": ["projectId", "title"]
        }),
    )
    .with_annotations("Create GitLab Issue", false);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_create_issue(get_client.clone(), args)),
    )
}

async fn run_create_issue(get_client: GetClientFn, args: Arguments) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let request = CreateIssueRequest {
        title: params::required_value(&args, "title")?,
        description: optional_string(&args, "description")?,
        labels: optional_labels(&args, "labels")?,
        milestone_id: optional_id(&args, "milestoneId")?,
        confidential: params::optional_boolean(&args, "confidential")?,
    };

    let client = get_client()?;
    json_result(client.create_issue(&project, &request).await, || {
        format!("project {:?} not found or access denied", project)
    })
}

/// `createIssueComment`
pub fn create_issue_comment(get_client: GetClientFn) -> ServerTool {
    let definition = ToolDefinition::new(
        "createIssueComment",
        "Adds a comment (note) to a specific GitLab issue.",
        json!({
            "type": "object",
            "properties": {
                "projectId": {"type": "string", "description": PROJECT_ID_DESCRIPTION},
                "issueIid": {"type": "number", "description": ISSUE_IID_DESCRIPTION},
                "body": {"type": "string", "description": "The content of the comment (Markdown)."}
            },
            "required": ["projectId", "issueIid", "body"]
        }),
    )
    .with_annotations("Comment on GitLab Issue", false);

    ServerTool::new(
        definition,
        handler_fn(move |args| run_create_issue_comment(get_client.clone(), args)),
    )
}

async fn run_create_issue_comment(
    get_client: GetClientFn,
    args: Arguments,
) -> Result<ToolCallResult> {
    let project: String = params::required_value(&args, "projectId")?;
    let iid = required_iid(&args, "issueIid")?;
    let body: String = params::required_value(&args, "body")?;

    let client = get_client()?;
    json_result(client.create_issue_note(&project, iid, &body).await, || {
        format!(
            "issue {} not found in project {:?} or access denied",
            iid, project
        )
    })
}
