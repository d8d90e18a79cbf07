//! GitLab toolset catalog.

use gitlab_mcp::{Toolset, ToolsetGroup, ALL_TOOLSETS};
use gitlab_mcp_core::Result;
use tracing::debug;

use crate::tools::{issues, merge_requests, projects, repository, GetClientFn};

/// Toolsets enabled when the user names none.
pub const DEFAULT_TOOLSETS: &[&str] = &[ALL_TOOLSETS];

/// Build every GitLab toolset, all disabled.
pub fn build_toolsets(read_only: bool, get_client: GetClientFn) -> ToolsetGroup {
    let mut group = ToolsetGroup::new(read_only);

    let mut projects_ts = Toolset::new(
        "projects",
        "Tools for interacting with GitLab projects, repositories, branches, commits, tags.",
    );
    projects_ts.add_read_tools([
        projects::get_project(get_client.clone()),
        projects::list_projects(get_client.clone()),
        repository::get_project_file(get_client.clone()),
        repository::list_project_files(get_client.clone()),
        repository::get_project_branches(get_client.clone()),
        repository::get_project_commits(get_client.clone()),
    ]);

    let mut issues_ts = Toolset::new(
        "issues",
        "Tools for CRUD operations on GitLab issues, comments, labels.",
    );
    issues_ts
        .add_read_tools([
            issues::get_issue(get_client.clone()),
            issues::list_issues(get_client.clone()),
        ])
        .add_write_tools([
            issues::create_issue(get_client.clone()),
            issues::create_issue_comment(get_client.clone()),
        ]);

    let mut merge_requests_ts = Toolset::new(
        "merge_requests",
        "Tools for CRUD operations on GitLab merge requests, comments, approvals, diffs.",
    );
    merge_requests_ts
        .add_read_tools([
            merge_requests::get_merge_request(get_client.clone()),
            merge_requests::get_merge_request_comments(get_client.clone()),
            merge_requests::list_merge_requests(get_client.clone()),
        ])
        .add_write_tools([merge_requests::create_merge_request_comment(get_client)]);

    // No tools yet; kept so they can be named on the command line.
    let security_ts = Toolset::new(
        "security",
        "Tools for accessing GitLab security scan results (SAST, DAST, etc.).",
    );
    let users_ts = Toolset::new("users", "Tools for looking up GitLab user information.");
    let search_ts = Toolset::new(
        "search",
        "Tools for utilizing GitLab's scoped search capabilities.",
    );

    for toolset in [
        projects_ts,
        issues_ts,
        merge_requests_ts,
        security_ts,
        users_ts,
        search_ts,
    ] {
        group.add_toolset(toolset);
    }

    group
}

/// Build the catalog and enable `enabled` (which may be just `"all"`).
pub fn init_toolsets<S: AsRef<str>>(
    enabled: &[S],
    read_only: bool,
    get_client: GetClientFn,
) -> Result<ToolsetGroup> {
    let mut group = build_toolsets(read_only, get_client);
    group.enable_toolsets(enabled)?;

    debug!(
        everything_on = group.is_everything_on(),
        read_only, "GitLab toolsets initialized"
    );
    Ok(group)
}
