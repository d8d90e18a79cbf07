//! GitLab API client implementation.
//!
//! A thin wrapper over GitLab REST API v4. Responses are returned as raw
//! JSON so tools can hand them to the caller unchanged.

use gitlab_mcp_core::params::Pagination;
use gitlab_mcp_core::{Error, Result};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::types::{
    CreateIssueRequest, CreateNoteRequest, ListBranchesOptions, ListCommitsOptions,
    ListIssuesOptions, ListMergeRequestsOptions, ListProjectsOptions, ListTreeOptions,
    RepositoryFile,
};
use crate::DEFAULT_GITLAB_URL;

const USER_AGENT: &str = concat!("gitlab-mcp-server/", env!("CARGO_PKG_VERSION"));

/// GitLab API client.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    api_base: Url,
    token: String,
    client: reqwest::Client,
}

impl GitLabClient {
    /// Create a client for `host` (empty means gitlab.com).
    ///
    /// Fails when the token is empty or the host is not a valid URL.
    pub fn new(token: impl Into<String>, host: &str) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config(
                "GitLab access token cannot be empty".to_string(),
            ));
        }

        let host = match host.trim() {
            "" => DEFAULT_GITLAB_URL,
            h => h,
        };

        let api_base = Url::parse(&format!("{}/api/v4", host.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("Invalid GitLab host '{}': {}", host, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid GitLab host '{}'", host)));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            api_base,
            token,
            client,
        })
    }

    /// Base URL of the REST API, e.g. `https://gitlab.com/api/v4`.
    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    /// Build an API URL from raw path segments. Each segment is
    /// percent-encoded on its own, so `/` inside a segment becomes `%2F`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    /// URL under `/projects/:id`.
    fn project_endpoint(&self, project: &str, rest: &[&str]) -> Url {
        let project = decode_project_id(project);
        let mut segments = vec!["projects", project.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Build request with common headers.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "GitLab request");
        self.client
            .request(method, url)
            .header("PRIVATE-TOKEN", &self.token)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.send(self.request(Method::GET, url)).await
    }

    async fn get_list<Q: Serialize>(
        &self,
        url: Url,
        query: &Q,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        self.send(
            self.request(Method::GET, url)
                .query(query)
                .query(&pagination),
        )
        .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: Url, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, url).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                body = %message,
                "GitLab API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub async fn get_project(&self, project: &str) -> Result<Value> {
        self.get(self.project_endpoint(project, &[])).await
    }

    pub async fn list_projects(
        &self,
        opts: &ListProjectsOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        self.get_list(self.endpoint(&["projects"]), opts, pagination)
            .await
    }

    // =========================================================================
    // Repository
    // =========================================================================

    pub async fn get_file(
        &self,
        project: &str,
        file_path: &str,
        git_ref: Option<&str>,
    ) -> Result<RepositoryFile> {
        let url = self.project_endpoint(project, &["repository", "files", file_path]);
        let mut request = self.request(Method::GET, url);
        if let Some(git_ref) = git_ref {
            request = request.query(&[("ref", git_ref)]);
        }
        self.send(request).await
    }

    pub async fn list_tree(
        &self,
        project: &str,
        opts: &ListTreeOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let url = self.project_endpoint(project, &["repository", "tree"]);
        self.get_list(url, opts, pagination).await
    }

    pub async fn list_branches(
        &self,
        project: &str,
        opts: &ListBranchesOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let url = self.project_endpoint(project, &["repository", "branches"]);
        self.get_list(url, opts, pagination).await
    }

    pub async fn list_commits(
        &self,
        project: &str,
        opts: &ListCommitsOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let url = self.project_endpoint(project, &["repository", "commits"]);
        self.get_list(url, opts, pagination).await
    }

    // =========================================================================
    // Issues
    // =========================================================================

    pub async fn get_issue(&self, project: &str, iid: u64) -> Result<Value> {
        let iid = iid.to_string();
        self.get(self.project_endpoint(project, &["issues", &iid]))
            .await
    }

    pub async fn list_issues(
        &self,
        project: &str,
        opts: &ListIssuesOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let url = self.project_endpoint(project, &["issues"]);
        self.get_list(url, opts, pagination).await
    }

    pub async fn create_issue(&self, project: &str, request: &CreateIssueRequest) -> Result<Value> {
        let url = self.project_endpoint(project, &["issues"]);
        self.post(url, request).await
    }

    pub async fn create_issue_note(&self, project: &str, iid: u64, body: &str) -> Result<Value> {
        let iid = iid.to_string();
        let url = self.project_endpoint(project, &["issues", &iid, "notes"]);
        let request = CreateNoteRequest {
            body: body.to_string(),
        };
        self.post(url, &request).await
    }

    // =========================================================================
    // Merge Requests
    // =========================================================================

    pub async fn get_merge_request(&self, project: &str, iid: u64) -> Result<Value> {
        let iid = iid.to_string();
        self.get(self.project_endpoint(project, &["merge_requests", &iid]))
            .await
    }

    pub async fn list_merge_request_notes(
        &self,
        project: &str,
        iid: u64,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let iid = iid.to_string();
        let url = self.project_endpoint(project, &["merge_requests", &iid, "notes"]);
        self.send(self.request(Method::GET, url).query(&pagination))
            .await
    }

    pub async fn list_merge_requests(
        &self,
        project: &str,
        opts: &ListMergeRequestsOptions,
        pagination: Pagination,
    ) -> Result<Vec<Value>> {
        let url = self.project_endpoint(project, &["merge_requests"]);
        self.get_list(url, opts, pagination).await
    }

    pub async fn create_merge_request_note(
        &self,
        project: &str,
        iid: u64,
        body: &str,
    ) -> Result<Value> {
        let iid = iid.to_string();
        let url = self.project_endpoint(project, &["merge_requests", &iid, "notes"]);
        let request = CreateNoteRequest {
            body: body.to_string(),
        };
        self.post(url, &request).await
    }
}

/// Accept project paths that were already URL-encoded (`group%2Fproject`).
fn decode_project_id(project: &str) -> String {
    project.replace("%2F", "/").replace("%2f", "/")
}
