#![doc = "GitHub integration for CLI and core: bridges the GitHost trait to the real REST API client."]
//
//! # GitHub Client (CLI <-> Core)
//!
//! This module wires up the [`GitHost`] trait from `ghupload-core` for real
//! use against the GitHub REST API. All transport, authentication and
//! serialization live here; the core pipeline only sees the trait.
//!
//! ## Client Usage
//!
//! - Construct [`GitHubClient`] with a token (see `cli` for resolution order).
//! - The base URL is injectable for tests and GitHub Enterprise hosts.
//! - Every call is a single request: no retries, no pagination.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use ghupload_core::contract::{
    CreatedCommit, GitHost, HostError, NewCommit, Repository, TreeEntry,
};

/// Default API endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Authenticated GitHub REST client. One instance per invocation; the token
/// lives here, never in global state.
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Client against a non-default endpoint (tests, GitHub Enterprise).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        GitHubClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(USER_AGENT, "ghupload")
            .header(ACCEPT, "application/vnd.github+json")
    }

    /// Map non-success statuses to a readable boxed error with the response
    /// body, the way the API reports conflicts and permission problems.
    async fn check(resp: Response) -> Result<Response, HostError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(format!("GitHub API error: {status}: {body}").into())
        }
    }
}

#[derive(Deserialize)]
struct RepositoryResponse {
    default_branch: String,
    html_url: String,
}

#[derive(Deserialize)]
struct BranchResponse {
    commit: BranchCommit,
}

#[derive(Deserialize)]
struct BranchCommit {
    sha: String,
}

#[derive(Serialize)]
struct BlobRequest {
    content: String,
    encoding: &'static str,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Serialize)]
struct TreeItemRequest<'a> {
    path: &'a str,
    mode: &'a str,
    r#type: &'static str,
    sha: &'a str,
}

#[derive(Serialize)]
struct TreeRequest<'a> {
    base_tree: &'a str,
    tree: Vec<TreeItemRequest<'a>>,
}

#[derive(Serialize)]
struct CommitAuthor<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct CommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
    author: CommitAuthor<'a>,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: String,
}

#[derive(Serialize)]
struct RefUpdateRequest<'a> {
    sha: &'a str,
    force: bool,
}

#[async_trait]
impl GitHost for GitHubClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, HostError> {
        tracing::info!(owner, repo, "fetching repository");
        let resp = self
            .request(Method::GET, &format!("repos/{owner}/{repo}"))
            .send()
            .await?;
        let body: RepositoryResponse = Self::check(resp).await?.json().await?;
        Ok(Repository {
            default_branch: body.default_branch,
            html_url: body.html_url,
        })
    }

    async fn get_branch_head(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, HostError> {
        tracing::info!(owner, repo, branch, "fetching branch head");
        let resp = self
            .request(Method::GET, &format!("repos/{owner}/{repo}/branches/{branch}"))
            .send()
            .await?;
        let body: BranchResponse = Self::check(resp).await?.json().await?;
        Ok(body.commit.sha)
    }

    async fn blob_exists(&self, owner: &str, repo: &str, sha: &str) -> Result<bool, HostError> {
        let resp = self
            .request(Method::HEAD, &format!("repos/{owner}/{repo}/git/blobs/{sha}"))
            .send()
            .await?;
        match resp.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(format!("GitHub API error: {status} checking blob {sha}").into()),
        }
    }

    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &[u8],
    ) -> Result<String, HostError> {
        tracing::info!(owner, repo, bytes = content.len(), "creating blob");
        // Base64 keeps binary content intact on the wire.
        let body = BlobRequest {
            content: BASE64.encode(content),
            encoding: "base64",
        };
        let resp = self
            .request(Method::POST, &format!("repos/{owner}/{repo}/git/blobs"))
            .json(&body)
            .send()
            .await?;
        let body: ShaResponse = Self::check(resp).await?.json().await?;
        Ok(body.sha)
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, HostError> {
        tracing::info!(owner, repo, base_tree, entries = entries.len(), "creating tree");
        let body = TreeRequest {
            base_tree,
            tree: entries
                .iter()
                .map(|entry| TreeItemRequest {
                    path: &entry.path,
                    mode: &entry.mode,
                    r#type: "blob",
                    sha: &entry.sha,
                })
                .collect(),
        };
        let resp = self
            .request(Method::POST, &format!("repos/{owner}/{repo}/git/trees"))
            .json(&body)
            .send()
            .await?;
        let body: ShaResponse = Self::check(resp).await?.json().await?;
        Ok(body.sha)
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: NewCommit,
    ) -> Result<CreatedCommit, HostError> {
        tracing::info!(owner, repo, tree = %commit.tree_sha, parent = %commit.parent_sha, "creating commit");
        let body = CommitRequest {
            message: &commit.message,
            tree: &commit.tree_sha,
            parents: vec![&commit.parent_sha],
            author: CommitAuthor {
                name: &commit.author_name,
                email: &commit.author_email,
            },
        };
        let resp = self
            .request(Method::POST, &format!("repos/{owner}/{repo}/git/commits"))
            .json(&body)
            .send()
            .await?;
        let body: CommitResponse = Self::check(resp).await?.json().await?;
        Ok(CreatedCommit {
            sha: body.sha,
            html_url: body.html_url,
        })
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<(), HostError> {
        tracing::info!(owner, repo, branch, sha, "updating branch reference");
        let body = RefUpdateRequest { sha, force: false };
        let resp = self
            .request(
                Method::PATCH,
                &format!("repos/{owner}/{repo}/git/refs/heads/{branch}"),
            )
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
