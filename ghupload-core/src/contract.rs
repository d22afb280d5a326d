//! # contract: interfaces to the remote Git host and local capabilities
//!
//! This module defines the [`GitHost`] trait — one method per Git data API
//! capability the upload pipeline consumes — plus the two small local
//! capabilities the CLI layer injects: [`SecretResolver`] (password-manager
//! token lookup) and [`GitIdentity`] (author/email from local git config).
//!
//! ## Interface & Extensibility
//! - Implement [`GitHost`] to target a Git-compatible hosting API.
//! - All remote methods are async and return boxed error trait objects;
//!   the pipeline wraps them into its own error type at the call site.
//! - Local capabilities are synchronous: they wrap short subprocess calls.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so consumers can generate
//!   deterministic mocks for unit/integration tests (exported behind the
//!   default-on `test-export-mocks` feature).

use async_trait::async_trait;

use mockall::automock;

/// Error type for remote host calls (simple boxed error for now).
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Repository metadata the pipeline needs: where unqualified destinations go.
#[derive(Debug, Clone)]
pub struct Repository {
    /// Branch used when the destination did not name one.
    pub default_branch: String,
    /// Web URL of the repository, for user-facing reporting.
    pub html_url: String,
}

/// One file to be written into the target commit's tree.
///
/// Directories are never represented; every walked file becomes its own
/// leaf entry with a full repo-relative path. The object type is always
/// `blob` and the mode is always [`REGULAR_FILE_MODE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repo-relative path of the file in the new tree.
    pub path: String,
    /// Git filesystem mode, fixed at `100644`.
    pub mode: String,
    /// Object id of the blob holding the file content.
    pub sha: String,
}

/// Git mode for a regular, non-executable file.
pub const REGULAR_FILE_MODE: &str = "100644";

/// Data needed to create a commit on top of the branch head.
#[derive(Debug, Clone)]
pub struct NewCommit {
    pub message: String,
    /// SHA of the tree the commit snapshots.
    pub tree_sha: String,
    /// SHA of the previous branch head; the sole parent.
    pub parent_sha: String,
    pub author_name: String,
    pub author_email: String,
}

/// The created commit, as reported by the host.
#[derive(Debug, Clone)]
pub struct CreatedCommit {
    pub sha: String,
    /// Web URL of the commit, for user-facing reporting.
    pub html_url: String,
}

/// Trait for the Git data API the upload pipeline composes: blob, tree and
/// commit creation plus a fast-forward reference update.
///
/// The implementor owns transport, authentication and serialization; the
/// trait itself is agnostic of all three. Implemented by the real GitHub
/// client in the `ghupload` crate and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Fetch repository metadata (default branch, web URL).
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, HostError>;

    /// Fetch the SHA of the branch's current head commit.
    async fn get_branch_head(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, HostError>;

    /// Raw existence check for a blob object by id, used for dedup.
    async fn blob_exists(&self, owner: &str, repo: &str, sha: &str) -> Result<bool, HostError>;

    /// Create a blob from raw file content, returning its object id.
    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &[u8],
    ) -> Result<String, HostError>;

    /// Create a tree from the entries, anchored at `base_tree` (the host
    /// merges the entries into the base rather than replacing it).
    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, HostError>;

    /// Create a commit object.
    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        commit: NewCommit,
    ) -> Result<CreatedCommit, HostError>;

    /// Advance `refs/heads/{branch}` to `sha`. Non-forced: the host must
    /// refuse anything that is not a fast-forward.
    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<(), HostError>;
}

/// Resolves a secret by key through an external secret store (e.g. `pass`).
/// Injected so token lookup can be mocked instead of shelling out in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Result<String, HostError>;
}

/// Reads the commit identity from local git configuration. Absent or
/// unreadable values are `None`; callers fall back to a placeholder.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait GitIdentity: Send + Sync {
    fn user_name(&self) -> Option<String>;
    fn user_email(&self) -> Option<String>;
}
