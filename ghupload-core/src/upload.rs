//! The upload pipeline: walk sources, compose tree and commit, move the ref.
//!
//! Strictly linear progression per invocation:
//! sources walked → tree created → commit created → ref updated.
//! Any failing stage aborts the whole operation. Nothing is rolled back on
//! failure: a blob, tree or commit already created on the remote stays
//! there unreferenced (content-addressed objects are harmless orphans).

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::contract::{CreatedCommit, GitHost, NewCommit};
use crate::destination::Destination;
use crate::error::UploadError;
use crate::tree::build_entries;

/// Commit message used when the caller supplies none.
pub const DEFAULT_MESSAGE: &str = "Uploaded by ghupload";
/// Placeholder author used when neither flags nor git config supply one.
pub const DEFAULT_AUTHOR: &str = "ghuploader";
/// Placeholder email paired with [`DEFAULT_AUTHOR`].
pub const DEFAULT_EMAIL: &str = "ghuploader@localhost";

/// One upload invocation, assembled from CLI arguments.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Local files or directories to upload, in argument order.
    pub sources: Vec<PathBuf>,
    pub destination: Destination,
    /// Commit author name; placeholder identity when `None`.
    pub author: Option<String>,
    /// Commit author email; placeholder identity when `None`.
    pub email: Option<String>,
    /// Commit message; [`DEFAULT_MESSAGE`] when `None`.
    pub message: Option<String>,
}

/// What the caller reports to the user on success.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadOutcome {
    /// Branch the upload landed on (resolved default branch if the
    /// destination named none).
    pub branch: String,
    pub commit_sha: String,
    pub commit_url: String,
}

/// Run the full upload against `host`.
///
/// Remote calls are sequential and ordered; the first failure is returned
/// as-is with no retry. Local validation (ambiguous destination, symlinks)
/// happens before the first remote call.
pub async fn upload<H: GitHost>(
    host: &H,
    req: &UploadRequest,
) -> Result<UploadOutcome, UploadError> {
    let dest = &req.destination;
    info!(destination = %dest, sources = req.sources.len(), "starting upload");

    let entries = build_entries(host, dest, &req.sources).await?;

    let repository = host
        .get_repository(&dest.owner, &dest.repo)
        .await
        .map_err(|e| {
            error!(owner = %dest.owner, repo = %dest.repo, error = %e, "failed to fetch repository");
            UploadError::remote(e)
        })?;
    let branch = dest
        .branch
        .clone()
        .unwrap_or_else(|| repository.default_branch.clone());

    let head = host
        .get_branch_head(&dest.owner, &dest.repo, &branch)
        .await
        .map_err(|e| {
            error!(branch = %branch, error = %e, "failed to fetch branch head");
            UploadError::remote(e)
        })?;
    info!(branch = %branch, head = %head, "resolved branch head");

    let tree_sha = host
        .create_tree(&dest.owner, &dest.repo, &head, &entries)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create tree");
            UploadError::remote(e)
        })?;

    let commit = NewCommit {
        message: req
            .message
            .clone()
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
        tree_sha,
        parent_sha: head,
        author_name: req
            .author
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        author_email: req
            .email
            .clone()
            .unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
    };
    let CreatedCommit { sha, html_url } = host
        .create_commit(&dest.owner, &dest.repo, commit)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to create commit");
            UploadError::remote(e)
        })?;
    info!(commit = %sha, "created commit");

    // Non-forced: the host refuses anything but a fast-forward, so a
    // concurrently moved branch fails the whole upload here.
    host.update_ref(&dest.owner, &dest.repo, &branch, &sha)
        .await
        .map_err(|e| {
            error!(branch = %branch, commit = %sha, error = %e, "failed to update branch reference");
            UploadError::remote(e)
        })?;
    info!(branch = %branch, commit = %sha, "branch reference updated");

    let outcome = UploadOutcome {
        branch,
        commit_sha: sha,
        commit_url: html_url,
    };
    match serde_json::to_string(&outcome) {
        Ok(json) => debug!(outcome = %json, "upload outcome"),
        Err(e) => error!(error = ?e, "failed to serialise upload outcome"),
    }
    Ok(outcome)
}
