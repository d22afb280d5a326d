//! Error type for the upload pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::contract::HostError;

/// Everything that can abort an upload. No variant is retried or recovered
/// internally; all propagate to the caller, which prints and exits non-zero.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or unresolvable configuration, such as the API token.
    #[error("configuration error: {0}")]
    Config(String),

    /// Destination string did not match `owner/repo[@branch]:path`.
    #[error("invalid destination {0:?}, expected owner/repo[@branch]:path")]
    Parse(String),

    /// Ambiguous invocation, e.g. several sources without a `/`-terminated
    /// destination directory.
    #[error("invalid arguments: {0}")]
    Argument(String),

    /// Files that cannot be represented in the target tree, such as
    /// symlinks or non-unicode names. Never silently skipped.
    #[error("unsupported file type ({reason}): {}", path.display())]
    UnsupportedFile { path: PathBuf, reason: &'static str },

    /// Local filesystem failure while walking or reading sources.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failing call to the remote host: unknown repo or branch,
    /// permission denied, rejected (non-fast-forward) ref update.
    #[error("remote api error: {0}")]
    Remote(#[source] HostError),
}

impl UploadError {
    /// Wrap a failed host call.
    pub fn remote(err: HostError) -> Self {
        UploadError::Remote(err)
    }
}
