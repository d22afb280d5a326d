//! # ghupload CLI interface
//!
//! Command parsing, token/identity resolution and the async entrypoint.
//! All upload logic lives in `ghupload-core`; this module is strictly CLI
//! glue and orchestration. [`run`] is separate from `main` so integration
//! tests can invoke it programmatically.

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use ghupload_core::contract::{GitIdentity, SecretResolver};
use ghupload_core::destination::Destination;
use ghupload_core::error::UploadError;
use ghupload_core::upload::{upload, UploadRequest};

use crate::github::GitHubClient;
use crate::proc::{GitConfigIdentity, PassSecretResolver};

/// Environment variables consulted for the token, in order, after `--token`.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GHUPLOAD_TOKEN", "GITHUB_TOKEN"];
/// Token prefix that routes resolution through the secret store.
pub const PASS_PREFIX: &str = "pass::";

/// CLI for ghupload: upload files or directories into a GitHub branch.
#[derive(Parser)]
#[clap(
    name = "ghupload",
    version,
    about = "Upload files or directories to a GitHub repository branch through the REST API"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload sources to a destination of the form owner/repo[@branch]:path
    Upload {
        /// GitHub token; falls back to GHUPLOAD_TOKEN or GITHUB_TOKEN.
        /// A pass::<key> value is resolved through the pass secret store.
        #[clap(long)]
        token: Option<String>,
        /// Commit message
        #[clap(long)]
        message: Option<String>,
        /// Commit author name; falls back to GHUPLOAD_AUTHOR, then git config
        #[clap(long)]
        author: Option<String>,
        /// Commit author email; falls back to GHUPLOAD_EMAIL, then git config
        #[clap(long)]
        email: Option<String>,
        /// Source files or directories, followed by the destination.
        /// End the destination path with '/' to upload into a directory.
        #[clap(required = true, num_args = 2.., value_name = "SRC... DEST")]
        args: Vec<String>,
    },
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Resolve the token from flag or environment, then through the secret
/// store when prefixed with `pass::`. A missing or unresolvable token is a
/// configuration error, raised here before any network call.
pub fn resolve_token(
    flag: Option<String>,
    resolver: &dyn SecretResolver,
) -> Result<String, UploadError> {
    let raw = flag
        .filter(|value| !value.is_empty())
        .or_else(|| TOKEN_ENV_VARS.iter().find_map(|key| env_value(key)));
    let Some(raw) = raw else {
        return Err(UploadError::Config(format!(
            "github token must be set (--token, or the {} / {} environment variable)",
            TOKEN_ENV_VARS[0], TOKEN_ENV_VARS[1]
        )));
    };
    match raw.strip_prefix(PASS_PREFIX) {
        Some(key) => resolver.resolve(key).map_err(|e| {
            UploadError::Config(format!("failed to resolve token from secret store: {e}"))
        }),
        None => Ok(raw),
    }
}

/// Resolve the author identity: flag, then environment, then local git
/// config. `None` means the pipeline's placeholder identity applies.
pub fn resolve_identity(
    author: Option<String>,
    email: Option<String>,
    identity: &dyn GitIdentity,
) -> (Option<String>, Option<String>) {
    let author = author
        .filter(|value| !value.is_empty())
        .or_else(|| env_value("GHUPLOAD_AUTHOR"))
        .or_else(|| identity.user_name());
    let email = email
        .filter(|value| !value.is_empty())
        .or_else(|| env_value("GHUPLOAD_EMAIL"))
        .or_else(|| identity.user_email());
    (author, email)
}

/// Async CLI entrypoint, also used by integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Upload {
            token,
            message,
            author,
            email,
            args,
        } => {
            let token = resolve_token(token, &PassSecretResolver)?;
            let (author, email) = resolve_identity(author, email, &GitConfigIdentity);

            // The destination is always the last argument.
            let (dest, sources) = args
                .split_last()
                .expect("clap enforces at least two positional arguments");
            let destination: Destination = dest.parse()?;
            tracing::info!(destination = %destination, sources = sources.len(), "upload requested");

            let request = UploadRequest {
                sources: sources.iter().map(PathBuf::from).collect(),
                destination,
                author,
                email,
                message,
            };
            let client = GitHubClient::new(token);
            let outcome = upload(&client, &request).await?;

            println!("commit has been created: {}", outcome.commit_url);
            println!(
                "branch {} has been updated to commit {}",
                outcome.branch, outcome.commit_sha
            );
            Ok(())
        }
    }
}
