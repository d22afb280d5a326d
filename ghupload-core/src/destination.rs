//! Destination specifier grammar: `owner/repo[@branch]:path`.

use std::fmt;
use std::str::FromStr;

use crate::error::UploadError;

/// Parsed upload destination.
///
/// `branch` is `None` when the specifier had no `@branch` part; the
/// pipeline then resolves it to the repository's default branch. A
/// trailing `/` on `path` means "upload into this directory" and is the
/// sole switch between single-file and multi-source/directory modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub path: String,
}

impl Destination {
    /// Whether the destination path denotes a directory to upload into.
    pub fn is_dir_upload(&self) -> bool {
        self.path.ends_with('/')
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(branch) => write!(f, "{}/{}@{}:{}", self.owner, self.repo, branch, self.path),
            None => write!(f, "{}/{}:{}", self.owner, self.repo, self.path),
        }
    }
}

impl FromStr for Destination {
    type Err = UploadError;

    /// Parse `owner/repo[@branch]:path`.
    ///
    /// Splits on the first `:`, then the first `/`, then the first `@`.
    /// Every component must be non-empty; anything else is a parse error
    /// carrying the offending input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || UploadError::Parse(s.to_string());

        let (repo_spec, path) = s.split_once(':').ok_or_else(err)?;
        if path.is_empty() {
            return Err(err());
        }

        let (owner, rest) = repo_spec.split_once('/').ok_or_else(err)?;
        if owner.is_empty() || rest.is_empty() {
            return Err(err());
        }

        let (repo, branch) = match rest.split_once('@') {
            Some((repo, branch)) => {
                if repo.is_empty() || branch.is_empty() {
                    return Err(err());
                }
                (repo, Some(branch.to_string()))
            }
            None => (rest, None),
        };

        Ok(Destination {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch,
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Destination, UploadError> {
        s.parse()
    }

    #[test]
    fn parses_destination_with_branch() {
        let dst = parse("acme/widgets@main:docs/").unwrap();
        assert_eq!(dst.owner, "acme");
        assert_eq!(dst.repo, "widgets");
        assert_eq!(dst.branch.as_deref(), Some("main"));
        assert_eq!(dst.path, "docs/");
        assert!(dst.is_dir_upload());
    }

    #[test]
    fn parses_destination_without_branch() {
        let dst = parse("acme/widgets:README.md").unwrap();
        assert_eq!(dst.owner, "acme");
        assert_eq!(dst.repo, "widgets");
        assert_eq!(dst.branch, None);
        assert_eq!(dst.path, "README.md");
        assert!(!dst.is_dir_upload());
    }

    #[test]
    fn branch_splits_on_first_at_sign() {
        let dst = parse("o/r@feat@two:p").unwrap();
        assert_eq!(dst.repo, "r");
        assert_eq!(dst.branch.as_deref(), Some("feat@two"));
    }

    #[test]
    fn path_splits_on_first_colon() {
        let dst = parse("o/r:a:b").unwrap();
        assert_eq!(dst.path, "a:b");
    }

    #[test]
    fn deep_destination_path_is_kept_verbatim() {
        let dst = parse("acme/widgets:docs/notes/today.txt").unwrap();
        assert_eq!(dst.path, "docs/notes/today.txt");
    }

    #[test]
    fn rejects_malformed_destinations() {
        for bad in [
            "badformat",
            "",
            "acme/widgets",  // no colon
            "acme:path",     // no slash
            "/widgets:path", // empty owner
            "acme/:path",    // empty repo
            "acme/widgets:", // empty path
            "acme/widgets@:path", // empty branch
            "acme/@main:path",    // empty repo with branch
        ] {
            let res = parse(bad);
            assert!(
                matches!(res, Err(UploadError::Parse(ref s)) if s == bad),
                "expected parse error for {bad:?}, got {res:?}"
            );
        }
    }

    #[test]
    fn display_round_trips() {
        for spec in ["acme/widgets@main:docs/", "acme/widgets:README.md"] {
            let dst = parse(spec).unwrap();
            assert_eq!(dst.to_string(), spec);
        }
    }
}
