//! Tree assembly: walk local sources into flat tree entries for one commit.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::contract::{GitHost, TreeEntry, REGULAR_FILE_MODE};
use crate::destination::Destination;
use crate::error::UploadError;
use crate::hash::blob_sha;

/// Turn the source paths into tree entries, creating blobs on the host for
/// content it does not already have.
///
/// Walking and validation are entirely local and happen first; remote calls
/// start only once every file is known. Files are processed one at a time,
/// in walk order, with no concurrent blob creation.
pub async fn build_entries<H: GitHost>(
    host: &H,
    dest: &Destination,
    sources: &[PathBuf],
) -> Result<Vec<TreeEntry>, UploadError> {
    let files = collect_sources(dest, sources)?;

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let content = fs::read(&file.local_path)?;
        let sha = blob_sha(&content);

        let sha = if host
            .blob_exists(&dest.owner, &dest.repo, &sha)
            .await
            .map_err(UploadError::remote)?
        {
            debug!(path = %file.local_path.display(), sha = %sha, "blob already on remote, skipping upload");
            sha
        } else {
            let created = host
                .create_blob(&dest.owner, &dest.repo, &content)
                .await
                .map_err(UploadError::remote)?;
            debug!(path = %file.local_path.display(), sha = %created, "created blob");
            created
        };

        entries.push(TreeEntry {
            path: file.repo_path,
            mode: REGULAR_FILE_MODE.to_string(),
            sha,
        });
    }

    info!(count = entries.len(), "assembled tree entries");
    Ok(entries)
}

/// A walked source file paired with its path in the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceFile {
    pub local_path: PathBuf,
    pub repo_path: String,
}

/// Walk the sources and compute each file's repo-relative path.
///
/// Fails before any remote call on ambiguous invocations: several sources,
/// or a directory source expanding to several files, without a
/// `/`-terminated destination. Symlinks and non-unicode file names fail
/// outright, never skipped.
pub(crate) fn collect_sources(
    dest: &Destination,
    sources: &[PathBuf],
) -> Result<Vec<SourceFile>, UploadError> {
    if !dest.is_dir_upload() && sources.len() > 1 {
        return Err(UploadError::Argument(
            "destination path must end with '/' to upload multiple sources".to_string(),
        ));
    }

    let mut files = Vec::new();
    for source in sources {
        let meta = fs::symlink_metadata(source)?;
        if meta.file_type().is_symlink() {
            return Err(UploadError::UnsupportedFile {
                path: source.clone(),
                reason: "symlink",
            });
        }
        if meta.is_dir() {
            visit_dir(source, &mut files)?;
        } else {
            files.push(source.clone());
        }
    }

    if !dest.is_dir_upload() && files.len() > 1 {
        return Err(UploadError::Argument(
            "destination names a single file but sources expand to several; end it with '/'"
                .to_string(),
        ));
    }

    let mut out = Vec::with_capacity(files.len());
    for local_path in files {
        let repo_path = if dest.is_dir_upload() {
            join_repo_path(&dest.path, &slash_path(&local_path)?)
        } else {
            dest.path.clone()
        };
        out.push(SourceFile {
            local_path,
            repo_path,
        });
    }
    Ok(out)
}

/// Recursive walk, directory entries sorted by name so tree construction is
/// deterministic across filesystems.
fn visit_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), UploadError> {
    let mut children: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    children.sort();

    for path in children {
        let meta = fs::symlink_metadata(&path)?;
        if meta.file_type().is_symlink() {
            return Err(UploadError::UnsupportedFile {
                path,
                reason: "symlink",
            });
        }
        if meta.is_dir() {
            visit_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Render a local path with forward slashes, dropping `.` and root prefixes,
/// so it can be joined onto a repo path. A non-unicode component would land
/// in the tree under a corrupted name, so it is rejected like a symlink.
fn slash_path(path: &Path) -> Result<String, UploadError> {
    let mut segments = Vec::new();
    for component in path.components() {
        if let Component::Normal(os) = component {
            match os.to_str() {
                Some(segment) => segments.push(segment),
                None => {
                    return Err(UploadError::UnsupportedFile {
                        path: path.to_path_buf(),
                        reason: "non-unicode file name",
                    })
                }
            }
        }
    }
    Ok(segments.join("/"))
}

/// Join a destination directory (possibly `/`-terminated or bare) with a
/// repo-relative file path.
fn join_repo_path(dir: &str, rel: &str) -> String {
    let base = dir.trim_end_matches('/');
    if base.is_empty() {
        rel.to_string()
    } else {
        format!("{base}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn dest(path: &str) -> Destination {
        Destination {
            owner: "acme".into(),
            repo: "widgets".into(),
            branch: None,
            path: path.into(),
        }
    }

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut f = File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn single_file_uses_destination_path_verbatim() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("notes.txt");
        touch(&src, "notes");

        let files = collect_sources(&dest("docs/notes.txt"), &[src.clone()]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].local_path, src);
        assert_eq!(files[0].repo_path, "docs/notes.txt");
    }

    #[test]
    fn dir_destination_joins_walked_path() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("notes.txt");
        touch(&src, "notes");

        let files = collect_sources(&dest("docs/"), &[src.clone()]).unwrap();
        assert_eq!(
            files[0].repo_path,
            join_repo_path("docs/", &slash_path(&src).unwrap())
        );
        assert!(files[0].repo_path.starts_with("docs/"));
        assert!(files[0].repo_path.ends_with("/notes.txt"));
    }

    #[test]
    fn directory_source_walks_recursively_and_sorted() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        touch(&root.join("b.txt"), "b");
        touch(&root.join("a.txt"), "a");
        touch(&root.join("sub/c.txt"), "c");

        let files = collect_sources(&dest("up/"), &[root.clone()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.local_path.strip_prefix(&root).unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub/c.txt")
            ]
        );
        assert!(files[2].repo_path.ends_with("/sub/c.txt"));
    }

    #[test]
    fn multiple_sources_require_dir_destination() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        touch(&a, "a");
        touch(&b, "b");

        let res = collect_sources(&dest("docs/notes.txt"), &[a, b]);
        assert!(matches!(res, Err(UploadError::Argument(_))));
    }

    #[test]
    fn directory_source_with_file_destination_is_ambiguous() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        touch(&root.join("a.txt"), "a");
        touch(&root.join("b.txt"), "b");

        let res = collect_sources(&dest("docs/notes.txt"), &[root]);
        assert!(matches!(res, Err(UploadError::Argument(_))));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_source_is_rejected() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("real.txt");
        touch(&target, "real");
        let link = tmp.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let res = collect_sources(&dest("docs/"), &[link.clone()]);
        assert!(matches!(res, Err(UploadError::UnsupportedFile { path, .. }) if path == link));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_directory_is_rejected() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("proj");
        touch(&root.join("a.txt"), "a");
        std::os::unix::fs::symlink(root.join("a.txt"), root.join("alias.txt")).unwrap();

        let res = collect_sources(&dest("docs/"), &[root]);
        assert!(matches!(res, Err(UploadError::UnsupportedFile { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_file_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let path = tmp.path().join(OsStr::from_bytes(b"bad\xff.txt"));
        touch(&path, "x");

        let res = collect_sources(&dest("docs/"), &[path.clone()]);
        assert!(
            matches!(
                res,
                Err(UploadError::UnsupportedFile { path: ref p, reason }) if *p == path && reason == "non-unicode file name"
            ),
            "got {res:?}"
        );
    }

    #[test]
    fn missing_source_is_io_error() {
        let res = collect_sources(&dest("docs/"), &[PathBuf::from("/no/such/file")]);
        assert!(matches!(res, Err(UploadError::Io(_))));
    }

    #[test]
    fn repo_path_joining() {
        assert_eq!(join_repo_path("docs/", "notes.txt"), "docs/notes.txt");
        assert_eq!(join_repo_path("docs", "notes.txt"), "docs/notes.txt");
        assert_eq!(join_repo_path("/", "notes.txt"), "notes.txt");
        assert_eq!(
            join_repo_path("a/b/", "c/d.txt"),
            "a/b/c/d.txt"
        );
    }

    #[test]
    fn slash_path_drops_relative_prefixes() {
        assert_eq!(slash_path(Path::new("./dir/f.txt")).unwrap(), "dir/f.txt");
        assert_eq!(slash_path(Path::new("dir/f.txt")).unwrap(), "dir/f.txt");
    }
}
