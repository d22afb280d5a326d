//! Git blob object ids, computed locally for remote dedup.

use sha1::{Digest, Sha1};

/// Compute the Git object id of a blob holding `content`.
///
/// Git hashes the object header (`blob {len}\0`) followed by the raw
/// content, with SHA-1. The result is what `git hash-object` prints and
/// what the host reports as the blob's `sha`, which is what makes the
/// already-uploaded check possible without a network round-trip per byte.
pub fn blob_sha(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_matches_git() {
        // git hash-object /dev/null
        assert_eq!(blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn hello_blob_matches_git() {
        // echo hello | git hash-object --stdin
        assert_eq!(
            blob_sha(b"hello\n"),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn binary_content_is_hashed_raw() {
        let a = blob_sha(&[0u8, 159, 146, 150]);
        let b = blob_sha(&[0u8, 159, 146, 151]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 40);
    }
}
