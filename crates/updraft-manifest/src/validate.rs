//! Content validation: file size plus a base64-encoded SHA-1 digest.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::warn;

/// Size and digest of a file under the update root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub size: u64,
    /// Base64 (standard alphabet) encoding of the SHA-1 content digest.
    pub digest: String,
}

/// Validate `root/relative`.
///
/// A missing file is not an error: the reference simply ships without
/// size/digest and the installer skips verification for it. Unreadable
/// files get the same treatment, with a warning.
pub fn validate_file(root: &Path, relative: &str) -> Option<Validation> {
    let path = root.join(relative);
    if !path.is_file() {
        return None;
    }
    match digest_file(&path) {
        Ok(validation) => Some(validation),
        Err(e) => {
            warn!("skipping validation for {}: {e}", path.display());
            None
        }
    }
}

fn digest_file(path: &Path) -> io::Result<Validation> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let size = io::copy(&mut file, &mut hasher)?;
    let digest = STANDARD.encode(hasher.finalize());
    Ok(Validation { size, digest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn digests_known_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), b"hello world").unwrap();

        let v = validate_file(dir.path(), "hello.txt").unwrap();
        assert_eq!(v.size, 11);
        // SHA-1("hello world") = 2aae6c35c94fcfb415dbe95f408b9ce91ee846ed
        assert_eq!(v.digest, "Kq5sNclPz7QV2+lfQIuc6R7oRu0=");
    }

    #[test]
    fn digests_file_in_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("bin/app.exe"), b"payload").unwrap();

        let v = validate_file(dir.path(), "bin/app.exe").unwrap();
        assert_eq!(v.size, 7);
    }

    #[test]
    fn missing_file_is_skipped_silently() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(validate_file(dir.path(), "not-there.bin"), None);
    }

    #[test]
    fn directory_is_not_a_validatable_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(validate_file(dir.path(), "sub"), None);
    }

    #[test]
    fn empty_file_has_zero_size_and_a_digest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty"), b"").unwrap();

        let v = validate_file(dir.path(), "empty").unwrap();
        assert_eq!(v.size, 0);
        // SHA-1 of the empty input, base64-encoded
        assert_eq!(v.digest, "2jmj7l5rSw0yVb/vlWAYkK/YBwk=");
    }
}
