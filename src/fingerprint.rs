/// Content fingerprinting of dependency source files.
use std::path::Path;

use sha2::{Digest as _, Sha256};

use crate::error::Error;
use crate::types::Fingerprint;

/// Compute the SHA-256 content fingerprint of a file.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, Error> {
    let bytes = std::fs::read(path)?;
    let hash = Sha256::digest(&bytes);
    return Ok(Fingerprint(format!("{hash:x}")));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::fingerprint_file;

    #[test]
    fn same_content_same_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.php");
        let b = dir.path().join("b.php");
        std::fs::write(&a, "<?php class Foo {}\n").unwrap();
        std::fs::write(&b, "<?php class Foo {}\n").unwrap();

        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn changed_content_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.php");
        std::fs::write(&path, "<?php class Foo {}\n").unwrap();
        let before = fingerprint_file(&path).unwrap();
        std::fs::write(&path, "<?php class Foo { public int $id; }\n").unwrap();

        assert_ne!(before, fingerprint_file(&path).unwrap());
    }
}
