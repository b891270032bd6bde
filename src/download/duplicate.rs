//! Local duplicate detection.
//!
//! A destination file counts as already downloaded when it exists and its
//! byte length equals the size listed for it. There is no checksum.

use std::path::{Component, Path, PathBuf};

use tracing::trace;

/// Joins a destination key under `dest_root`.
///
/// Root, prefix and `.` components of the key are dropped, so an absolute key such
/// as `/a/b` lands at `dest_root/a/b` instead of replacing the root.
#[must_use]
pub fn destination_path(dest_root: &Path, key: &str) -> PathBuf {
    let relative: PathBuf = Path::new(key)
        .components()
        .filter(|component| {
            !matches!(
                component,
                Component::RootDir | Component::Prefix(_) | Component::CurDir
            )
        })
        .collect();
    dest_root.join(relative)
}

/// Reports whether `dest_root/key` already holds a regular file of exactly
/// `expected_size` bytes.
///
/// Any metadata error, including not-found, means "not a duplicate".
pub async fn is_local_duplicate(dest_root: &Path, key: &str, expected_size: i64) -> bool {
    let path = destination_path(dest_root, key);
    let Ok(metadata) = tokio::fs::metadata(&path).await else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    let matches = i64::try_from(metadata.len()).is_ok_and(|len| len == expected_size);
    trace!(
        path = %path.display(),
        local_size = metadata.len(),
        expected_size,
        matches,
        "checked local file"
    );
    matches
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(root: &Path, key: &str, len: usize) {
        let path = root.join(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, vec![b'x'; len]).unwrap();
    }

    #[tokio::test]
    async fn test_exact_size_is_duplicate() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a/b/file.bin", 42);
        assert!(is_local_duplicate(dir.path(), "a/b/file.bin", 42).await);
    }

    #[tokio::test]
    async fn test_different_size_is_not_duplicate() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "file.bin", 42);
        assert!(!is_local_duplicate(dir.path(), "file.bin", 41).await);
        assert!(!is_local_duplicate(dir.path(), "file.bin", 43).await);
        assert!(!is_local_duplicate(dir.path(), "file.bin", -42).await);
    }

    #[tokio::test]
    async fn test_missing_file_is_never_duplicate() {
        let dir = TempDir::new().unwrap();
        assert!(!is_local_duplicate(dir.path(), "missing.bin", 0).await);
        assert!(!is_local_duplicate(dir.path(), "missing.bin", 100).await);
    }

    #[tokio::test]
    async fn test_empty_file_matches_zero() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "empty", 0);
        assert!(is_local_duplicate(dir.path(), "empty", 0).await);
    }

    #[tokio::test]
    async fn test_directory_is_not_duplicate() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("subdir")).unwrap();
        let dir_len = std::fs::metadata(dir.path().join("subdir")).unwrap().len();
        let dir_len = i64::try_from(dir_len).unwrap();
        assert!(!is_local_duplicate(dir.path(), "subdir", dir_len).await);
    }

    #[tokio::test]
    async fn test_absolute_key_stays_under_root() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "abs/file.bin", 3);
        assert!(is_local_duplicate(dir.path(), "/abs/file.bin", 3).await);
    }

    #[test]
    fn test_destination_path_joins_relative_key() {
        let root = Path::new("/srv/mirror");
        assert_eq!(
            destination_path(root, "pkg/a.tar.gz"),
            PathBuf::from("/srv/mirror/pkg/a.tar.gz")
        );
        assert_eq!(
            destination_path(root, "/pkg/a.tar.gz"),
            PathBuf::from("/srv/mirror/pkg/a.tar.gz")
        );
        assert_eq!(
            destination_path(root, "./pkg/a.tar.gz"),
            PathBuf::from("/srv/mirror/pkg/a.tar.gz")
        );
    }

    #[tokio::test]
    async fn test_check_is_read_only() {
        let dir = TempDir::new().unwrap();
        let _ = is_local_duplicate(dir.path(), "nested/never/created.bin", 1).await;
        assert!(!dir.path().join("nested").exists());
    }
}
