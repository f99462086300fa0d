//! Path codec: logical paths <-> ledger document ids
//!
//! Files never end with the separator, folders always do. Folder markers are
//! shallow: a folder's descendants are found purely by path-prefix order, so
//! everything under `/a/` sorts inside `[/a/, /a/<MAX>)`.

use crate::{FsError, Result};
use galactic_ledger::PathRange;

pub const SEPARATOR: char = '/';

const FILE_PREFIX: &str = "file:";
const FOLDER_PREFIX: &str = "folder:";

/// Document id of a file path
pub fn file_id(path: &str) -> String {
    format!("{}{}", FILE_PREFIX, path)
}

/// Document id of a folder path
pub fn folder_id(path: &str) -> String {
    format!("{}{}", FOLDER_PREFIX, path)
}

pub fn is_folder_path(path: &str) -> bool {
    path.ends_with(SEPARATOR)
}

/// True if the path contains a glob wildcard
pub fn is_pattern(path: &str) -> bool {
    path.contains('*')
}

/// Range covering a folder's own marker and all of its descendants
pub fn subtree_range(folder_path: &str) -> PathRange {
    PathRange::new(folder_path, format!("{}{}", folder_path, char::MAX))
}

/// Number of non-empty segments
pub fn segment_count(path: &str) -> usize {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).count()
}

/// Display name: last segment for files, last non-empty segment for
/// folders, `/` for the root
pub fn entry_name(path: &str) -> String {
    if is_folder_path(path) {
        path.split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or("/")
            .to_string()
    } else {
        path.rsplit(SEPARATOR).next().unwrap_or(path).to_string()
    }
}

/// Same path with a trailing separator
pub fn as_folder_path(path: &str) -> String {
    if is_folder_path(path) {
        path.to_string()
    } else {
        format!("{}{}", path, SEPARATOR)
    }
}

/// Reject paths the namespace cannot address
pub fn validate(path: &str) -> Result<()> {
    if !path.starts_with(SEPARATOR) {
        return Err(FsError::InvalidPath(format!(
            "path must start with '/': {:?}",
            path
        )));
    }
    if path.contains('\0') {
        return Err(FsError::InvalidPath(format!(
            "path cannot contain null bytes: {:?}",
            path
        )));
    }
    if path.contains(char::MAX) {
        return Err(FsError::InvalidPath(format!(
            "path cannot contain U+10FFFF: {:?}",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(file_id("/a/b.txt"), "file:/a/b.txt");
        assert_eq!(folder_id("/a/"), "folder:/a/");
    }

    #[test]
    fn test_subtree_range_covers_descendants_only() {
        let range = subtree_range("/docs/");
        assert!(range.contains("/docs/"));
        assert!(range.contains("/docs/a.txt"));
        assert!(range.contains("/docs/deep/er/z.txt"));
        assert!(range.contains("/docs/\u{FFFF}"));
        assert!(!range.contains("/docs"));
        assert!(!range.contains("/docs2/a.txt"));
        assert!(!range.contains("/doc/"));
    }

    #[test]
    fn test_names() {
        assert_eq!(entry_name("/a/b.txt"), "b.txt");
        assert_eq!(entry_name("/a/sub/"), "sub");
        assert_eq!(entry_name("/"), "/");
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count("/"), 0);
        assert_eq!(segment_count("/a/"), 1);
        assert_eq!(segment_count("/a/b/c.txt"), 3);
    }

    #[test]
    fn test_validate() {
        assert!(validate("/ok.txt").is_ok());
        assert!(validate("relative.txt").is_err());
        assert!(validate("").is_err());
        assert!(validate("/bad\0").is_err());
    }

    #[test]
    fn test_as_folder_path() {
        assert_eq!(as_folder_path("/a"), "/a/");
        assert_eq!(as_folder_path("/a/"), "/a/");
    }
}
