use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::META_DIR;

/// Validate a branch name before it is written into `HEAD`.
///
/// Branch names become file paths under `refs/heads/`, so anything that
/// could escape that directory or confuse the `ref: ` line is rejected:
/// whitespace, control characters, `..`, empty segments, a leading or
/// trailing `/`, a trailing `.` and the `.lock` suffix.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_args("branch name must not be empty"));
    }

    if let Some(ch) = name.chars().find(|c| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, ':' | '\\' | '~' | '^' | '?' | '*' | '[')
    }) {
        return Err(Error::invalid_args(format!(
            "branch name contains invalid character: {:?}",
            ch
        )));
    }

    if name.contains("..") {
        return Err(Error::invalid_args("branch name must not contain '..'"));
    }

    if name.split('/').any(|seg| seg.is_empty() || seg == ".") {
        return Err(Error::invalid_args(format!(
            "branch name has an empty or '.' segment: {:?}",
            name
        )));
    }

    if name.ends_with('.') || name.ends_with(".lock") {
        return Err(Error::invalid_args(format!(
            "branch name must not end with '.' or '.lock': {:?}",
            name
        )));
    }

    Ok(())
}

/// Join a slash-separated relative path and a child name.
pub fn join_rel(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Turn a slash-separated relative path into a filesystem path under `root`.
pub fn rel_to_path(root: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|seg| !seg.is_empty())
        .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
}

/// Reject tree entry names that would escape the checkout target or write
/// into the metadata directory.
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name == META_DIR
        || name.contains('/')
        || name.contains('\0')
    {
        return Err(Error::invalid_args(format!(
            "unsafe tree entry name: {:?}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_ref_ok() {
        assert!(validate_ref_name("main").is_ok());
        assert!(validate_ref_name("feature/login").is_ok());
    }

    #[test]
    fn validate_ref_rejects_space() {
        assert!(validate_ref_name("my branch").is_err());
    }

    #[test]
    fn validate_ref_rejects_dotdot() {
        assert!(validate_ref_name("a..b").is_err());
        assert!(validate_ref_name("../escape").is_err());
    }

    #[test]
    fn validate_ref_rejects_bad_segments() {
        assert!(validate_ref_name("/main").is_err());
        assert!(validate_ref_name("main/").is_err());
        assert!(validate_ref_name("a//b").is_err());
        assert!(validate_ref_name("./a").is_err());
    }

    #[test]
    fn validate_ref_rejects_suffixes() {
        assert!(validate_ref_name("main.").is_err());
        assert!(validate_ref_name("main.lock").is_err());
    }

    #[test]
    fn validate_ref_rejects_empty() {
        assert!(validate_ref_name("").is_err());
    }

    #[test]
    fn join_rel_root() {
        assert_eq!(join_rel("", "a.txt"), "a.txt");
        assert_eq!(join_rel("dir/sub", "a.txt"), "dir/sub/a.txt");
    }

    #[test]
    fn rel_to_path_splits_segments() {
        let root = Path::new("/work");
        assert_eq!(rel_to_path(root, "dir/a.txt"), Path::new("/work/dir/a.txt"));
        assert_eq!(rel_to_path(root, ""), Path::new("/work"));
    }

    #[test]
    fn entry_name_rejects_traversal() {
        assert!(validate_entry_name("..").is_err());
        assert!(validate_entry_name("a/b").is_err());
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name(".orma").is_err());
        assert!(validate_entry_name("ok.txt").is_ok());
        assert!(validate_entry_name(".ormaignore").is_ok());
    }
}
