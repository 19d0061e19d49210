use std::fmt;

use git2::Oid;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Mode constants
// ---------------------------------------------------------------------------

pub const MODE_BLOB: u32 = 0o100644;
pub const MODE_TREE: u32 = 0o040000;

/// Name of the metadata directory at the working root.
pub const META_DIR: &str = ".orma";

/// Name of the optional ignore file at the working root.
pub const IGNORE_FILE: &str = ".ormaignore";

/// Length of the abbreviated hashes printed by the CLI.
pub const SHORT_HASH_LEN: usize = 7;

/// Abbreviate a hash for display.
pub fn short_hash(oid: &Oid) -> String {
    abbreviate(&oid.to_string()).to_string()
}

/// First [`SHORT_HASH_LEN`] characters of a hex string read from disk.
///
/// Shorter or non-ASCII input is returned unchanged.
pub fn abbreviate(hex: &str) -> &str {
    hex.get(..SHORT_HASH_LEN).unwrap_or(hex)
}

// ---------------------------------------------------------------------------
// ObjectKind
// ---------------------------------------------------------------------------

/// The closed set of object kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// The ASCII tag written in the object frame header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a frame header tag. Returns `None` for anything outside the enum.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(Self::Blob),
            b"tree" => Some(Self::Tree),
            b"commit" => Some(Self::Commit),
            _ => None,
        }
    }

    pub(crate) fn to_git(self) -> git2::ObjectType {
        match self {
            Self::Blob => git2::ObjectType::Blob,
            Self::Tree => git2::ObjectType::Tree,
            Self::Commit => git2::ObjectType::Commit,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TreeEntry
// ---------------------------------------------------------------------------

/// One `(mode, name, oid)` record inside a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: u32,
    pub name: String,
    pub oid: Oid,
}

impl TreeEntry {
    pub fn blob(name: impl Into<String>, oid: Oid) -> Self {
        Self {
            mode: MODE_BLOB,
            name: name.into(),
            oid,
        }
    }

    pub fn tree(name: impl Into<String>, oid: Oid) -> Self {
        Self {
            mode: MODE_TREE,
            name: name.into(),
            oid,
        }
    }

    pub fn is_tree(&self) -> bool {
        self.mode == MODE_TREE
    }
}

// ---------------------------------------------------------------------------
// Signature / CommitInfo
// ---------------------------------------------------------------------------

/// Author/committer identity recorded in every commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            name: "orma".into(),
            email: "orma@localhost".into(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A decoded commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub oid: Oid,
    pub tree: Oid,
    pub parent: Option<Oid>,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub message: String,
}

/// One step of the history walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub oid: Oid,
    pub message: String,
}

// ---------------------------------------------------------------------------
// ReflogEntry
// ---------------------------------------------------------------------------

/// A single reflog entry.
#[derive(Debug, Clone)]
pub struct ReflogEntry {
    pub old_sha: String,
    pub new_sha: String,
    pub committer: String,
    pub timestamp: u64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Outcomes and reports
// ---------------------------------------------------------------------------

/// Result of `Repository::init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyExists,
}

/// Result of a successful `Repository::save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub commit: Oid,
    pub tree: Oid,
    pub parent: Option<Oid>,
}

/// Paths touched by a checkout, relative to the target directory.
#[derive(Debug, Clone, Default)]
pub struct CheckoutReport {
    pub written: Vec<String>,
    pub removed: Vec<String>,
}

impl CheckoutReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of paths written or removed.
    pub fn total(&self) -> usize {
        self.written.len() + self.removed.len()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options for `Repository::revert`.
#[derive(Debug, Clone, Default)]
pub struct RevertOptions {
    /// Also delete files tracked by the current HEAD tree that the target
    /// tree does not contain. Untracked files are never removed.
    pub prune: bool,
}

/// Options for `Repository::history`.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub limit: Option<usize>,
}

/// Options for opening or creating a `Repository`.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Branch HEAD points at after `init` (default `main`).
    pub branch: Option<String>,
    /// Author name recorded in commits.
    pub author: Option<String>,
    /// Author email recorded in commits.
    pub email: Option<String>,
}

impl OpenOptions {
    pub(crate) fn signature(&self) -> Signature {
        let default = Signature::default();
        Signature {
            name: self.author.clone().unwrap_or(default.name),
            email: self.email.clone().unwrap_or(default.email),
        }
    }

    pub(crate) fn branch_name(&self) -> Result<String> {
        let name = self.branch.clone().unwrap_or_else(|| "main".into());
        crate::paths::validate_ref_name(&name)?;
        Ok(name)
    }
}

// ---------------------------------------------------------------------------
// Hash parsing
// ---------------------------------------------------------------------------

/// Parse a full 40-character hex hash.
///
/// `git2::Oid::from_str` accepts short input and zero-pads it, so the length
/// is checked here first.
pub fn parse_oid(hex: &str) -> Result<Oid> {
    let hex = hex.trim();
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_args(format!(
            "expected a 40-character hex hash, got {:?}",
            hex
        )));
    }
    Oid::from_str(hex).map_err(Error::Hash)
}
