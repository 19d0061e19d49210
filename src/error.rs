use std::path::{Path, PathBuf};

/// All errors produced by orma.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not an orma repository (no .orma directory under {})", .0.display())]
    RepositoryNotInitialized(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("not a commit: {0}")]
    NotACommit(String),

    #[error("not a tree: {0}")]
    NotATree(String),

    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("ambiguous object name {prefix}: matches {}", .candidates.join(", "))]
    AmbiguousObject {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("hash error: {0}")]
    Hash(#[source] git2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn not_initialized(root: impl Into<PathBuf>) -> Self {
        Self::RepositoryNotInitialized(root.into())
    }

    pub fn not_found(oid: impl Into<String>) -> Self {
        Self::ObjectNotFound(oid.into())
    }

    pub fn corrupt(oid: impl ToString, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_a_commit(oid: impl ToString) -> Self {
        Self::NotACommit(oid.to_string())
    }

    pub fn not_a_tree(oid: impl ToString) -> Self {
        Self::NotATree(oid.to_string())
    }

    pub fn missing_ref(name: impl Into<String>) -> Self {
        Self::MissingReference(name.into())
    }

    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Wrap an I/O error, prefixing the message with the offending path.
    pub fn io(path: impl AsRef<Path>, err: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.as_ref().display(), err),
        ))
    }

    /// `true` for errors reporting a missing object or reference.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_) | Self::MissingReference(_))
    }
}
