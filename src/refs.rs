//! HEAD and branch references.
//!
//! `HEAD` either names a branch (`ref: refs/heads/<name>`) or holds a
//! commit hash directly (detached). Branch files hold one bare hash.
//! [`update_head`] is the only function that moves the current position.
//!
//! Reference files are overwritten in place. A crash in the middle of a
//! write can leave a truncated file, which later reads report as
//! [`Error::MissingReference`].

use std::fmt;
use std::path::{Path, PathBuf};

use git2::Oid;

use crate::error::{Error, Result};
use crate::paths::rel_to_path;
use crate::reflog::{append_reflog, ZERO_SHA};
use crate::types::{parse_oid, ReflogEntry, Signature};

pub const HEAD_FILE: &str = "HEAD";
pub const BRANCH_PREFIX: &str = "refs/heads/";
const SYMREF_PREFIX: &str = "ref:";

/// Where `HEAD` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Full reference name, e.g. `refs/heads/main`.
    Symbolic(String),
    Detached(Oid),
}

impl Head {
    pub fn branch(name: &str) -> Self {
        Self::Symbolic(format!("{}{}", BRANCH_PREFIX, name))
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbolic(name) => write!(f, "{} {}", SYMREF_PREFIX, name),
            Self::Detached(oid) => write!(f, "{}", oid),
        }
    }
}

/// Read and parse `HEAD`.
///
/// # Errors
/// Returns [`Error::MissingReference`] if the file is absent or holds
/// neither a `ref:` line nor a full hash.
pub fn read_head(meta_dir: &Path) -> Result<Head> {
    let path = meta_dir.join(HEAD_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::missing_ref(HEAD_FILE));
        }
        Err(e) => return Err(Error::io(&path, e)),
    };
    let content = content.trim();

    if let Some(target) = content.strip_prefix(SYMREF_PREFIX) {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::missing_ref("HEAD is a symbolic reference with no target"));
        }
        return Ok(Head::Symbolic(target.to_string()));
    }

    parse_oid(content).map(Head::Detached).map_err(|_| {
        Error::missing_ref(format!("HEAD holds neither a reference nor a hash: {:?}", content))
    })
}

/// Overwrite `HEAD` with `head`.
pub fn set_head(meta_dir: &Path, head: &Head) -> Result<()> {
    let path = meta_dir.join(HEAD_FILE);
    let content = match head {
        Head::Symbolic(_) => format!("{}\n", head),
        Head::Detached(oid) => oid.to_string(),
    };
    std::fs::write(&path, content).map_err(|e| Error::io(&path, e))
}

/// Location of the file backing the reference `refname`.
pub fn ref_path(meta_dir: &Path, refname: &str) -> PathBuf {
    rel_to_path(meta_dir, refname)
}

/// Read a reference file. `Ok(None)` if it does not exist yet.
pub fn read_ref(meta_dir: &Path, refname: &str) -> Result<Option<Oid>> {
    let path = ref_path(meta_dir, refname);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(&path, e)),
    };
    parse_oid(&content).map(Some).map_err(|_| {
        Error::missing_ref(format!("{} does not hold a valid hash: {:?}", refname, content.trim()))
    })
}

/// The commit `HEAD` currently resolves to.
///
/// `Ok(None)` means the branch HEAD names has no commits yet.
pub fn resolve_head(meta_dir: &Path) -> Result<Option<Oid>> {
    match read_head(meta_dir)? {
        Head::Symbolic(refname) => read_ref(meta_dir, &refname),
        Head::Detached(oid) => Ok(Some(oid)),
    }
}

/// Short name of the checked-out branch, or `None` when detached.
pub fn current_branch(meta_dir: &Path) -> Result<Option<String>> {
    Ok(match read_head(meta_dir)? {
        Head::Symbolic(refname) => Some(
            refname
                .strip_prefix(BRANCH_PREFIX)
                .unwrap_or(&refname)
                .to_string(),
        ),
        Head::Detached(_) => None,
    })
}

/// Move the current position to `oid`.
///
/// With a symbolic HEAD the branch file is (re)written; when detached,
/// HEAD itself is. The move is recorded in the reflog on a best-effort
/// basis: a failed reflog append is logged and otherwise ignored.
pub fn update_head(meta_dir: &Path, oid: &Oid, signature: &Signature, reason: &str) -> Result<()> {
    let head = read_head(meta_dir)?;
    let old = match &head {
        Head::Symbolic(refname) => read_ref(meta_dir, refname).unwrap_or(None),
        Head::Detached(old) => Some(*old),
    };

    match &head {
        Head::Symbolic(refname) => {
            let path = ref_path(meta_dir, refname);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            std::fs::write(&path, oid.to_string()).map_err(|e| Error::io(&path, e))?;
            log::debug!("{} -> {}", refname, oid);
        }
        Head::Detached(_) => {
            set_head(meta_dir, &Head::Detached(*oid))?;
            log::debug!("HEAD (detached) -> {}", oid);
        }
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let entry = ReflogEntry {
        old_sha: old.map(|o| o.to_string()).unwrap_or_else(|| ZERO_SHA.to_string()),
        new_sha: oid.to_string(),
        committer: signature.to_string(),
        timestamp: now.as_secs(),
        message: reason.to_string(),
    };
    if let Err(e) = append_reflog(meta_dir, &entry) {
        log::warn!("could not append reflog entry: {}", e);
    }

    Ok(())
}
