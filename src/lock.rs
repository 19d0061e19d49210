use std::path::Path;

use fs2::FileExt;

use crate::error::{Error, Result};

pub const LOCK_FILE: &str = "orma.lock";

/// Hold an exclusive advisory lock on `<meta>/orma.lock` while `f` runs.
///
/// Serializes HEAD read-modify-write sequences between cooperating
/// processes. Blocks until the lock is available. The lock is released when
/// `f` returns, on both the success and the error path.
pub fn with_repo_lock<F, T>(meta_dir: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lock_path = meta_dir.join(LOCK_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    file.lock_exclusive().map_err(|e| Error::io(&lock_path, e))?;
    log::trace!("acquired {}", lock_path.display());

    let result = f();

    if let Err(e) = FileExt::unlock(&file) {
        log::warn!("failed to release {}: {}", lock_path.display(), e);
    }
    result
}
