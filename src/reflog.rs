use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ReflogEntry;

/// The hash recorded as "previous value" when HEAD had no commit yet.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

fn reflog_path(meta_dir: &Path) -> PathBuf {
    meta_dir.join("logs").join("HEAD")
}

/// Read every HEAD movement, oldest first.
///
/// Returns an empty vec if nothing has been logged yet. Lines that do not
/// parse are skipped.
pub fn read_reflog(meta_dir: &Path) -> Result<Vec<ReflogEntry>> {
    let log_path = reflog_path(meta_dir);
    let content = match std::fs::read_to_string(&log_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(Error::io(&log_path, e)),
    };

    Ok(content.lines().filter_map(parse_line).collect())
}

/// Format: `<old> <new> <name> <<email>> <timestamp> +0000\t<message>`.
fn parse_line(line: &str) -> Option<ReflogEntry> {
    let (before_tab, message) = line.split_once('\t').unwrap_or((line, ""));
    let (old_sha, rest) = before_tab.split_once(' ')?;
    let (new_sha, rest) = rest.split_once(' ')?;
    let (rest, _tz) = rest.rsplit_once(' ')?;
    let (committer, timestamp) = rest.rsplit_once(' ')?;
    Some(ReflogEntry {
        old_sha: old_sha.to_string(),
        new_sha: new_sha.to_string(),
        committer: committer.to_string(),
        timestamp: timestamp.parse().ok()?,
        message: message.to_string(),
    })
}

/// Append one entry to `<meta>/logs/HEAD`, creating the directory if needed.
pub fn append_reflog(meta_dir: &Path, entry: &ReflogEntry) -> Result<()> {
    let log_path = reflog_path(meta_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| Error::io(&log_path, e))?;

    // Messages are single-line in the log.
    let message = entry.message.replace('\n', " ");
    writeln!(
        f,
        "{} {} {} {} +0000\t{}",
        entry.old_sha, entry.new_sha, entry.committer, entry.timestamp, message,
    )
    .map_err(|e| Error::io(&log_path, e))?;

    Ok(())
}
