use git2::Oid;

use crate::error::{Error, Result};
use crate::odb::ObjectStore;
use crate::types::{parse_oid, CommitInfo, ObjectKind, Signature};

/// Literal accepted in place of a parent hash to mean "no parent".
pub const NULL_SENTINEL: &str = "null";

/// Whether `arg` is the "no parent" sentinel (`null` or empty).
pub fn is_null_sentinel(arg: &str) -> bool {
    let arg = arg.trim();
    arg.is_empty() || arg.eq_ignore_ascii_case(NULL_SENTINEL)
}

/// Build the text payload of a commit.
///
/// Layout: `tree`, optional `parent`, `author`, `committer`, a blank line,
/// then the message followed by a newline. No timestamp is recorded, so the
/// payload is a pure function of the arguments.
pub fn encode_commit(
    tree: &Oid,
    parent: Option<&Oid>,
    message: &str,
    signature: &Signature,
) -> String {
    let mut lines = vec![format!("tree {}", tree)];
    if let Some(parent) = parent {
        lines.push(format!("parent {}", parent));
    }
    lines.push(format!("author {}", signature));
    lines.push(format!("committer {}", signature));
    lines.push(format!("\n{}\n", message));
    lines.join("\n")
}

/// Write a commit object and return its id.
///
/// The tree and parent are recorded as given; they are not required to be
/// present in the store.
pub fn commit(
    odb: &ObjectStore,
    tree: &Oid,
    parent: Option<&Oid>,
    message: &str,
    signature: &Signature,
) -> Result<Oid> {
    let payload = encode_commit(tree, parent, message, signature);
    let oid = odb.write(ObjectKind::Commit, payload.as_bytes())?;
    log::debug!(
        "commit {} tree {} parent {}",
        oid,
        tree,
        parent.map(|p| p.to_string()).unwrap_or_else(|| NULL_SENTINEL.into())
    );
    Ok(oid)
}

/// Decode a commit payload read from `oid`.
pub fn decode_commit(oid: &Oid, payload: &[u8]) -> Result<CommitInfo> {
    let text = String::from_utf8_lossy(payload);
    let (headers, message) = match text.split_once("\n\n") {
        Some((headers, message)) => (headers, message),
        None => (text.trim_end_matches('\n'), ""),
    };

    let mut tree = None;
    let mut parent = None;
    let mut author = None;
    let mut committer = None;

    for line in headers.lines() {
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        match key {
            "tree" => tree = Some(header_oid(oid, "tree", value)?),
            "parent" => {
                if parent.is_some() {
                    return Err(Error::corrupt(oid, "commit has more than one parent"));
                }
                parent = Some(header_oid(oid, "parent", value)?);
            }
            "author" => author = Some(value.to_string()),
            "committer" => committer = Some(value.to_string()),
            _ => log::trace!("ignoring commit header {:?} in {}", key, oid),
        }
    }

    let tree = tree.ok_or_else(|| Error::corrupt(oid, "commit has no tree line"))?;
    let message = message.strip_suffix('\n').unwrap_or(message).to_string();

    Ok(CommitInfo {
        oid: *oid,
        tree,
        parent,
        author,
        committer,
        message,
    })
}

fn header_oid(oid: &Oid, field: &str, value: &str) -> Result<Oid> {
    parse_oid(value).map_err(|_| Error::corrupt(oid, format!("bad {} hash {:?}", field, value)))
}

/// Read and decode the commit `oid`.
///
/// `None` is the end-of-history sentinel and decodes to `None`. Any other
/// object kind fails with [`Error::NotACommit`].
pub fn parse_commit(odb: &ObjectStore, oid: Option<&Oid>) -> Result<Option<CommitInfo>> {
    let Some(oid) = oid else {
        return Ok(None);
    };
    let payload = odb.read_typed(oid, ObjectKind::Commit)?;
    decode_commit(oid, &payload).map(Some)
}
