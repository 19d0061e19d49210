use std::path::Path;

use git2::Oid;

use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::odb::ObjectStore;
use crate::paths::join_rel;
use crate::types::{ObjectKind, TreeEntry, META_DIR};

/// Serialize entries as `"{mode} {name}\0" + 20 raw hash bytes` each.
///
/// Entries are written in the order given; use [`write_tree`] to get the
/// canonical sorted encoding.
pub fn encode_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = Vec::new();
    for e in entries {
        out.extend_from_slice(format!("{:o} {}\0", e.mode, e.name).as_bytes());
        out.extend_from_slice(e.oid.as_bytes());
    }
    out
}

/// Parse a tree payload back into entries.
///
/// # Errors
/// Returns [`Error::CorruptObject`] if an entry header is malformed or the
/// payload ends in the middle of a hash.
pub fn parse_tree(oid: &Oid, payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::corrupt(oid, "tree entry without terminator"))?;
        let header = std::str::from_utf8(&rest[..nul])
            .map_err(|_| Error::corrupt(oid, "tree entry header is not UTF-8"))?;
        let (mode, name) = header
            .split_once(' ')
            .ok_or_else(|| Error::corrupt(oid, format!("malformed tree entry {:?}", header)))?;
        let mode = u32::from_str_radix(mode, 8)
            .map_err(|_| Error::corrupt(oid, format!("bad mode {:?}", mode)))?;

        let hash_start = nul + 1;
        let hash_end = hash_start + 20;
        if rest.len() < hash_end {
            return Err(Error::corrupt(oid, "tree entry hash is truncated"));
        }
        let entry_oid = Oid::from_bytes(&rest[hash_start..hash_end]).map_err(Error::Hash)?;

        entries.push(TreeEntry {
            mode,
            name: name.to_string(),
            oid: entry_oid,
        });
        rest = &rest[hash_end..];
    }

    Ok(entries)
}

/// Sort `entries` by name bytes and store them as a tree object.
pub fn write_tree(odb: &ObjectStore, mut entries: Vec<TreeEntry>) -> Result<Oid> {
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    odb.write(ObjectKind::Tree, &encode_tree(&entries))
}

/// Read and parse the tree `oid`, failing with [`Error::NotATree`] if it is
/// some other kind of object.
pub fn read_tree(odb: &ObjectStore, oid: &Oid) -> Result<Vec<TreeEntry>> {
    let payload = odb.read_typed(oid, ObjectKind::Tree)?;
    parse_tree(oid, &payload)
}

/// Snapshot the directory `dir` into the store and return the root tree id.
///
/// Children are visited in name order, so the resulting hash depends only on
/// names and contents, never on the order the filesystem lists them in. The
/// metadata directory is skipped at every level, and so is anything `ignore`
/// matches. Symlinks are followed.
pub fn snapshot(odb: &ObjectStore, dir: &Path, ignore: &IgnoreRules) -> Result<Oid> {
    snapshot_dir(odb, dir, "", ignore)
}

fn snapshot_dir(odb: &ObjectStore, dir: &Path, rel: &str, ignore: &IgnoreRules) -> Result<Oid> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut children = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                log::warn!("skipping non UTF-8 file name {:?} in {}", raw, dir.display());
                continue;
            }
        };
        if name == META_DIR {
            continue;
        }
        children.push((name, path));
    }
    children.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut entries = Vec::with_capacity(children.len());
    for (name, path) in children {
        let child_rel = join_rel(rel, &name);
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("skipping dangling link {}", path.display());
                continue;
            }
            Err(e) => return Err(Error::io(&path, e)),
        };

        if ignore.is_ignored(&child_rel, meta.is_dir()) {
            log::trace!("ignoring {}", child_rel);
            continue;
        }

        if meta.is_file() {
            let data = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
            let oid = odb.write(ObjectKind::Blob, &data)?;
            entries.push(TreeEntry::blob(name, oid));
        } else if meta.is_dir() {
            let oid = snapshot_dir(odb, &path, &child_rel, ignore)?;
            entries.push(TreeEntry::tree(name, oid));
        } else {
            log::warn!("skipping special file {}", path.display());
        }
    }

    write_tree(odb, entries)
}

/// Recursively list every non-tree entry under `oid` with its full
/// slash-separated path.
pub fn walk_tree(odb: &ObjectStore, oid: &Oid) -> Result<Vec<(String, TreeEntry)>> {
    let mut results = Vec::new();
    walk_tree_recursive(odb, oid, "", &mut results)?;
    Ok(results)
}

fn walk_tree_recursive(
    odb: &ObjectStore,
    oid: &Oid,
    prefix: &str,
    results: &mut Vec<(String, TreeEntry)>,
) -> Result<()> {
    for entry in read_tree(odb, oid)? {
        let full_path = join_rel(prefix, &entry.name);
        if entry.is_tree() {
            walk_tree_recursive(odb, &entry.oid, &full_path, results)?;
        } else {
            results.push((full_path, entry));
        }
    }
    Ok(())
}
