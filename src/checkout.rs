use std::collections::BTreeSet;
use std::path::Path;

use git2::Oid;

use crate::error::{Error, Result};
use crate::odb::ObjectStore;
use crate::paths::{join_rel, rel_to_path, validate_entry_name};
use crate::tree::{read_tree, walk_tree};
use crate::types::{CheckoutReport, ObjectKind};

/// Check that every object reachable from `tree` is present and readable
/// and that every entry name is safe to write. Nothing outside the store is
/// touched.
pub fn verify_tree(odb: &ObjectStore, tree: &Oid) -> Result<()> {
    for entry in read_tree(odb, tree)? {
        validate_entry_name(&entry.name)?;
        if entry.is_tree() {
            verify_tree(odb, &entry.oid)?;
        } else {
            odb.read_typed(&entry.oid, ObjectKind::Blob)?;
        }
    }
    Ok(())
}

/// Write the tree `tree` into `target`.
///
/// Blob entries overwrite whatever file is at their path; tree entries get
/// their directory created and are recursed into. Nothing is ever deleted:
/// files in `target` that the tree does not mention are left alone.
///
/// # Errors
/// Returns [`Error::NotATree`] if `tree` (or a nested tree entry) is not a
/// tree object, and [`Error::InvalidArguments`] for entry names that would
/// escape `target`.
pub fn materialize(odb: &ObjectStore, tree: &Oid, target: &Path) -> Result<CheckoutReport> {
    let mut report = CheckoutReport::new();
    std::fs::create_dir_all(target).map_err(|e| Error::io(target, e))?;
    materialize_dir(odb, tree, target, "", &mut report)?;
    Ok(report)
}

fn materialize_dir(
    odb: &ObjectStore,
    tree: &Oid,
    dir: &Path,
    rel: &str,
    report: &mut CheckoutReport,
) -> Result<()> {
    for entry in read_tree(odb, tree)? {
        validate_entry_name(&entry.name)?;
        let path = dir.join(&entry.name);
        let entry_rel = join_rel(rel, &entry.name);

        if entry.is_tree() {
            std::fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
            materialize_dir(odb, &entry.oid, &path, &entry_rel, report)?;
        } else {
            let data = odb.read_typed(&entry.oid, ObjectKind::Blob)?;
            std::fs::write(&path, data).map_err(|e| Error::io(&path, e))?;
            report.written.push(entry_rel);
        }
    }
    Ok(())
}

/// Delete files tracked by `current` that `target_tree` does not contain.
///
/// Directories emptied by the removal are removed too, up to (not
/// including) `root`. Files that were never tracked are not touched.
/// Returns the removed paths relative to `root`.
pub fn prune_tracked(
    odb: &ObjectStore,
    current: &Oid,
    target_tree: &Oid,
    root: &Path,
) -> Result<Vec<String>> {
    let keep: BTreeSet<String> = walk_tree(odb, target_tree)?
        .into_iter()
        .map(|(path, _)| path)
        .collect();

    let mut removed = Vec::new();
    for (rel, _) in walk_tree(odb, current)? {
        if keep.contains(&rel) {
            continue;
        }
        let path = rel_to_path(root, &rel);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("pruned {}", rel);
                removed.push(rel);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(Error::io(&path, e)),
        }
        remove_empty_parents(&path, root);
    }
    Ok(removed)
}

fn remove_empty_parents(path: &Path, root: &Path) {
    let mut dir = path.parent();
    while let Some(d) = dir {
        if d == root || !d.starts_with(root) {
            break;
        }
        // remove_dir refuses non-empty directories, which ends the climb.
        if std::fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
}
