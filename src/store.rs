use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Oid;

use crate::checkout::{materialize, prune_tracked, verify_tree};
use crate::commit::{commit, parse_commit};
use crate::error::{Error, Result};
use crate::ignore::IgnoreRules;
use crate::lock::with_repo_lock;
use crate::odb::ObjectStore;
use crate::refs::{self, Head};
use crate::tree::{read_tree, snapshot};
use crate::types::{
    CheckoutReport, CommitInfo, HistoryEntry, HistoryOptions, InitOutcome, ObjectKind,
    OpenOptions, ReflogEntry, RevertOptions, SaveOutcome, Signature, TreeEntry, IGNORE_FILE,
    META_DIR,
};

/// Internal state shared via `Arc`.
#[derive(Debug)]
pub(crate) struct RepositoryInner {
    pub(crate) root: PathBuf,
    pub(crate) meta: PathBuf,
    pub(crate) odb: ObjectStore,
    pub(crate) signature: Signature,
}

/// A working directory with its `.orma` metadata.
///
/// Cheap to clone (`Arc` internally). Every operation works relative to the
/// root given at construction; nothing depends on the process's current
/// directory.
#[derive(Clone, Debug)]
pub struct Repository {
    pub(crate) inner: Arc<RepositoryInner>,
}

impl Repository {
    /// Create the `.orma` layout under `root`.
    ///
    /// If `.orma` already exists nothing is changed, a warning is logged and
    /// the existing repository is opened with
    /// [`InitOutcome::AlreadyExists`].
    pub fn init(root: impl AsRef<Path>, options: OpenOptions) -> Result<(Self, InitOutcome)> {
        let root = root.as_ref().to_path_buf();
        let meta = root.join(META_DIR);

        if meta.exists() {
            log::warn!("orma repository already exists at {}", meta.display());
            return Ok((Self::open(&root, options)?, InitOutcome::AlreadyExists));
        }

        let branch = options.branch_name()?;
        for dir in [meta.join("objects"), meta.join("refs").join("heads")] {
            std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        refs::set_head(&meta, &Head::branch(&branch))?;
        log::info!("initialized orma repository at {} on branch {}", meta.display(), branch);

        Ok((Self::from_parts(root, meta, &options), InitOutcome::Created))
    }

    /// Open the repository whose working root is `root`.
    ///
    /// # Errors
    /// Returns [`Error::RepositoryNotInitialized`] if `root/.orma` is missing.
    pub fn open(root: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let meta = root.join(META_DIR);
        if !meta.is_dir() {
            return Err(Error::not_initialized(root));
        }
        Ok(Self::from_parts(root, meta, &options))
    }

    /// Open the nearest repository at or above `start`.
    pub fn discover(start: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let start = start.as_ref();
        let absolute = std::fs::canonicalize(start).map_err(|e| Error::io(start, e))?;
        absolute
            .ancestors()
            .find(|dir| dir.join(META_DIR).is_dir())
            .map(|dir| Self::open(dir, options.clone()))
            .unwrap_or_else(|| Err(Error::not_initialized(start)))
    }

    fn from_parts(root: PathBuf, meta: PathBuf, options: &OpenOptions) -> Self {
        Repository {
            inner: Arc::new(RepositoryInner {
                odb: ObjectStore::new(meta.join("objects")),
                signature: options.signature(),
                root,
                meta,
            }),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The working directory root.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// The `.orma` directory.
    pub fn meta_dir(&self) -> &Path {
        &self.inner.meta
    }

    pub fn odb(&self) -> &ObjectStore {
        &self.inner.odb
    }

    /// Identity recorded in new commits.
    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    pub fn head(&self) -> Result<Head> {
        refs::read_head(&self.inner.meta)
    }

    /// The commit HEAD resolves to, `None` before the first save.
    pub fn resolve_head(&self) -> Result<Option<Oid>> {
        refs::resolve_head(&self.inner.meta)
    }

    pub fn current_branch(&self) -> Result<Option<String>> {
        refs::current_branch(&self.inner.meta)
    }

    /// Resolve a full or abbreviated hash to a stored object.
    pub fn resolve(&self, name: &str) -> Result<Oid> {
        self.inner.odb.resolve_prefix(name)
    }

    pub fn read_commit(&self, oid: &Oid) -> Result<CommitInfo> {
        parse_commit(&self.inner.odb, Some(oid))?.ok_or_else(|| Error::not_a_commit(oid))
    }

    // -- Snapshot / restore -------------------------------------------------

    /// Snapshot the working directory and commit it on top of HEAD.
    ///
    /// Objects are written first; HEAD only moves once the commit object is
    /// stored.
    pub fn save(&self, message: &str) -> Result<SaveOutcome> {
        let inner = &self.inner;
        with_repo_lock(&inner.meta, || {
            let tree = self.write_tree()?;
            let parent = refs::resolve_head(&inner.meta)?;
            let oid = commit(&inner.odb, &tree, parent.as_ref(), message, &inner.signature)?;
            refs::update_head(
                &inner.meta,
                &oid,
                &inner.signature,
                &format!("save: {}", message),
            )?;
            log::info!("saved {} ({})", oid, message);
            Ok(SaveOutcome {
                commit: oid,
                tree,
                parent,
            })
        })
    }

    /// Restore the working directory to `target` and move HEAD there.
    ///
    /// By default this only adds and overwrites files. With
    /// [`RevertOptions::prune`] files tracked by the current HEAD but absent
    /// from `target` are removed first. The target tree is read in full
    /// before anything is deleted or written, so a missing or corrupt object
    /// leaves both the working directory and HEAD as they were.
    ///
    /// # Errors
    /// Returns [`Error::NotACommit`] if `target` is not a commit.
    pub fn revert(&self, target: &Oid, options: RevertOptions) -> Result<CheckoutReport> {
        let inner = &self.inner;
        with_repo_lock(&inner.meta, || {
            let info = self.read_commit(target)?;
            verify_tree(&inner.odb, &info.tree)?;

            let mut removed = Vec::new();
            if options.prune {
                if let Some(current) = refs::resolve_head(&inner.meta)? {
                    let current_tree = self.read_commit(&current)?.tree;
                    removed = prune_tracked(&inner.odb, &current_tree, &info.tree, &inner.root)?;
                }
            }

            let mut report = materialize(&inner.odb, &info.tree, &inner.root)?;
            report.removed = removed;

            refs::update_head(
                &inner.meta,
                target,
                &inner.signature,
                &format!("revert: moving to {}", target),
            )?;
            log::info!(
                "reverted to {} ({} written, {} removed)",
                target,
                report.written.len(),
                report.removed.len()
            );
            Ok(report)
        })
    }

    /// Commits reachable from HEAD, most recent first.
    ///
    /// An empty vec means nothing has been saved yet.
    pub fn history(&self, options: HistoryOptions) -> Result<Vec<HistoryEntry>> {
        let limit = options.limit.unwrap_or(usize::MAX);
        let mut entries = Vec::new();
        let mut current = self.resolve_head()?;

        while entries.len() < limit {
            let Some(info) = parse_commit(&self.inner.odb, current.as_ref())? else {
                break;
            };
            entries.push(HistoryEntry {
                oid: info.oid,
                message: info.message,
            });
            current = info.parent;
        }
        Ok(entries)
    }

    /// HEAD movements recorded so far, oldest first.
    pub fn reflog(&self) -> Result<Vec<ReflogEntry>> {
        crate::reflog::read_reflog(&self.inner.meta)
    }

    // -- Low-level ----------------------------------------------------------

    /// Hash the file at `path` as a blob, storing it when `write` is set.
    pub fn hash_object(&self, path: impl AsRef<Path>, write: bool) -> Result<Oid> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        if write {
            self.inner.odb.write(ObjectKind::Blob, &data)
        } else {
            crate::object::hash_object(ObjectKind::Blob, &data)
        }
    }

    /// Raw kind and payload of any stored object.
    pub fn cat_object(&self, oid: &Oid) -> Result<(ObjectKind, Vec<u8>)> {
        self.inner.odb.read(oid)
    }

    /// Entries of the tree `oid`.
    pub fn ls_tree(&self, oid: &Oid) -> Result<Vec<TreeEntry>> {
        read_tree(&self.inner.odb, oid)
    }

    /// Snapshot the working directory without committing.
    pub fn write_tree(&self) -> Result<Oid> {
        let ignore = IgnoreRules::load(&self.inner.root.join(IGNORE_FILE))?;
        snapshot(&self.inner.odb, &self.inner.root, &ignore)
    }

    /// Write a commit object for `tree` without moving HEAD.
    ///
    /// `tree` must be a stored tree and `parent`, if given, a stored commit.
    pub fn commit_tree(&self, tree: &Oid, parent: Option<&Oid>, message: &str) -> Result<Oid> {
        read_tree(&self.inner.odb, tree)?;
        if let Some(parent) = parent {
            self.read_commit(parent)?;
        }
        commit(&self.inner.odb, tree, parent, message, &self.inner.signature)
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Repository({})", self.inner.root.display())
    }
}
