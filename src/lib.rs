//! A minimal snapshot-based version control engine.
//!
//! `orma` records immutable point-in-time states of a directory tree in a
//! content-addressed object store and can restore any of them later.
//!
//! # Key types
//!
//! - [`Repository`] — a working directory plus its `.orma` metadata; entry
//!   point for `save`, `history` and `revert`.
//! - [`ObjectStore`] — append-only store of zlib-compressed `blob`, `tree`
//!   and `commit` objects keyed by the SHA-1 of their framed content.
//! - [`Head`] — where `HEAD` points: a branch or a detached commit.
//!
//! # On-disk layout
//!
//! ```text
//! <root>/.orma/HEAD                   "ref: refs/heads/<branch>\n" or a commit hash
//! <root>/.orma/refs/heads/<branch>    commit hash
//! <root>/.orma/objects/<aa>/<38 hex>  compressed "{kind} {len}\0{payload}"
//! <root>/.orma/logs/HEAD              reflog
//! ```
//!
//! # Quick example
//!
//! ```rust,no_run
//! use orma::{HistoryOptions, OpenOptions, Repository, RevertOptions};
//!
//! let (repo, _) = Repository::init("/tmp/project", OpenOptions::default()).unwrap();
//! let first = repo.save("first").unwrap();
//! repo.save("second").unwrap();
//!
//! for entry in repo.history(HistoryOptions::default()).unwrap() {
//!     println!("{} {}", entry.oid, entry.message);
//! }
//!
//! repo.revert(&first.commit, RevertOptions::default()).unwrap();
//! ```

pub mod checkout;
pub mod commit;
pub mod error;
pub mod ignore;
pub mod lock;
pub mod object;
pub mod odb;
pub mod paths;
pub mod reflog;
pub mod refs;
pub mod store;
pub mod tree;
pub mod types;

// Re-export primary public types at crate root.
pub use error::{Error, Result};
pub use git2::Oid;
pub use ignore::IgnoreRules;
pub use odb::ObjectStore;
pub use refs::Head;
pub use store::Repository;
pub use types::*;
