use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use git2::Oid;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::object::{decode_frame, encode_frame, hash_object};
use crate::types::{parse_oid, ObjectKind};

/// Shortest abbreviation accepted by [`ObjectStore::resolve_prefix`].
pub const MIN_PREFIX_LEN: usize = 4;

/// Append-only, content-addressed object store rooted at `.orma/objects`.
///
/// Objects are written zlib-compressed to `<aa>/<remaining 38 hex chars>`.
/// There is no update or delete operation.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    /// Open the store at `dir` (the `objects` directory itself).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The `objects` directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// On-disk location of `oid`.
    pub fn object_path(&self, oid: &Oid) -> PathBuf {
        let hex = oid.to_string();
        self.dir.join(&hex[..2]).join(&hex[2..])
    }

    /// Whether an object with this id has been written.
    pub fn contains(&self, oid: &Oid) -> bool {
        self.object_path(oid).is_file()
    }

    /// Store `(kind, payload)` and return its id.
    ///
    /// Writing content that is already present and intact is a no-op, so
    /// repeated identical writes never grow the store. An existing file that
    /// no longer reads back is replaced.
    ///
    /// The object is compressed into a temporary file in its shard directory
    /// and renamed into place, so a reader never sees a partial object.
    pub fn write(&self, kind: ObjectKind, payload: &[u8]) -> Result<Oid> {
        let oid = hash_object(kind, payload)?;
        let path = self.object_path(&oid);
        if path.exists() {
            match self.read(&oid) {
                Ok(_) => {
                    log::trace!("{} {} already stored", kind, oid);
                    return Ok(oid);
                }
                Err(e) => log::warn!("replacing damaged object {}: {}", oid, e),
            }
        }

        let shard_dir = path.parent().unwrap_or(&self.dir);
        std::fs::create_dir_all(shard_dir).map_err(|e| Error::io(shard_dir, e))?;

        let frame = encode_frame(kind, payload);
        let mut tmp = NamedTempFile::new_in(shard_dir).map_err(|e| Error::io(shard_dir, e))?;
        let mut encoder = ZlibEncoder::new(tmp.as_file_mut(), Compression::default());
        encoder
            .write_all(&frame)
            .and_then(|_| encoder.finish())
            .and_then(|file| file.sync_all())
            .map_err(|e| Error::io(&path, e))?;
        tmp.persist(&path).map_err(|e| Error::io(&path, e.error))?;

        log::debug!("wrote {} {} ({} bytes)", kind, oid, payload.len());
        Ok(oid)
    }

    /// Load and decode the object `oid`.
    ///
    /// # Errors
    /// * [`Error::ObjectNotFound`] if no file exists for `oid`.
    /// * [`Error::CorruptObject`] if the file does not inflate to a complete
    ///   zlib stream, the frame is malformed, or the content no longer hashes
    ///   to `oid`.
    pub fn read(&self, oid: &Oid) -> Result<(ObjectKind, Vec<u8>)> {
        let path = self.object_path(oid);
        let compressed = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(oid.to_string()));
            }
            Err(e) => return Err(Error::io(&path, e)),
        };

        let frame = inflate(oid, &compressed)?;
        let (kind, payload) = decode_frame(oid, &frame)?;

        if hash_object(kind, &payload)? != *oid {
            return Err(Error::corrupt(oid, "content does not match its hash"));
        }
        Ok((kind, payload))
    }

    /// Read `oid` and require it to be of `kind`.
    ///
    /// A kind mismatch maps to [`Error::NotATree`] / [`Error::NotACommit`],
    /// or to [`Error::CorruptObject`] when a blob was expected.
    pub fn read_typed(&self, oid: &Oid, kind: ObjectKind) -> Result<Vec<u8>> {
        let (actual, payload) = self.read(oid)?;
        if actual != kind {
            return Err(match kind {
                ObjectKind::Tree => Error::not_a_tree(oid),
                ObjectKind::Commit => Error::not_a_commit(oid),
                ObjectKind::Blob => {
                    Error::corrupt(oid, format!("expected blob, found {}", actual))
                }
            });
        }
        Ok(payload)
    }

    /// Resolve a full or abbreviated hex hash to a stored object id.
    ///
    /// # Errors
    /// * [`Error::InvalidArguments`] for non-hex input or fewer than
    ///   [`MIN_PREFIX_LEN`] characters.
    /// * [`Error::ObjectNotFound`] if nothing matches.
    /// * [`Error::AmbiguousObject`] if more than one object matches.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Oid> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.len() == 40 {
            let oid = parse_oid(&prefix)?;
            return if self.contains(&oid) {
                Ok(oid)
            } else {
                Err(Error::not_found(prefix))
            };
        }
        if prefix.len() < MIN_PREFIX_LEN
            || prefix.len() > 40
            || !prefix.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(Error::invalid_args(format!(
                "{:?} is not a hash or an abbreviation of at least {} hex digits",
                prefix, MIN_PREFIX_LEN
            )));
        }

        let (shard, rest) = prefix.split_at(2);
        let shard_dir = self.dir.join(shard);
        let read_dir = match std::fs::read_dir(&shard_dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(prefix));
            }
            Err(e) => return Err(Error::io(&shard_dir, e)),
        };

        let mut candidates = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| Error::io(&shard_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.len() == 38 && name.starts_with(rest) {
                candidates.push(format!("{}{}", shard, name));
            }
        }
        candidates.sort();

        match candidates.len() {
            0 => Err(Error::not_found(prefix)),
            1 => parse_oid(&candidates[0]),
            _ => Err(Error::AmbiguousObject { prefix, candidates }),
        }
    }
}

/// Inflate a zlib stream, insisting on a complete stream with a valid
/// trailer. A truncated file therefore never decodes as a shorter object.
fn inflate(oid: &Oid, data: &[u8]) -> Result<Vec<u8>> {
    let mut z = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).max(64));
    loop {
        let consumed = z.total_in() as usize;
        let status = z
            .decompress_vec(&data[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| Error::corrupt(oid, format!("decompression failed: {}", e)))?;
        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError if out.len() == out.capacity() => {
                out.reserve(out.capacity());
            }
            Status::Ok | Status::BufError => {
                return Err(Error::corrupt(oid, "compressed stream is truncated"));
            }
        }
    }
}
