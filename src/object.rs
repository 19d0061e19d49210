//! Object framing and content hashing.
//!
//! Every stored object is framed as `"{kind} {len}\0{payload}"`. The object
//! id is the SHA-1 of that frame, which is the same digest git computes for
//! loose objects, so `git2::Oid::hash_object` is used to produce it.

use git2::Oid;

use crate::error::{Error, Result};
use crate::types::ObjectKind;

/// Compute the id of `(kind, payload)` without storing anything.
pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Result<Oid> {
    Oid::hash_object(kind.to_git(), payload).map_err(Error::Hash)
}

/// Build the uncompressed frame for `(kind, payload)`.
pub fn encode_frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind.as_str(), payload.len());
    let mut frame = Vec::with_capacity(header.len() + payload.len());
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Split an uncompressed frame back into kind and payload.
///
/// `oid` only labels the error. Fails with [`Error::CorruptObject`] when the
/// NUL separator is missing, the kind tag is unknown, or the declared length
/// disagrees with the payload.
pub fn decode_frame(oid: &Oid, frame: &[u8]) -> Result<(ObjectKind, Vec<u8>)> {
    let nul = frame
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::corrupt(oid, "missing header terminator"))?;
    let header = &frame[..nul];
    let payload = &frame[nul + 1..];

    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::corrupt(oid, "malformed header"))?;
    let (tag, len) = (&header[..space], &header[space + 1..]);

    let kind = ObjectKind::from_tag(tag).ok_or_else(|| {
        Error::corrupt(
            oid,
            format!("unknown object kind {:?}", String::from_utf8_lossy(tag)),
        )
    })?;

    let declared: usize = std::str::from_utf8(len)
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::corrupt(oid, "malformed length in header"))?;

    if declared != payload.len() {
        return Err(Error::corrupt(
            oid,
            format!(
                "length mismatch: header says {}, payload has {}",
                declared,
                payload.len()
            ),
        ));
    }

    Ok((kind, payload.to_vec()))
}
