// infohash.rs
use std::ops::Range;

use log::debug;
use sha1::{Digest, Sha1};

use crate::bencode::{Decoder, ValueKind};
use crate::torrent::error::{ProjectionError, TorrentError};

/// SHA-1 of the raw `info` dictionary bytes, as trackers and peers identify the torrent.
pub fn info_hash(input: &[u8]) -> Result<[u8; 20], TorrentError> {
    info_hash_with(&Decoder::default(), input)
}

pub fn info_hash_with(decoder: &Decoder, input: &[u8]) -> Result<[u8; 20], TorrentError> {
    let span = info_span(decoder, input)?;
    debug!("info dictionary spans bytes {}..{}", span.start, span.end);

    let mut hasher = Sha1::new();
    hasher.update(&input[span]);
    let result = hasher.finalize();

    let mut hash_bytes = [0u8; 20];
    hash_bytes.copy_from_slice(&result);
    Ok(hash_bytes)
}

/// Finds where the top-level `info` value sits in `input`.
///
/// The hash must cover the bytes exactly as written, so the span is located by
/// stepping over the root dictionary's entries rather than re-encoding anything.
pub fn info_span(decoder: &Decoder, input: &[u8]) -> Result<Range<usize>, TorrentError> {
    let root = decoder.decode(input)?;
    if root.as_dict().is_none() {
        return Err(ProjectionError::schema("root is not a dictionary").into());
    }
    let info = root
        .get(b"info")
        .ok_or(ProjectionError::MissingField("info"))?;
    if info.as_dict().is_none() {
        return Err(ProjectionError::WrongType {
            field: "info",
            expected: ValueKind::Dictionary,
            actual: info.kind(),
        }
        .into());
    }

    // skip 'd'; the whole document already decoded, so every step below succeeds
    let mut pos = 1;
    while input.get(pos).is_some_and(|&b| b != b'e') {
        let (key_end, key) = decoder.decode_at(input, pos)?;
        let (value_end, _) = decoder.decode_at(input, key_end)?;
        if key.as_bytes() == Some(b"info".as_slice()) {
            return Ok(key_end..value_end);
        }
        pos = value_end;
    }

    Err(ProjectionError::MissingField("info").into())
}
