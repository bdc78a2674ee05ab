use std::{
    collections::BTreeMap,
    fmt,
    fs,
    path::Path,
};

use log::debug;
use serde::{Serialize, Serializer};

use crate::bencode::{BValue, Decoder, ValueKind};
use crate::torrent::error::{ProjectionError, TorrentError};

/// Every entry in `pieces` is a SHA-1 digest of this many bytes.
pub const PIECE_HASH_LEN: usize = 20;

/// Represents a .torrent file, including the announce URL and the associated info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Torrent {
    pub announce: String,       // The tracker URL
    pub info: TorrentInfo,      // Torrent metadata
}

/// Contains detailed metadata about the torrent's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentInfo {
    pub length: i64,            // Total size of the file
    pub name: String,           // Name of the file
    pub piece_length: i64,      // Size of each piece
    #[serde(serialize_with = "serialize_hex")]
    pub pieces: Vec<u8>,        // Concatenated 20-byte SHA-1 hashes
}

/// Projects a decoded document onto the torrent schema.
pub fn project(value: &BValue) -> Result<Torrent, ProjectionError> {
    Torrent::from_bvalue(value)
}

impl Torrent {
    /// Reads a .torrent file from disk and parses its contents.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TorrentError> {
        let buf = fs::read(path)?;
        Self::from_bytes(&buf)
    }

    /// Decodes `input` as a single bencoded document and projects it.
    pub fn from_bytes(input: &[u8]) -> Result<Self, TorrentError> {
        Self::from_bytes_with(&Decoder::default(), input)
    }

    pub fn from_bytes_with(decoder: &Decoder, input: &[u8]) -> Result<Self, TorrentError> {
        let value = decoder.decode(input)?;
        Ok(Self::from_bvalue(&value)?)
    }

    /// Creates a `Torrent` from a `BValue` (the result of a bencode parse).
    ///
    /// Fields are checked in a fixed order (`announce`, then `info` and its
    /// entries) and the first problem found is returned.
    pub fn from_bvalue(value: &BValue) -> Result<Self, ProjectionError> {
        let root_dict = value
            .as_dict()
            .ok_or_else(|| ProjectionError::schema("root is not a dictionary"))?;

        let announce = get_bytestring(root_dict, "announce")?;
        let info_dict = get_dict(root_dict, "info")?;
        let info = TorrentInfo::from_bvalue(info_dict)?;

        debug!(
            "projected torrent '{}' with {} pieces of {} bytes",
            info.name,
            info.num_pieces(),
            info.piece_length
        );

        Ok(Torrent { announce, info })
    }
}

impl TorrentInfo {
    pub fn from_bvalue(info_dict: &BTreeMap<Vec<u8>, BValue>) -> Result<Self, ProjectionError> {
        let pieces = lookup_bytestring(info_dict, "pieces")?;
        if pieces.len() % PIECE_HASH_LEN != 0 {
            return Err(ProjectionError::invalid_value(
                "pieces",
                format!("'pieces' is {} bytes, not a multiple of {}", pieces.len(), PIECE_HASH_LEN),
            ));
        }

        let piece_length = get_integer(info_dict, "piece length")?;
        if piece_length <= 0 {
            return Err(ProjectionError::invalid_value(
                "piece length",
                format!("'piece length' must be positive, got {}", piece_length),
            ));
        }

        let length = get_integer(info_dict, "length")?;
        if length < 0 {
            return Err(ProjectionError::invalid_value(
                "length",
                format!("'length' must not be negative, got {}", length),
            ));
        }

        let name = get_bytestring(info_dict, "name")?;

        Ok(TorrentInfo {
            length,
            name,
            piece_length,
            pieces: pieces.to_vec(),
        })
    }

    /// Iterates the 20-byte piece hashes in order.
    pub fn piece_hashes(&self) -> impl Iterator<Item = &[u8]> {
        self.pieces.chunks_exact(PIECE_HASH_LEN)
    }

    pub fn num_pieces(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }
}

impl fmt::Display for Torrent {
    /// The alternate form (`{:#}`) also lists every piece hash.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tracker URL: {}", self.announce)?;
        writeln!(f, "File Name: {}", self.info.name)?;
        writeln!(f, "Length: {}", self.info.length)?;
        writeln!(f, "Piece Length: {}", self.info.piece_length)?;
        write!(f, "Number of Pieces: {}", self.info.num_pieces())?;
        if f.alternate() {
            write!(f, "\nPiece Hashes:")?;
            for piece_hash in self.info.piece_hashes() {
                write!(f, "\n{}", hex::encode(piece_hash))?;
            }
        }
        Ok(())
    }
}

fn serialize_hex<T: AsRef<[u8]>, S: Serializer>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Looks up a key, failing with `MissingField` if it is absent.
fn lookup<'a>(
    dict: &'a BTreeMap<Vec<u8>, BValue>,
    key: &'static str,
) -> Result<&'a BValue, ProjectionError> {
    dict.get(key.as_bytes())
        .ok_or(ProjectionError::MissingField(key))
}

fn wrong_type(field: &'static str, expected: ValueKind, actual: &BValue) -> ProjectionError {
    ProjectionError::WrongType {
        field,
        expected,
        actual: actual.kind(),
    }
}

/// Looks up a key in the dictionary and returns a byte slice if the value is a ByteString.
pub fn lookup_bytestring<'a>(
    dict: &'a BTreeMap<Vec<u8>, BValue>,
    key: &'static str,
) -> Result<&'a [u8], ProjectionError> {
    let value = lookup(dict, key)?;
    value
        .as_bytes()
        .ok_or_else(|| wrong_type(key, ValueKind::ByteString, value))
}

/// Gets a ByteString from the dictionary and converts it into a UTF-8 String.
pub fn get_bytestring(
    dict: &BTreeMap<Vec<u8>, BValue>,
    key: &'static str,
) -> Result<String, ProjectionError> {
    let bytes = lookup_bytestring(dict, key)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ProjectionError::EncodingError(key))
}

pub fn get_integer(
    dict: &BTreeMap<Vec<u8>, BValue>,
    key: &'static str,
) -> Result<i64, ProjectionError> {
    let value = lookup(dict, key)?;
    value
        .as_integer()
        .ok_or_else(|| wrong_type(key, ValueKind::Integer, value))
}

pub fn get_dict<'a>(
    dict: &'a BTreeMap<Vec<u8>, BValue>,
    key: &'static str,
) -> Result<&'a BTreeMap<Vec<u8>, BValue>, ProjectionError> {
    let value = lookup(dict, key)?;
    value
        .as_dict()
        .ok_or_else(|| wrong_type(key, ValueKind::Dictionary, value))
}
