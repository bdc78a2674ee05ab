// lib.rs - Bencode decoding and torrent metadata projection

pub mod bencode;
pub mod cli;
pub mod config;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::{decode, decode_bencode, BValue, DecodeError, DecodeErrorKind, Decoder, ValueKind};
pub use torrent::{info_hash, project, ProjectionError, Torrent, TorrentError, TorrentInfo};
