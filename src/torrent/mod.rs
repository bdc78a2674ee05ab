pub mod error;
pub mod metadata;
pub mod infohash;

pub use error::{ProjectionError, TorrentError};
pub use infohash::{info_hash, info_hash_with, info_span};
pub use metadata::{project, Torrent, TorrentInfo, PIECE_HASH_LEN};
