pub mod bvalue;
pub mod decode;
pub mod error;
pub mod json;

pub use bvalue::{BValue, ValueKind};   // re-export
pub use decode::{decode, decode_bencode, Decoder, DEFAULT_MAX_DEPTH};   // re-export
pub use error::{DecodeError, DecodeErrorKind};   // re-export
pub use json::{bvalue_to_json, JsonError};   // re-export
