use thiserror::Error;

use crate::bencode::{DecodeError, ValueKind};

/// The document is valid bencode but does not describe a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
	#[error("Schema error: {reason}")]
	SchemaError {
		field: Option<&'static str>,
		reason: String,
	},

	#[error("Missing field '{0}'")]
	MissingField(&'static str),

	#[error("Field '{field}' must be a {expected}, found a {actual}")]
	WrongType {
		field: &'static str,
		expected: ValueKind,
		actual: ValueKind,
	},

	#[error("Field '{0}' is not valid UTF-8")]
	EncodingError(&'static str),
}

impl ProjectionError {
	/// A schema problem with the document as a whole.
	pub fn schema(reason: impl Into<String>) -> Self {
		ProjectionError::SchemaError { field: None, reason: reason.into() }
	}

	/// A field that is present and well-typed but holds an unusable value.
	pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
		ProjectionError::SchemaError { field: Some(field), reason: reason.into() }
	}

	/// The bencode key the error is about, if it concerns a single field.
	pub fn field(&self) -> Option<&'static str> {
		match self {
			ProjectionError::SchemaError { field, .. } => *field,
			ProjectionError::MissingField(field)
			| ProjectionError::WrongType { field, .. }
			| ProjectionError::EncodingError(field) => Some(*field),
		}
	}
}

#[derive(Debug, Error)]
pub enum TorrentError {
	#[error("Bencode error: {0}")]
	Decode(#[from] DecodeError),

	#[error("Invalid torrent: {0}")]
	Projection(#[from] ProjectionError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
