use thiserror::Error;

/// What went wrong while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
	#[error("Unexpected end of input")]
	UnexpectedEnd,

	#[error("Invalid string length prefix")]
	InvalidLengthPrefix,

	#[error("Invalid integer")]
	InvalidInteger,

	#[error("Integer does not fit in 64 bits")]
	IntegerOverflow,

	#[error("Unterminated list (expected a value or 'e')")]
	UnterminatedList,

	#[error("Unterminated dictionary (expected a key or 'e')")]
	UnterminatedDictionary,

	#[error("Dictionary key is not a byte string")]
	NonStringKey,

	#[error("Duplicate dictionary key")]
	DuplicateKey,

	#[error("Unexpected byte 0x{0:02x}")]
	UnexpectedByte(u8),

	#[error("Trailing data after value")]
	TrailingData,

	#[error("Nesting too deep")]
	NestingTooDeep,
}

/// A decode failure and the absolute byte offset it was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset}")]
pub struct DecodeError {
	pub offset: usize,
	pub kind: DecodeErrorKind,
}

impl DecodeError {
	pub fn new(kind: DecodeErrorKind, offset: usize) -> Self {
		DecodeError { offset, kind }
	}
}
