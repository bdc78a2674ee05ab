use std::collections::BTreeMap;
use std::fmt;

/// A decoded bencode value.
///
/// Dictionary keys are kept as raw bytes; bencode only promises they are
/// byte strings, not that they are UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes for any string
	Integer(i64),
	List(Vec<BValue>),
	Dict(BTreeMap<Vec<u8>, BValue>),
}

/// The four shapes a `BValue` can take, used when reporting type mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	Integer,
	ByteString,
	List,
	Dictionary,
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ValueKind::Integer => "integer",
			ValueKind::ByteString => "byte string",
			ValueKind::List => "list",
			ValueKind::Dictionary => "dictionary",
		};
		f.write_str(name)
	}
}

impl BValue {
	pub fn kind(&self) -> ValueKind {
		match self {
			BValue::ByteString(_) => ValueKind::ByteString,
			BValue::Integer(_) => ValueKind::Integer,
			BValue::List(_) => ValueKind::List,
			BValue::Dict(_) => ValueKind::Dictionary,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			BValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(b) => Some(b),
			_ => None,
		}
	}

	/// Returns the byte string as text, or `None` if it is not a byte string
	/// or not valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BValue>> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	/// Looks up `key` if this value is a dictionary.
	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.as_dict()?.get(key)
	}
}

impl From<i64> for BValue {
	fn from(i: i64) -> Self {
		BValue::Integer(i)
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}
}
