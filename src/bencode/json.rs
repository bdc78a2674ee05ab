use serde_json::{json, Value};
use thiserror::Error;

use super::BValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
	/// A hex-rendered binary key landed on the same text as another key.
	#[error("Dictionary key '{0}' appears twice once binary keys are written as hex")]
	KeyCollision(String),
}

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number
/// - `ByteString(bytes)` => Attempt UTF-8; if invalid, store hex in `"_bytes_hex"`.
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, with non-UTF-8 keys written as hex
///
/// Fails rather than drop an entry when two keys render to the same text.
pub fn bvalue_to_json(bv: &BValue) -> Result<Value, JsonError> {
	let json_val = match bv {
		BValue::Integer(i) => json!(i),

		BValue::ByteString(bytes) => match bv.as_str() {
			Some(text) => Value::String(text.to_string()),
			None => json!({ "_bytes_hex": hex::encode(bytes) }),
		},

		BValue::List(list_items) => Value::Array(
			list_items
				.iter()
				.map(bvalue_to_json)
				.collect::<Result<Vec<_>, _>>()?,
		),

		BValue::Dict(map) => {
			let mut json_map = serde_json::Map::new();
			for (k, v) in map {
				let key = key_to_string(k);
				if json_map.contains_key(&key) {
					return Err(JsonError::KeyCollision(key));
				}
				json_map.insert(key, bvalue_to_json(v)?);
			}
			Value::Object(json_map)
		}
	};
	Ok(json_val)
}

fn key_to_string(key: &[u8]) -> String {
	match std::str::from_utf8(key) {
		Ok(text) => text.to_string(),
		Err(_) => hex::encode(key),
	}
}
