use std::collections::BTreeMap;

use log::{debug, trace};

use super::error::{DecodeError, DecodeErrorKind};
use crate::bencode::bvalue::BValue;

/// Containers nested deeper than this are rejected unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decodes a complete document; bytes left over after the outermost value are an error.
pub fn decode(input: &[u8]) -> Result<BValue, DecodeError> {
	Decoder::default().decode(input)
}

/// Decodes the value at the start of `input` and returns how many bytes it used.
/// Anything after that value is left alone.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), DecodeError> {
	Decoder::default().decode_at(input, 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
	max_depth: usize,
}

impl Default for Decoder {
	fn default() -> Self {
		Decoder { max_depth: DEFAULT_MAX_DEPTH }
	}
}

impl Decoder {
	pub fn with_max_depth(max_depth: usize) -> Self {
		Decoder { max_depth }
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	pub fn decode(&self, input: &[u8]) -> Result<BValue, DecodeError> {
		let (end, value) = self.decode_at(input, 0)?;
		if end != input.len() {
			return Err(DecodeError::new(DecodeErrorKind::TrailingData, end));
		}
		debug!("decoded {} byte document as {}", input.len(), value.kind());
		Ok(value)
	}

	/// Decodes one value starting at `start`.
	///
	/// Returns the offset one past the value, so consecutive values can be read by
	/// feeding it back in. All offsets, including those in errors, are absolute
	/// positions in `input`.
	pub fn decode_at(&self, input: &[u8], start: usize) -> Result<(usize, BValue), DecodeError> {
		let mut pos = start;
		let value = self.decode_value(input, &mut pos, 0)?;
		Ok((pos, value))
	}

	fn decode_value(&self, input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, DecodeError> {
		match input.get(*pos) {
			None => Err(DecodeError::new(DecodeErrorKind::UnexpectedEnd, *pos)),
			Some(b'i') => decode_integer(input, pos),
			Some(b'l') => self.decode_list(input, pos, depth),
			Some(b'd') => self.decode_dict(input, pos, depth),
			Some(c) if c.is_ascii_digit() => decode_bytes(input, pos).map(BValue::ByteString),
			Some(&c) => Err(DecodeError::new(DecodeErrorKind::UnexpectedByte(c), *pos)),
		}
	}

	/// Decodes a Bencoded list of the form `l<items>e`.
	fn decode_list(&self, input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, DecodeError> {
		let open = *pos;
		if depth >= self.max_depth {
			return Err(DecodeError::new(DecodeErrorKind::NestingTooDeep, open));
		}
		*pos += 1; // skip 'l'

		let mut items = Vec::new();
		loop {
			match input.get(*pos) {
				None => return Err(DecodeError::new(DecodeErrorKind::UnexpectedEnd, *pos)),
				Some(b'e') => break,
				Some(&c) if starts_value(c) => items.push(self.decode_value(input, pos, depth + 1)?),
				Some(_) => return Err(DecodeError::new(DecodeErrorKind::UnterminatedList, *pos)),
			}
		}

		// add 1 to account for 'e'
		*pos += 1;
		trace!("list at byte {} holds {} items", open, items.len());
		Ok(BValue::List(items))
	}

	/// Decodes a Bencoded dictionary of the form `d<key><value>...e`.
	fn decode_dict(&self, input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, DecodeError> {
		let open = *pos;
		if depth >= self.max_depth {
			return Err(DecodeError::new(DecodeErrorKind::NestingTooDeep, open));
		}
		*pos += 1; // skip 'd'

		let mut map = BTreeMap::new();
		loop {
			match input.get(*pos) {
				None => return Err(DecodeError::new(DecodeErrorKind::UnexpectedEnd, *pos)),
				Some(b'e') => break,
				Some(c) if c.is_ascii_digit() => {
					let key_at = *pos;
					let key = decode_bytes(input, pos)?;
					if map.contains_key(&key) {
						return Err(DecodeError::new(DecodeErrorKind::DuplicateKey, key_at));
					}
					let value = self.decode_value(input, pos, depth + 1)?;
					map.insert(key, value);
				}
				Some(b'i' | b'l' | b'd') => {
					return Err(DecodeError::new(DecodeErrorKind::NonStringKey, *pos));
				}
				Some(_) => return Err(DecodeError::new(DecodeErrorKind::UnterminatedDictionary, *pos)),
			}
		}

		// add 1 to account for 'e'
		*pos += 1;
		trace!("dictionary at byte {} holds {} entries", open, map.len());
		Ok(BValue::Dict(map))
	}
}

fn starts_value(c: u8) -> bool {
	matches!(c, b'i' | b'l' | b'd') || c.is_ascii_digit()
}

/// Decodes a Bencoded integer of the form `i<digits>e`.
fn decode_integer(input: &[u8], pos: &mut usize) -> Result<BValue, DecodeError> {
	let start = *pos;
	*pos += 1; // skip 'i'

	let negative = input.get(*pos) == Some(&b'-');
	if negative {
		*pos += 1;
	}

	let digits_start = *pos;
	let mut value: i64 = 0;
	loop {
		match input.get(*pos) {
			None => return Err(DecodeError::new(DecodeErrorKind::UnexpectedEnd, *pos)),
			Some(b'e') => break,
			Some(&c) if c.is_ascii_digit() => {
				// Leading zeros and "-0" are not allowed
				if input[digits_start] == b'0' && (negative || *pos > digits_start) {
					return Err(DecodeError::new(DecodeErrorKind::InvalidInteger, digits_start));
				}
				let digit = i64::from(c - b'0');
				// Accumulate negatives downwards so i64::MIN is reachable
				value = value
					.checked_mul(10)
					.and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
					.ok_or(DecodeError::new(DecodeErrorKind::IntegerOverflow, start))?;
				*pos += 1;
			}
			Some(_) => return Err(DecodeError::new(DecodeErrorKind::InvalidInteger, *pos)),
		}
	}

	if *pos == digits_start {
		return Err(DecodeError::new(DecodeErrorKind::InvalidInteger, *pos));
	}

	// add 1 to account for 'e'
	*pos += 1;
	Ok(BValue::Integer(value))
}

/// Decodes a Bencoded string of the form `<length>:<bytes>`.
///
/// The length counts raw bytes, and the payload is copied out untouched.
fn decode_bytes(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, DecodeError> {
	let start = *pos;
	let mut length: usize = 0;
	loop {
		match input.get(*pos) {
			None => return Err(DecodeError::new(DecodeErrorKind::UnexpectedEnd, *pos)),
			Some(b':') => break,
			Some(&c) if c.is_ascii_digit() => {
				length = length
					.checked_mul(10)
					.and_then(|l| l.checked_add(usize::from(c - b'0')))
					.ok_or(DecodeError::new(DecodeErrorKind::InvalidLengthPrefix, start))?;
				*pos += 1;
			}
			Some(_) => return Err(DecodeError::new(DecodeErrorKind::InvalidLengthPrefix, *pos)),
		}
	}

	// only entered on a digit, so the prefix is never empty
	*pos += 1; // skip ':'

	let end = pos
		.checked_add(length)
		.filter(|&end| end <= input.len())
		.ok_or(DecodeError::new(DecodeErrorKind::UnexpectedEnd, input.len()))?;

	let data = input[*pos..end].to_vec();
	*pos = end;
	Ok(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kind_of(input: &[u8]) -> DecodeErrorKind {
		decode(input).unwrap_err().kind
	}

	fn bytes(s: &str) -> BValue {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	#[test]
	fn test_decode_integer() {
		let input = b"i42e";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::Integer(42));
	}

	#[test]
	fn test_decode_negative_integer() {
		assert_eq!(decode(b"i-3e").unwrap(), BValue::Integer(-3));
		assert_eq!(decode(b"i-13e").unwrap(), BValue::Integer(-13));
	}

	#[test]
	fn test_decode_integer_zero() {
		let input = b"i0e";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::Integer(0));
	}

	#[test]
	fn test_decode_integer_beyond_32_bits() {
		assert_eq!(decode(b"i4294967296e").unwrap(), BValue::Integer(4_294_967_296));
		assert_eq!(decode(b"i9223372036854775807e").unwrap(), BValue::Integer(i64::MAX));
		assert_eq!(decode(b"i-9223372036854775808e").unwrap(), BValue::Integer(i64::MIN));
	}

	#[test]
	fn test_decode_integer_overflow() {
		let err = decode(b"i9223372036854775808e").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::IntegerOverflow);
		assert_eq!(err.offset, 0);
		assert_eq!(kind_of(b"i-9223372036854775809e"), DecodeErrorKind::IntegerOverflow);
	}

	#[test]
	fn test_decode_malformed_integers() {
		assert_eq!(kind_of(b"i-0e"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"i03e"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"i00e"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"ie"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"i-e"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"i1x2e"), DecodeErrorKind::InvalidInteger);
		assert_eq!(kind_of(b"i+1e"), DecodeErrorKind::InvalidInteger);
	}

	#[test]
	fn test_decode_integer_missing_e() {
		let err = decode(b"i42").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnexpectedEnd);
		assert_eq!(err.offset, 3);
	}

	#[test]
	fn test_decode_string() {
		let input = b"5:hello";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, bytes("hello"));
	}

	#[test]
	fn test_decode_empty_string() {
		let input = b"0:";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::ByteString(Vec::new()));
	}

	#[test]
	fn test_decode_binary_strings_byte_for_byte() {
		// every byte value, at a spread of lengths
		let all: Vec<u8> = (0..=255u8).collect();
		for n in [0usize, 1, 2, 19, 20, 21, 128, 256] {
			let payload: Vec<u8> = all.iter().cycle().skip(200).take(n).copied().collect();
			let mut input = format!("{}:", n).into_bytes();
			input.extend_from_slice(&payload);
			assert_eq!(decode(&input).unwrap(), BValue::ByteString(payload));
		}
	}

	#[test]
	fn test_decode_string_length_counts_bytes() {
		// "é" is two bytes in UTF-8
		let input = "2:é".as_bytes();
		assert_eq!(decode(input).unwrap(), BValue::ByteString(vec![0xc3, 0xa9]));
	}

	#[test]
	fn test_decode_string_missing_colon() {
		let err = decode(b"5hello").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::InvalidLengthPrefix);
		assert_eq!(err.offset, 1);
	}

	#[test]
	fn test_decode_string_truncated() {
		let err = decode(b"10:short").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnexpectedEnd);
		assert_eq!(err.offset, 8);
	}

	#[test]
	fn test_decode_string_absurd_length() {
		assert_eq!(
			kind_of(b"99999999999999999999999999:x"),
			DecodeErrorKind::InvalidLengthPrefix
		);
	}

	#[test]
	fn test_decode_list() {
		let input = b"l4:spam4:eggse";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(value, BValue::List(vec![bytes("spam"), bytes("eggs")]));
	}

	#[test]
	fn test_decode_single_element_list_stays_a_list() {
		assert_eq!(decode(b"l4:spame").unwrap(), BValue::List(vec![bytes("spam")]));
		assert_eq!(
			decode(b"lli1eee").unwrap(),
			BValue::List(vec![BValue::List(vec![BValue::Integer(1)])])
		);
	}

	#[test]
	fn test_decode_empty_containers() {
		assert_eq!(decode(b"le").unwrap(), BValue::List(Vec::new()));
		assert_eq!(decode(b"de").unwrap(), BValue::Dict(BTreeMap::new()));
	}

	#[test]
	fn test_decode_nested_list() {
		// l4:spaml3:eggi3eee => ["spam", ["egg", 3]]
		let input = b"l4:spaml3:eggi3eee";
		let (consumed, value) = decode_bencode(input).unwrap();
		assert_eq!(consumed, input.len());
		assert_eq!(
			value,
			BValue::List(vec![
				bytes("spam"),
				BValue::List(vec![bytes("egg"), BValue::Integer(3)]),
			])
		);
	}

	#[test]
	fn test_decode_dict() {
		let value = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
		let dict = value.as_dict().unwrap();
		assert_eq!(dict.len(), 2);
		assert_eq!(value.get(b"spam"), Some(&bytes("eggs")));
		assert_eq!(value.get(b"cow"), Some(&bytes("moo")));
	}

	#[test]
	fn test_decode_dict_with_nested_list() {
		let value = decode(b"d4:spaml1:a1:bee").unwrap();
		let mut expected = BTreeMap::new();
		expected.insert(b"spam".to_vec(), BValue::List(vec![bytes("a"), bytes("b")]));
		assert_eq!(value, BValue::Dict(expected));
	}

	#[test]
	fn test_decode_dict_accepts_unsorted_and_binary_keys() {
		let value = decode(b"d4:spam4:eggs3:cow3:moo2:\xff\x00i1ee").unwrap();
		assert_eq!(value.get(b"cow"), Some(&bytes("moo")));
		assert_eq!(value.get(&[0xffu8, 0x00][..]), Some(&BValue::Integer(1)));
	}

	#[test]
	fn test_decode_dict_key_not_string() {
		let err = decode(b"di42e4:spame").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::NonStringKey);
		assert_eq!(err.offset, 1);
		assert_eq!(kind_of(b"dle4:spame"), DecodeErrorKind::NonStringKey);
		assert_eq!(kind_of(b"d3:fooded3:bari1ee"), DecodeErrorKind::NonStringKey);
	}

	#[test]
	fn test_decode_dict_duplicate_key() {
		let err = decode(b"d3:fooi1e3:fooi2ee").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::DuplicateKey);
		assert_eq!(err.offset, 9);
	}

	#[test]
	fn test_decode_unterminated_containers() {
		let err = decode(b"l4:spam:e").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnterminatedList);
		assert_eq!(err.offset, 7);

		let err = decode(b"d3:foo3:barxe").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnterminatedDictionary);
		assert_eq!(err.offset, 11);
	}

	#[test]
	fn test_decode_unclosed_containers_are_truncation() {
		assert_eq!(kind_of(b"l4:spam"), DecodeErrorKind::UnexpectedEnd);
		assert_eq!(kind_of(b"d3:foo4:spam"), DecodeErrorKind::UnexpectedEnd);
		assert_eq!(kind_of(b"d3:foo"), DecodeErrorKind::UnexpectedEnd);
	}

	#[test]
	fn test_decode_unexpected_byte() {
		assert_eq!(kind_of(b"x"), DecodeErrorKind::UnexpectedByte(b'x'));
		assert_eq!(kind_of(b"-1"), DecodeErrorKind::UnexpectedByte(b'-'));
	}

	#[test]
	fn test_decode_empty_input() {
		let err = decode(b"").unwrap_err();
		assert_eq!(err, DecodeError::new(DecodeErrorKind::UnexpectedEnd, 0));
	}

	#[test]
	fn test_decode_trailing_data() {
		let err = decode(b"i1ei2e").unwrap_err();
		assert_eq!(err, DecodeError::new(DecodeErrorKind::TrailingData, 3));

		// the prefix decoder leaves the rest for the caller
		let (consumed, value) = decode_bencode(b"i1ei2e").unwrap();
		assert_eq!(consumed, 3);
		assert_eq!(value, BValue::Integer(1));
	}

	#[test]
	fn test_decode_at_composes() {
		let input = b"4:spami42ele";
		let decoder = Decoder::default();
		let (next, first) = decoder.decode_at(input, 0).unwrap();
		let (next, second) = decoder.decode_at(input, next).unwrap();
		let (next, third) = decoder.decode_at(input, next).unwrap();
		assert_eq!(next, input.len());
		assert_eq!(first, bytes("spam"));
		assert_eq!(second, BValue::Integer(42));
		assert_eq!(third, BValue::List(Vec::new()));

		let err = decoder.decode_at(input, next).unwrap_err();
		assert_eq!(err, DecodeError::new(DecodeErrorKind::UnexpectedEnd, input.len()));
	}

	#[test]
	fn test_decode_at_reports_absolute_offsets() {
		let err = Decoder::default().decode_at(b"xxxxi0", 4).unwrap_err();
		assert_eq!(err, DecodeError::new(DecodeErrorKind::UnexpectedEnd, 6));
	}

	#[test]
	fn test_nesting_limit() {
		let deep = |n: usize| {
			let mut doc = vec![b'l'; n];
			doc.extend(std::iter::repeat(b'e').take(n));
			doc
		};
		let decoder = Decoder::with_max_depth(4);
		assert!(decoder.decode(&deep(4)).is_ok());
		let err = decoder.decode(&deep(5)).unwrap_err();
		assert_eq!(err, DecodeError::new(DecodeErrorKind::NestingTooDeep, 4));

		assert!(decode(&deep(DEFAULT_MAX_DEPTH)).is_ok());
		assert_eq!(kind_of(&deep(10_000)), DecodeErrorKind::NestingTooDeep);
	}

	#[test]
	fn test_every_strict_prefix_is_unexpected_end() {
		let documents: [&[u8]; 5] = [
			b"i-1234e",
			b"l4:spami42ee",
			b"d3:cow3:moo4:spaml1:a1:bee",
			b"d8:announce3:url4:infod6:lengthi5e4:name1:xee",
			b"lli0eed0:leee",
		];
		for doc in documents {
			assert!(decode(doc).is_ok());
			for len in 0..doc.len() {
				let err = decode(&doc[..len]).unwrap_err();
				assert_eq!(
					err.kind,
					DecodeErrorKind::UnexpectedEnd,
					"prefix {:?}",
					String::from_utf8_lossy(&doc[..len])
				);
			}
		}
	}

	#[test]
	fn test_decode_is_deterministic() {
		let input = b"d4:infod6:lengthi12e6:pieces3:\x00\x01\x02e1:zli1ei2eee";
		assert_eq!(decode(input).unwrap(), decode(input).unwrap());
	}
}
