/*!
# Typed attribute access

Helpers turning raw attribute text into typed values, with the
default/fallback and warning semantics the legacy file dialects require:
absence is silent, parse failures warn and fall back, and a value with
trailing unparsed characters still yields its parsed prefix (plus a
warning). Nothing in here ever aborts a load.

Also hosts the two text-payload decoders the document parser needs: the
greedy ASCII double scanner used for stroke coordinates and pressure lists,
and base64 decoding for image payloads.
*/
use std::any::type_name;
use std::fmt;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use log::warn;
use smartstring::alias::String as SmartString;

use crate::model::{Color, Domain, LineStyle, StrokeCapStyle, StrokeTool};
use crate::tags::attrs;
use crate::tokenizer::Attributes;

/// A value which can be parsed from raw attribute text.
///
/// `parse_attribute` returns the value and the unparsed remainder of the
/// input (empty when fully consumed), or `None` when the text does not
/// start with a value of this type at all.
pub trait AttributeValue: Sized {
	fn parse_attribute(s: &str) -> Option<(Self, &str)>;
}

macro_rules! numeric_attribute_value {
	($($t:ty),+) => {
		$(
			impl AttributeValue for $t {
				fn parse_attribute(s: &str) -> Option<(Self, &str)> {
					match lexical_core::parse_partial::<$t>(s.as_bytes()) {
						Ok((value, consumed)) if consumed > 0 => {
							Some((value, &s[consumed..]))
						}
						_ => None,
					}
				}
			}
		)+
	}
}

numeric_attribute_value!(f64, i32, u32, u64, usize);

impl AttributeValue for String {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Some((s.to_owned(), ""))
	}
}

impl AttributeValue for SmartString {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Some((s.into(), ""))
	}
}

impl AttributeValue for PathBuf {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Some((PathBuf::from(s), ""))
	}
}

impl AttributeValue for StrokeTool {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Self::from_name(s).map(|v| (v, ""))
	}
}

impl AttributeValue for StrokeCapStyle {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Self::from_name(s).map(|v| (v, ""))
	}
}

impl AttributeValue for LineStyle {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Self::from_name(s).map(|v| (v, ""))
	}
}

impl AttributeValue for Domain {
	fn parse_attribute(s: &str) -> Option<(Self, &str)> {
		Self::from_name(s).map(|v| (v, ""))
	}
}

/// Typed attribute lookup: `None` if the attribute is absent (silent) or
/// its value fails to parse (warning).
pub fn get<T: AttributeValue>(name: &str, attributes: &Attributes) -> Option<T> {
	let raw = attributes.get(name)?;
	match T::parse_attribute(raw) {
		Some((value, rest)) => {
			if !rest.is_empty() {
				warn!("attribute \"{}\" was not entirely parsed", name);
			}
			Some(value)
		}
		None => {
			warn!(
				"attribute \"{}\" could not be parsed as {}, the value is \"{}\"",
				name,
				type_name::<T>(),
				raw
			);
			None
		}
	}
}

/// Like [`get`], but falls back to `default` on absence or parse failure.
///
/// Call sites where absence is a routine dialect difference pass
/// `warn = false`; everywhere else a missing mandatory attribute is worth
/// a log line.
pub fn get_mandatory<T: AttributeValue + fmt::Debug>(
	name: &str,
	attributes: &Attributes,
	default: T,
	warn_on_default: bool,
) -> T {
	match get(name, attributes) {
		Some(value) => value,
		None => {
			if warn_on_default {
				warn!(
					"mandatory attribute \"{}\" not found, using default value {:?}",
					name, default
				);
			}
			default
		}
	}
}

/// Mandatory `color` attribute with the layered fallback: hex code, then
/// (for backgrounds) the legacy background name translation, then the
/// predefined color names, then the caller's default.
pub fn get_color_mandatory(
	attributes: &Attributes,
	default: Color,
	background: bool,
) -> Color {
	let raw = match attributes.get(attrs::COLOR) {
		Some(raw) => raw,
		None => {
			warn!(
				"mandatory attribute \"{}\" not found, using default value {}",
				attrs::COLOR,
				default
			);
			return default;
		}
	};
	if let Some(color) = Color::from_hex_code(raw) {
		return color;
	}
	if background {
		if let Some(color) = Color::from_background_name(raw) {
			return color;
		}
	}
	if let Some(color) = Color::from_predefined_name(raw) {
		return color;
	}
	warn!(
		"unknown color \"{}\", using default value {}",
		raw, default
	);
	default
}

/// Decode a base64 text payload into binary data.
///
/// ASCII whitespace (line wrapping) is tolerated. A decode failure is a
/// soft warning; callers skip the corresponding builder call.
pub fn decode_base64(data: &str) -> Option<Bytes> {
	let filtered: Vec<u8> = data
		.bytes()
		.filter(|b| !b.is_ascii_whitespace())
		.collect();
	match BASE64.decode(&filtered) {
		Ok(bytes) => Some(Bytes::from(bytes)),
		Err(e) => {
			warn!("invalid base64 payload: {}", e);
			None
		}
	}
}

/// Greedily scan a whitespace/comma-separated list of ASCII doubles,
/// invoking `each` for every parsed value.
///
/// Stops at the first token which fails to parse and returns it as the
/// unparsed remainder, so callers can warn without failing the document.
pub fn scan_doubles<'a>(
	mut s: &'a str,
	mut each: impl FnMut(f64),
) -> Result<(), &'a str> {
	loop {
		s = s.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
		if s.is_empty() {
			return Ok(());
		}
		match lexical_core::parse_partial::<f64>(s.as_bytes()) {
			Ok((value, consumed)) if consumed > 0 => {
				each(value);
				s = &s[consumed..];
			}
			_ => return Err(s),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenizer::Reader;
	use crate::IoSource;

	fn with_attrs(doc: &str, f: impl FnOnce(Attributes)) {
		let mut r = Reader::new(IoSource::new(doc.as_bytes()));
		match r.read_node().unwrap() {
			crate::tokenizer::Node::Opening(node) => f(node.attributes()),
			_ => panic!("expected opening node"),
		}
	}

	#[test]
	fn absent_attributes_are_silently_none() {
		with_attrs("<a/>", |attrs| {
			assert_eq!(get::<f64>("width", &attrs), None);
		});
	}

	#[test]
	fn numeric_prefix_is_kept_on_trailing_garbage() {
		with_attrs("<a width='2.5 1.0 0.8'/>", |attrs| {
			assert_eq!(get::<f64>("width", &attrs), Some(2.5));
		});
	}

	#[test]
	fn unparsable_values_fall_back_to_default() {
		with_attrs("<a fill='nope'/>", |attrs| {
			assert_eq!(get::<i32>("fill", &attrs), None);
			assert_eq!(get_mandatory::<i32>("fill", &attrs, -1, false), -1);
		});
	}

	#[test]
	fn enum_attributes() {
		with_attrs("<a tool='eraser' capStyle='butt' domain='attach'/>", |attrs| {
			assert_eq!(get::<StrokeTool>("tool", &attrs), Some(StrokeTool::Eraser));
			assert_eq!(
				get::<StrokeCapStyle>("capStyle", &attrs),
				Some(StrokeCapStyle::Butt)
			);
			assert_eq!(get::<Domain>("domain", &attrs), Some(Domain::Attach));
			assert_eq!(get::<LineStyle>("style", &attrs), None);
		});
	}

	#[test]
	fn color_fallback_layers() {
		with_attrs("<a color='#12345678'/>", |attrs| {
			assert_eq!(
				get_color_mandatory(&attrs, Color::BLACK, false),
				Color(0x12345678)
			);
		});
		with_attrs("<a color='blue'/>", |attrs| {
			assert_eq!(
				get_color_mandatory(&attrs, Color::BLACK, false),
				Color::rgb(0x3333cc)
			);
			assert_eq!(
				get_color_mandatory(&attrs, Color::WHITE, true),
				Color::rgb(0xa0e8ff)
			);
		});
		with_attrs("<a color='vantablack'/>", |attrs| {
			assert_eq!(
				get_color_mandatory(&attrs, Color::WHITE, true),
				Color::WHITE
			);
		});
		with_attrs("<a/>", |attrs| {
			assert_eq!(
				get_color_mandatory(&attrs, Color::BLACK, false),
				Color::BLACK
			);
		});
	}

	#[test]
	fn base64_payloads() {
		assert_eq!(
			decode_base64("aGVsbG8=").unwrap().as_ref(),
			b"hello"
		);
		// wrapped payloads decode too
		assert_eq!(
			decode_base64("aGVs\nbG8=").unwrap().as_ref(),
			b"hello"
		);
		assert_eq!(decode_base64("!!!"), None);
	}

	#[test]
	fn double_scanner_stops_at_bad_token() {
		let mut out = Vec::new();
		assert_eq!(scan_doubles("1 2.5,3", |v| out.push(v)), Ok(()));
		assert_eq!(out, vec![1.0, 2.5, 3.0]);

		out.clear();
		let rest = scan_doubles("4.2 bogus 5", |v| out.push(v)).unwrap_err();
		assert_eq!(out, vec![4.2]);
		assert_eq!(rest, "bogus 5");
	}
}
