/*!
# Domain value types

Small value types extracted from notebook documents: colors, stroke
properties, page background styles and path-domain markers. These are the
typed results the [attribute codec](crate::codec) produces and the
[`DocumentBuilder`](crate::DocumentBuilder) consumes.

The textual forms are the ones written by Xournal, Xournal++ and MrWriter;
every `from_name` lookup is exact and case-sensitive.
*/
use std::fmt;

use smartstring::alias::String as SmartString;

/// An RGBA color, packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
	pub const BLACK: Color = Color(0x0000_00ff);
	pub const WHITE: Color = Color(0xffff_ffff);

	/// Construct an opaque color from an `0xRRGGBB` value.
	pub const fn rgb(rgb: u32) -> Color {
		Color(rgb << 8 | 0xff)
	}

	/// Parse a `#RRGGBB` or `#RRGGBBAA` hex color code.
	pub fn from_hex_code(s: &str) -> Option<Color> {
		let digits = s.strip_prefix('#')?;
		if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		match digits.len() {
			6 => {
				let rgb = u32::from_str_radix(digits, 16).ok()?;
				Some(Color::rgb(rgb))
			}
			8 => {
				let rgba = u32::from_str_radix(digits, 16).ok()?;
				Some(Color(rgba))
			}
			_ => None,
		}
	}

	/// Look up one of the predefined color names used for strokes and
	/// text.
	pub fn from_predefined_name(s: &str) -> Option<Color> {
		let rgb = match s {
			"black" => 0x000000,
			"blue" => 0x3333cc,
			"red" => 0xff0000,
			"green" => 0x008000,
			"gray" => 0x808080,
			"lightblue" => 0x00c0ff,
			"lightgreen" => 0x00ff00,
			"magenta" => 0xff00ff,
			"orange" => 0xff8000,
			"yellow" => 0xffff00,
			"white" => 0xffffff,
			_ => return None,
		};
		Some(Color::rgb(rgb))
	}

	/// Look up one of the legacy background color names.
	///
	/// Background tags reuse color names like `blue` for translated pastel
	/// tints, so these take precedence over
	/// [`Color::from_predefined_name`] when a background color is parsed.
	pub fn from_background_name(s: &str) -> Option<Color> {
		let rgb = match s {
			"blue" => 0xa0e8ff,
			"pink" => 0xffc0d4,
			"green" => 0x80ffc0,
			"orange" => 0xffc080,
			"yellow" => 0xffff80,
			"white" => 0xffffff,
			_ => return None,
		};
		Some(Color::rgb(rgb))
	}
}

impl fmt::Display for Color {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		write!(f, "#{:08x}", self.0)
	}
}

/// The drawing tool a stroke was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeTool {
	Pen,
	Eraser,
	Highlighter,
}

impl StrokeTool {
	pub fn from_name(s: &str) -> Option<StrokeTool> {
		match s {
			"pen" => Some(Self::Pen),
			"eraser" => Some(Self::Eraser),
			"highlighter" => Some(Self::Highlighter),
			_ => None,
		}
	}
}

impl Default for StrokeTool {
	fn default() -> Self {
		Self::Pen
	}
}

/// Stroke end cap shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCapStyle {
	Butt,
	Round,
	Square,
}

impl StrokeCapStyle {
	pub fn from_name(s: &str) -> Option<StrokeCapStyle> {
		match s {
			"butt" => Some(Self::Butt),
			"round" => Some(Self::Round),
			"square" => Some(Self::Square),
			_ => None,
		}
	}
}

impl Default for StrokeCapStyle {
	fn default() -> Self {
		Self::Round
	}
}

/// Dash pattern of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
	Plain,
	Dash,
	DashDot,
	Dot,
}

impl LineStyle {
	pub fn from_name(s: &str) -> Option<LineStyle> {
		match s {
			"plain" => Some(Self::Plain),
			"dash" => Some(Self::Dash),
			"dashdot" => Some(Self::DashDot),
			"dot" => Some(Self::Dot),
			_ => None,
		}
	}
}

/// Ruling of a solid page background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyleFormat {
	Plain,
	Ruled,
	Lined,
	Graph,
	Dotted,
	IsoDotted,
	IsoGraph,
	Staves,
}

impl PageStyleFormat {
	/// Map a background `style` attribute value to its format.
	///
	/// Unrecognized styles fall back to [`PageStyleFormat::Plain`], the
	/// same policy the page-type registry applies to stale style names.
	pub fn from_name(s: &str) -> PageStyleFormat {
		match s {
			"ruled" => Self::Ruled,
			"lined" => Self::Lined,
			"graph" => Self::Graph,
			"dotted" => Self::Dotted,
			"isodotted" => Self::IsoDotted,
			"isograph" => Self::IsoGraph,
			"staves" => Self::Staves,
			_ => Self::Plain,
		}
	}
}

impl Default for PageStyleFormat {
	fn default() -> Self {
		Self::Plain
	}
}

/// A solid background description: ruling plus its free-form config
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageStyle {
	pub format: PageStyleFormat,
	pub config: SmartString,
}

/// Selects how a background path reference should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
	/// The filename is a literal path.
	Absolute,
	/// The filename refers to a file bundled with the document.
	Attach,
	/// The "filename" is really the index of the page to copy the
	/// background from.
	Clone,
}

impl Domain {
	pub fn from_name(s: &str) -> Option<Domain> {
		match s {
			"absolute" => Some(Self::Absolute),
			"attach" => Some(Self::Attach),
			"clone" => Some(Self::Clone),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Absolute => "absolute",
			Self::Attach => "attach",
			Self::Clone => "clone",
		}
	}
}

impl Default for Domain {
	fn default() -> Self {
		Self::Absolute
	}
}

impl fmt::Display for Domain {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A stroke coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Point {
		Point { x, y }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_codes() {
		assert_eq!(Color::from_hex_code("#ff0000"), Some(Color(0xff0000ff)));
		assert_eq!(Color::from_hex_code("#12345678"), Some(Color(0x12345678)));
		assert_eq!(Color::from_hex_code("ff0000"), None);
		assert_eq!(Color::from_hex_code("#ff00"), None);
		assert_eq!(Color::from_hex_code("#ggijkl"), None);
	}

	#[test]
	fn background_names_shadow_predefined_ones() {
		// "blue" means different colors on strokes and backgrounds
		assert_eq!(Color::from_predefined_name("blue"), Some(Color::rgb(0x3333cc)));
		assert_eq!(Color::from_background_name("blue"), Some(Color::rgb(0xa0e8ff)));
		assert_eq!(Color::from_background_name("black"), None);
	}

	#[test]
	fn stale_page_styles_fall_back_to_plain() {
		assert_eq!(PageStyleFormat::from_name("graph"), PageStyleFormat::Graph);
		assert_eq!(PageStyleFormat::from_name("copied"), PageStyleFormat::Plain);
	}
}
