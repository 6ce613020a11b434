/*!
# Tag dictionary

Static name ↔ enum mappings for the element names recognized in `.xoj` /
`.xopp` documents, plus the attribute name constants used by the document
parser. Matching is exact and case-sensitive.
*/
use std::fmt;

/// Closed enumeration of the recognized element names.
///
/// Unrecognized names map to [`TagType::Unknown`]. Unknown tags are still
/// tracked structurally by the document parser (they participate in the
/// hierarchy push/pop so nesting stays consistent) but are otherwise
/// ignored with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
	Unknown,
	/// `<xournal>`, the Xournal / Xournal++ root dialect.
	Xournal,
	/// `<MrWriter>`, the MrWriter root dialect.
	MrWriter,
	Title,
	Preview,
	Page,
	Audio,
	Background,
	Layer,
	Timestamp,
	Stroke,
	Text,
	Image,
	TexImage,
	Attachment,
}

impl TagType {
	/// Map an element name to its tag type.
	pub fn from_name(name: &str) -> TagType {
		match name {
			"MrWriter" => Self::MrWriter,
			"attachment" => Self::Attachment,
			"audio" => Self::Audio,
			"background" => Self::Background,
			"image" => Self::Image,
			"layer" => Self::Layer,
			"page" => Self::Page,
			"preview" => Self::Preview,
			"stroke" => Self::Stroke,
			"teximage" => Self::TexImage,
			"text" => Self::Text,
			"timestamp" => Self::Timestamp,
			"title" => Self::Title,
			"xournal" => Self::Xournal,
			_ => Self::Unknown,
		}
	}

	/// Return the canonical element name for diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			Self::Unknown => "<unknown>",
			Self::Xournal => "xournal",
			Self::MrWriter => "MrWriter",
			Self::Title => "title",
			Self::Preview => "preview",
			Self::Page => "page",
			Self::Audio => "audio",
			Self::Background => "background",
			Self::Layer => "layer",
			Self::Timestamp => "timestamp",
			Self::Stroke => "stroke",
			Self::Text => "text",
			Self::Image => "image",
			Self::TexImage => "teximage",
			Self::Attachment => "attachment",
		}
	}
}

impl fmt::Display for TagType {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Names of the attributes used in `.xoj` / `.xopp` files.
pub mod attrs {
	// xournal
	pub const CREATOR: &str = "creator";
	/// Also in MrWriter.
	pub const VERSION: &str = "version";
	pub const FILEVERSION: &str = "fileversion";

	// page
	/// Also in stroke, where the value packs the line width and, in legacy
	/// files, trailing pressure samples.
	pub const WIDTH: &str = "width";
	pub const HEIGHT: &str = "height";

	// background
	/// Also in layer.
	pub const NAME: &str = "name";
	pub const TYPE: &str = "type";
	/// Also in stroke.
	pub const STYLE: &str = "style";
	pub const CONFIG: &str = "config";
	/// Also in stroke and text.
	pub const COLOR: &str = "color";
	pub const DOMAIN: &str = "domain";
	pub const FILENAME: &str = "filename";
	pub const PAGE_NUMBER: &str = "pageno";

	// timestamp
	/// Also in stroke, text and audio.
	pub const AUDIO_FILENAME: &str = "fn";
	/// Also in stroke and text.
	pub const TIMESTAMP: &str = "ts";

	// stroke
	pub const TOOL: &str = "tool";
	pub const PRESSURES: &str = "pressures";
	pub const FILL: &str = "fill";
	pub const CAPSTYLE: &str = "capStyle";

	// text
	pub const FONT: &str = "font";
	pub const SIZE: &str = "size";
	pub const X_COORD: &str = "x";
	pub const Y_COORD: &str = "y";

	// image, also in teximage
	pub const LEFT_POS: &str = "left";
	pub const TOP_POS: &str = "top";
	pub const RIGHT_POS: &str = "right";
	pub const BOTTOM_POS: &str = "bottom";

	// teximage
	pub const TEXT: &str = "text";

	// attachment
	pub const PATH: &str = "path";
}
