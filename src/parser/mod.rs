/*!
# Document event parser

A depth-tracked state machine over the raw node stream of the
[tokenizer](crate::tokenizer). It validates structural nesting against the
expected notebook document schema and emits semantic construction calls to
a [`DocumentBuilder`].

The machine is an explicit context stack over five contexts (document
root, document children, page children, layer children, attachment host)
driven by one node-dispatch loop. Each pushed context records the
hierarchy depth at which it yields control back to its parent, which is
how both "recurse into my children" and "return when my closing tag
appears" are expressed.

Malformed legacy input is tolerated wherever possible: unrecognized tags
are tracked structurally but ignored with a warning, as are unexpected
node kinds and unparsable attribute values. Only unbalanced or mismatched
closing tags (and tokenizer-level grammar violations) abort the parse.
*/
use std::mem;
use std::path::PathBuf;

use bytes::Bytes;
use log::warn;

use crate::codec;
use crate::error::{Error, Result};
use crate::model::{
	Color, Domain, LineStyle, PageStyle, PageStyleFormat, Point, StrokeCapStyle,
	StrokeTool,
};
use crate::tags::{attrs, TagType};
use crate::tokenizer::{Attributes, Node, OpeningNode, Reader};
use crate::ByteSource;

/**
# Consumer of parsed document events

The document parser forwards everything it extracts to a builder through
this call surface, grouped into construction/finalize pairs. A `finalize_*`
call is the commit point at which a fully-parsed element is complete.

`is_parsing_complete` must return `true` once [`finalize_document`] has
been called; the parser consults it to detect (and warn about) trailing
data after the document end.

   [`finalize_document`]: DocumentBuilder::finalize_document
*/
pub trait DocumentBuilder {
	fn add_xournal(&mut self, creator: String, fileversion: u32);
	fn add_mr_writer(&mut self, creator: String);
	fn add_page(&mut self, width: f64, height: f64);
	fn finalize_page(&mut self);
	fn add_audio_attachment(&mut self, filename: PathBuf);

	fn set_bg_name(&mut self, name: String);
	fn set_bg_solid(&mut self, style: PageStyle, color: Color);
	fn set_bg_pixmap(&mut self, attach: bool, filename: PathBuf);
	fn set_bg_pixmap_cloned(&mut self, page_nr: usize);
	fn load_bg_pdf(&mut self, attach: bool, filename: PathBuf);
	fn set_bg_pdf(&mut self, pageno: usize);

	fn add_layer(&mut self, name: Option<String>);
	fn finalize_layer(&mut self);

	#[allow(clippy::too_many_arguments)]
	fn add_stroke(
		&mut self,
		tool: StrokeTool,
		color: Color,
		width: f64,
		fill: i32,
		cap_style: StrokeCapStyle,
		line_style: Option<LineStyle>,
		audio_filename: PathBuf,
		audio_timestamp: u64,
	);
	fn set_stroke_points(&mut self, points: Vec<Point>, pressures: Vec<f64>);
	fn finalize_stroke(&mut self);

	#[allow(clippy::too_many_arguments)]
	fn add_text(
		&mut self,
		font: String,
		size: f64,
		x: f64,
		y: f64,
		color: Color,
		audio_filename: PathBuf,
		audio_timestamp: u64,
	);
	fn set_text_contents(&mut self, contents: String);
	fn finalize_text(&mut self);

	fn add_image(&mut self, left: f64, top: f64, right: f64, bottom: f64);
	fn set_image_data(&mut self, data: Bytes);
	fn set_image_attachment(&mut self, filename: PathBuf);
	fn finalize_image(&mut self);

	fn add_tex_image(
		&mut self,
		left: f64,
		top: f64,
		right: f64,
		bottom: f64,
		text: String,
	);
	fn set_tex_image_data(&mut self, data: Bytes);
	fn set_tex_image_attachment(&mut self, filename: PathBuf);
	fn finalize_tex_image(&mut self);

	fn finalize_document(&mut self);
	fn is_parsing_complete(&self) -> bool;
}

/// Parsing context, i.e. "whose children are we currently reading".
///
/// The document root context is the empty context stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
	Document,
	Page,
	Layer,
	/// Children of an image or TeX image element.
	AttachmentHost,
}

/// Transient (filename, timestamp) pair for the next stroke or text
/// element, produced by a standalone `timestamp` element or inline
/// attributes. At most one may be pending at a time.
#[derive(Debug, Default)]
struct PendingAudio {
	filename: PathBuf,
	timestamp: u64,
}

impl PendingAudio {
	fn is_set(&self) -> bool {
		!self.filename.as_os_str().is_empty()
	}

	fn take(&mut self) -> (PathBuf, u64) {
		let filename = mem::take(&mut self.filename);
		let timestamp = mem::take(&mut self.timestamp);
		(filename, timestamp)
	}
}

// All per-parse state except the tokenizer, so that node handling can
// borrow the state while a node still borrows the reader.
struct ParserState<'h, B: DocumentBuilder> {
	builder: &'h mut B,

	/// Currently-open elements. Every pushed entry for a non-self-closing
	/// opening tag is popped by exactly one matching closing tag.
	hierarchy: Vec<TagType>,
	/// Context stack; each entry records the hierarchy depth at which it
	/// yields back to its parent.
	contexts: Vec<(Context, usize)>,

	/// The PDF background filename is honored only once per document.
	pdf_filename_parsed: bool,
	pending_audio: PendingAudio,
	/// Pressure samples of the stroke currently being parsed, consumed by
	/// the point/pressure pairing step.
	pressure_buffer: Vec<f64>,
}

/**
# Notebook document parser

Consumes the node stream of a [`Reader`] and forwards semantic
construction calls to a [`DocumentBuilder`].

```ignore
let file = std::fs::File::open("notes.xml")?;
let mut parser = DocumentParser::new(IoSource::new(file), &mut builder);
parser.parse_document()?;
```
*/
pub struct DocumentParser<'h, S: ByteSource, B: DocumentBuilder> {
	reader: Reader<S>,
	state: ParserState<'h, B>,
}

impl<'h, S: ByteSource, B: DocumentBuilder> DocumentParser<'h, S, B> {
	pub fn new(source: S, builder: &'h mut B) -> DocumentParser<'h, S, B> {
		Self::wrap(Reader::new(source), builder)
	}

	/// Attach a parser to an existing reader (lets tests pick buffer
	/// sizes).
	pub fn wrap(reader: Reader<S>, builder: &'h mut B) -> DocumentParser<'h, S, B> {
		DocumentParser {
			reader,
			state: ParserState {
				builder,
				hierarchy: Vec::new(),
				contexts: Vec::new(),
				pdf_filename_parsed: false,
				pending_audio: PendingAudio::default(),
				pressure_buffer: Vec::new(),
			},
		}
	}

	/// Parse the whole input and forward data to the builder's `add_*`,
	/// `set_*` and `finalize_*` functions.
	///
	/// Runs until the end of data. Structural violations and tokenizer
	/// errors abort with an error; everything else is tolerated with
	/// warnings (see module docs).
	pub fn parse_document(&mut self) -> Result<()> {
		loop {
			match self.reader.read_node()? {
				Node::End => {
					if !self.state.builder.is_parsing_complete() {
						warn!("end of data before the document was complete");
					}
					return Ok(());
				}
				node => self.state.handle(node)?,
			}
		}
	}
}

impl<'h, B: DocumentBuilder> ParserState<'h, B> {
	fn context(&self) -> Option<Context> {
		self.contexts.last().map(|(ctx, _)| *ctx)
	}

	fn push_context(&mut self, ctx: Context) {
		self.contexts.push((ctx, self.hierarchy.len()));
	}

	/// Add the tag to the hierarchy, unless the element is self-closing
	/// (in which case there is no closing tag to pop it).
	fn open_tag(&mut self, tag: TagType, empty: bool) {
		if !empty {
			self.hierarchy.push(tag);
		}
	}

	/// Remove the closed tag from the hierarchy, checking document
	/// integrity: each opening tag matches exactly one closing tag of the
	/// same name.
	fn close_tag(&mut self, tag: TagType) -> Result<()> {
		match self.hierarchy.last() {
			None => Err(Error::MalformedDocument(format!(
				"found closing tag \"{}\" at document root",
				tag.name()
			))),
			Some(&top) if top != tag => Err(Error::MalformedDocument(format!(
				"closing tag \"{}\" does not correspond to last open element \"{}\"",
				tag.name(),
				top.name()
			))),
			Some(_) => {
				self.hierarchy.pop();
				// Contexts yield once the hierarchy drops below their
				// entry depth
				while let Some(&(_, depth)) = self.contexts.last() {
					if self.hierarchy.len() < depth {
						self.contexts.pop();
					} else {
						break;
					}
				}
				Ok(())
			}
		}
	}

	fn handle(&mut self, node: Node<'_>) -> Result<()> {
		if self.builder.is_parsing_complete() {
			// Tolerate trailing garbage after the root element closed
			warn!("ignoring trailing data after the document end");
			return Ok(());
		}
		match node {
			Node::Opening(n) => self.handle_opening(&n),
			Node::Closing(n) => self.handle_closing(TagType::from_name(n.name())),
			Node::Text(n) => {
				self.handle_text(n.text());
				Ok(())
			}
			Node::End => unreachable!("End is handled by the parse loop"),
		}
	}

	fn handle_opening(&mut self, node: &OpeningNode<'_>) -> Result<()> {
		let tag = TagType::from_name(node.name());
		let empty = node.is_empty();
		let attributes = node.attributes();

		match self.context() {
			None => {
				// The root tag should not be empty
				if empty {
					return Err(Error::MalformedDocument(
						"the document root tag is empty".to_owned(),
					));
				}
				self.open_tag(tag, empty);
				match tag {
					TagType::Xournal => self.parse_xournal(&attributes),
					TagType::MrWriter => self.parse_mr_writer(&attributes),
					// Attempt parsing the document anyway
					_ => warn!("unexpected root tag: \"{}\"", node.name()),
				}
				self.push_context(Context::Document);
			}
			Some(Context::Document) => {
				self.open_tag(tag, empty);
				match tag {
					// We don't need the contents of these tags
					TagType::Title | TagType::Preview => {}
					TagType::Page => {
						self.parse_page(&attributes);
						if empty {
							warn!("found empty page");
							self.builder.finalize_page();
						} else {
							self.push_context(Context::Page);
						}
					}
					TagType::Audio => self.parse_audio(&attributes),
					_ => warn!(
						"ignoring unexpected tag in document: \"{}\"",
						node.name()
					),
				}
			}
			Some(Context::Page) => {
				self.open_tag(tag, empty);
				match tag {
					TagType::Background => self.parse_background(&attributes),
					TagType::Layer => {
						self.parse_layer(&attributes);
						if empty {
							// Don't warn: an empty page has an empty layer
							self.builder.finalize_layer();
						} else {
							self.push_context(Context::Layer);
						}
					}
					_ => warn!(
						"ignoring unexpected tag in page: \"{}\"",
						node.name()
					),
				}
			}
			Some(Context::Layer) => {
				self.open_tag(tag, empty);
				match tag {
					TagType::Timestamp => self.parse_timestamp(&attributes),
					TagType::Stroke => {
						self.parse_stroke(&attributes);
						if empty {
							warn!("found empty stroke");
							self.builder.finalize_stroke();
						}
					}
					TagType::Text => {
						self.parse_text_tag(&attributes);
						if empty {
							warn!("found empty text");
							self.builder.finalize_text();
						}
					}
					TagType::Image => {
						self.parse_image(&attributes);
						if empty {
							warn!("found empty image");
							self.builder.finalize_image();
						} else {
							// An image may have an attachment child
							self.push_context(Context::AttachmentHost);
						}
					}
					TagType::TexImage => {
						self.parse_tex_image(&attributes);
						if empty {
							warn!("found empty TeX image");
							self.builder.finalize_tex_image();
						} else {
							self.push_context(Context::AttachmentHost);
						}
					}
					_ => warn!(
						"ignoring unexpected tag in layer: \"{}\"",
						node.name()
					),
				}
			}
			Some(Context::AttachmentHost) => {
				self.open_tag(tag, empty);
				match tag {
					TagType::Attachment => self.parse_attachment(&attributes),
					_ => warn!(
						"ignoring unexpected tag in image or TeX image: \"{}\"",
						node.name()
					),
				}
			}
		}
		Ok(())
	}

	fn handle_closing(&mut self, tag: TagType) -> Result<()> {
		// Commit the element being closed. Dispatching on the hierarchy
		// top (rather than the closing tag's own name) mirrors the
		// structure check below, which compares the two anyway.
		if self.hierarchy.len() == 1 {
			// The top-level closing tag completes the document
			self.builder.finalize_document();
		} else {
			match self.hierarchy.last().copied() {
				Some(TagType::Page) => self.builder.finalize_page(),
				Some(TagType::Layer) => self.builder.finalize_layer(),
				Some(TagType::Stroke) => self.builder.finalize_stroke(),
				Some(TagType::Text) => self.builder.finalize_text(),
				Some(TagType::Image) => self.builder.finalize_image(),
				Some(TagType::TexImage) => self.builder.finalize_tex_image(),
				_ => {}
			}
		}
		self.close_tag(tag)
	}

	fn handle_text(&mut self, text: &str) {
		let top = self.hierarchy.last().copied().unwrap_or(TagType::Unknown);
		match self.context() {
			Some(Context::Document) => {
				// Text from title or preview tags is dropped on purpose
				if top != TagType::Title && top != TagType::Preview {
					warn!("ignoring unexpected text under tag \"{}\"", top.name());
				}
			}
			Some(Context::Layer) | Some(Context::AttachmentHost) => match top {
				TagType::Stroke => self.parse_stroke_text(text),
				TagType::Text => self.builder.set_text_contents(text.to_owned()),
				TagType::Image => self.parse_image_text(text),
				TagType::TexImage => self.parse_tex_image_text(text),
				_ => warn!(
					"ignoring unexpected text under tag \"{}\"",
					top.name()
				),
			},
			_ => warn!("ignoring unexpected text under tag \"{}\"", top.name()),
		}
	}

	fn parse_xournal(&mut self, attributes: &Attributes<'_>) {
		// Compatibility: old files carry only a version string instead of
		// the creator attribute
		let creator = match codec::get::<String>(attrs::CREATOR, attributes) {
			Some(creator) => creator,
			None => match codec::get::<String>(attrs::VERSION, attributes) {
				Some(version) => format!("Xournal {}", version),
				None => "Unknown".to_owned(),
			},
		};
		let fileversion =
			codec::get_mandatory::<u32>(attrs::FILEVERSION, attributes, 1, true);
		self.builder.add_xournal(creator, fileversion);
	}

	fn parse_mr_writer(&mut self, attributes: &Attributes<'_>) {
		let creator = match codec::get::<String>(attrs::VERSION, attributes) {
			Some(version) => format!("MrWriter {}", version),
			None => "Unknown".to_owned(),
		};
		self.builder.add_mr_writer(creator);
	}

	fn parse_page(&mut self, attributes: &Attributes<'_>) {
		let width = codec::get_mandatory::<f64>(attrs::WIDTH, attributes, 0.0, true);
		let height =
			codec::get_mandatory::<f64>(attrs::HEIGHT, attributes, 0.0, true);
		self.builder.add_page(width, height);
	}

	fn parse_audio(&mut self, attributes: &Attributes<'_>) {
		let filename = codec::get_mandatory::<PathBuf>(
			attrs::AUDIO_FILENAME,
			attributes,
			PathBuf::new(),
			true,
		);
		self.builder.add_audio_attachment(filename);
	}

	fn parse_background(&mut self, attributes: &Attributes<'_>) {
		if let Some(name) = codec::get::<String>(attrs::NAME, attributes) {
			self.builder.set_bg_name(name);
		}
		match codec::get::<String>(attrs::TYPE, attributes).as_deref() {
			Some("solid") => self.parse_bg_solid(attributes),
			Some("pixmap") => self.parse_bg_pixmap(attributes),
			Some("pdf") => self.parse_bg_pdf(attributes),
			Some(other) => {
				warn!("ignoring unknown background type \"{}\"", other)
			}
			// No sensible default type exists, as the other attributes
			// have to be interpreted in function of it. The builder keeps
			// its default-constructed background.
			None => warn!(
				"attribute \"type\" not found in background tag, ignoring tag"
			),
		}
	}

	fn parse_bg_solid(&mut self, attributes: &Attributes<'_>) {
		let mut style = PageStyle::default();
		if let Some(name) =
			codec::get::<smartstring::alias::String>(attrs::STYLE, attributes)
		{
			style.format = PageStyleFormat::from_name(&name);
		}
		style.config = codec::get_mandatory(
			attrs::CONFIG,
			attributes,
			smartstring::alias::String::new(),
			false,
		);
		let color = codec::get_color_mandatory(attributes, Color::WHITE, true);
		self.builder.set_bg_solid(style, color);
	}

	fn parse_bg_pixmap(&mut self, attributes: &Attributes<'_>) {
		let domain = codec::get_mandatory::<Domain>(
			attrs::DOMAIN,
			attributes,
			Domain::Absolute,
			true,
		);
		if domain != Domain::Clone {
			let filename = codec::get_mandatory::<PathBuf>(
				attrs::FILENAME,
				attributes,
				PathBuf::new(),
				true,
			);
			self.builder
				.set_bg_pixmap(domain == Domain::Attach, filename);
		} else {
			// For a cloned background image, "filename" contains the
			// number of the page the image is cloned from
			let page_nr = codec::get_mandatory::<usize>(
				attrs::FILENAME,
				attributes,
				0,
				true,
			);
			self.builder.set_bg_pixmap_cloned(page_nr);
		}
	}

	fn parse_bg_pdf(&mut self, attributes: &Attributes<'_>) {
		if !self.pdf_filename_parsed {
			let mut domain = codec::get_mandatory::<Domain>(
				attrs::DOMAIN,
				attributes,
				Domain::Absolute,
				true,
			);
			if domain == Domain::Clone {
				warn!(
					"domain \"clone\" is invalid for PDF backgrounds, using \"absolute\" instead"
				);
				domain = Domain::Absolute;
			}
			let filename = codec::get_mandatory::<PathBuf>(
				attrs::FILENAME,
				attributes,
				PathBuf::new(),
				true,
			);
			if !filename.as_os_str().is_empty() {
				self.pdf_filename_parsed = true;
				self.builder
					.load_bg_pdf(domain == Domain::Attach, filename);
			} else {
				warn!("PDF background filename is empty");
			}
		}

		let pageno =
			codec::get_mandatory::<usize>(attrs::PAGE_NUMBER, attributes, 1, true);
		self.builder.set_bg_pdf(pageno.saturating_sub(1));
	}

	fn parse_layer(&mut self, attributes: &Attributes<'_>) {
		let name = codec::get::<String>(attrs::NAME, attributes);
		self.builder.add_layer(name);
	}

	fn parse_timestamp(&mut self, attributes: &Attributes<'_>) {
		// Compatibility: newer files store audio timestamps in stroke and
		// text attributes instead of a standalone element
		if self.pending_audio.is_set() {
			warn!(
				"discarding unused audio timestamp element, filename: {}",
				self.pending_audio.filename.display()
			);
		}
		self.pending_audio.filename = codec::get_mandatory::<PathBuf>(
			attrs::AUDIO_FILENAME,
			attributes,
			PathBuf::new(),
			true,
		);
		self.pending_audio.timestamp =
			codec::get_mandatory::<u64>(attrs::TIMESTAMP, attributes, 0, true);
	}

	/// Take over inline audio attributes, which win over a pending
	/// standalone timestamp element.
	fn collect_inline_audio(&mut self, attributes: &Attributes<'_>, tag: TagType) {
		let filename = match codec::get::<PathBuf>(attrs::AUDIO_FILENAME, attributes)
		{
			Some(filename) if !filename.as_os_str().is_empty() => filename,
			_ => return,
		};
		if self.pending_audio.is_set() {
			warn!(
				"discarding audio timestamp element, because the {} tag contains a \"fn\" attribute",
				tag.name()
			);
		}
		self.pending_audio.filename = filename;
		self.pending_audio.timestamp =
			codec::get_mandatory::<u64>(attrs::TIMESTAMP, attributes, 0, true);
	}

	fn parse_stroke(&mut self, attributes: &Attributes<'_>) {
		let tool = codec::get_mandatory::<StrokeTool>(
			attrs::TOOL,
			attributes,
			StrokeTool::Pen,
			true,
		);
		let color = codec::get_color_mandatory(attributes, Color::BLACK, false);

		// The legacy width field packs the line width first, optionally
		// followed by pressure samples
		let width_str = codec::get_mandatory::<String>(
			attrs::WIDTH,
			attributes,
			"1".to_owned(),
			true,
		);
		let (width, width_rest) =
			match lexical_core::parse_partial::<f64>(width_str.as_bytes()) {
				Ok((value, consumed)) => (value, &width_str[consumed..]),
				Err(_) => (0.0, width_str.as_str()),
			};

		// MrWriter writes pressures in a separate attribute, which takes
		// precedence; Xournal and Xournal++ use the width field
		let pressure_str = codec::get::<String>(attrs::PRESSURES, attributes);
		let pressure_src = pressure_str.as_deref().unwrap_or(width_rest);
		let pressures = &mut self.pressure_buffer;
		pressures.clear();
		if let Err(rest) = codec::scan_doubles(pressure_src, |v| pressures.push(v))
		{
			warn!(
				"a pressure value could not be parsed as double, remaining points: \"{}\"",
				rest
			);
		}

		let fill = codec::get_mandatory::<i32>(attrs::FILL, attributes, -1, false);
		let cap_style = codec::get_mandatory::<StrokeCapStyle>(
			attrs::CAPSTYLE,
			attributes,
			StrokeCapStyle::Round,
			false,
		);
		let line_style = codec::get::<LineStyle>(attrs::STYLE, attributes);

		self.collect_inline_audio(attributes, TagType::Stroke);
		let (audio_filename, audio_timestamp) = self.pending_audio.take();

		self.builder.add_stroke(
			tool,
			color,
			width,
			fill,
			cap_style,
			line_style,
			audio_filename,
			audio_timestamp,
		);
	}

	fn parse_stroke_text(&mut self, text: &str) {
		let mut points = Vec::with_capacity(self.pressure_buffer.len());
		let mut rest = text;
		loop {
			let x = match next_double(&mut rest) {
				Some(x) => x,
				None => break,
			};
			match next_double(&mut rest) {
				Some(y) => points.push(Point::new(x, y)),
				None => {
					if rest.is_empty() {
						warn!(
							"a stroke coordinate has no partner, \
							 remaining data: \"{}\"",
							x
						);
					}
					break;
				}
			}
		}
		if !rest.is_empty() {
			warn!(
				"a stroke coordinate could not be parsed as double, remaining data: \"{}\"",
				rest
			);
		}
		self.builder
			.set_stroke_points(points, mem::take(&mut self.pressure_buffer));
	}

	fn parse_text_tag(&mut self, attributes: &Attributes<'_>) {
		let font = codec::get_mandatory::<String>(
			attrs::FONT,
			attributes,
			"Sans".to_owned(),
			true,
		);
		let size = codec::get_mandatory::<f64>(attrs::SIZE, attributes, 12.0, true);
		let x = codec::get_mandatory::<f64>(attrs::X_COORD, attributes, 0.0, true);
		let y = codec::get_mandatory::<f64>(attrs::Y_COORD, attributes, 0.0, true);
		let color = codec::get_color_mandatory(attributes, Color::BLACK, false);

		self.collect_inline_audio(attributes, TagType::Text);
		let (audio_filename, audio_timestamp) = self.pending_audio.take();

		self.builder
			.add_text(font, size, x, y, color, audio_filename, audio_timestamp);
	}

	fn parse_image(&mut self, attributes: &Attributes<'_>) {
		let left =
			codec::get_mandatory::<f64>(attrs::LEFT_POS, attributes, 0.0, true);
		let top = codec::get_mandatory::<f64>(attrs::TOP_POS, attributes, 0.0, true);
		let right =
			codec::get_mandatory::<f64>(attrs::RIGHT_POS, attributes, 0.0, true);
		let bottom =
			codec::get_mandatory::<f64>(attrs::BOTTOM_POS, attributes, 0.0, true);
		self.builder.add_image(left, top, right, bottom);
	}

	fn parse_image_text(&mut self, text: &str) {
		if let Some(data) = codec::decode_base64(text) {
			self.builder.set_image_data(data);
		}
	}

	fn parse_tex_image(&mut self, attributes: &Attributes<'_>) {
		let left =
			codec::get_mandatory::<f64>(attrs::LEFT_POS, attributes, 0.0, true);
		let top = codec::get_mandatory::<f64>(attrs::TOP_POS, attributes, 0.0, true);
		let right =
			codec::get_mandatory::<f64>(attrs::RIGHT_POS, attributes, 0.0, true);
		let bottom =
			codec::get_mandatory::<f64>(attrs::BOTTOM_POS, attributes, 0.0, true);
		let text = codec::get_mandatory::<String>(
			attrs::TEXT,
			attributes,
			String::new(),
			true,
		);
		self.builder.add_tex_image(left, top, right, bottom, text);
	}

	fn parse_tex_image_text(&mut self, text: &str) {
		if let Some(data) = codec::decode_base64(text) {
			self.builder.set_tex_image_data(data);
		}
	}

	fn parse_attachment(&mut self, attributes: &Attributes<'_>) {
		let path = codec::get_mandatory::<PathBuf>(
			attrs::PATH,
			attributes,
			PathBuf::new(),
			true,
		);
		// Route on the nearest open image ancestor
		let host = self
			.hierarchy
			.iter()
			.rev()
			.copied()
			.find(|t| matches!(t, TagType::Image | TagType::TexImage));
		match host {
			Some(TagType::Image) => self.builder.set_image_attachment(path),
			Some(TagType::TexImage) => self.builder.set_tex_image_attachment(path),
			_ => {}
		}
	}
}

/// Parse the next ASCII double out of `s`, skipping separators, advancing
/// `s` past the parsed bytes. `None` on the first unparsable token.
fn next_double(s: &mut &str) -> Option<f64> {
	let cur: &str = *s;
	let rest = cur.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
	*s = rest;
	if rest.is_empty() {
		return None;
	}
	match lexical_core::parse_partial::<f64>(rest.as_bytes()) {
		Ok((value, consumed)) if consumed > 0 => {
			*s = &rest[consumed..];
			Some(value)
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn next_double_advances_and_stops() {
		let mut s = "1.5 , 2 x 3";
		assert_eq!(next_double(&mut s), Some(1.5));
		assert_eq!(next_double(&mut s), Some(2.0));
		assert_eq!(next_double(&mut s), None);
		assert_eq!(s, "x 3");
	}
}
