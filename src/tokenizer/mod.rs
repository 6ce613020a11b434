/*!
# Streaming, in-situ XML tokenizer

A growable-buffer lexer producing a sequence of raw XML nodes (opening tag,
closing tag, text, end-of-stream) as views into its own byte arena.

The tokenizer owns buffer refill, compaction and growth, and performs
character-reference substitution *in place*: since the replacement text of
an entity is never longer than its markup, subsequent bytes are shifted
leftward inside the buffer, so returned views are always contiguous and
fully decoded.

Views returned by [`Reader::read_node`] borrow the reader. This is the
central aliasing invariant of the design: a refill may move or reallocate
the underlying bytes, so no view may outlive the node that produced it.
Holding a [`Node`] borrows the reader mutably, forcing callers to copy any
value they want to keep into owned storage before requesting the next node.

Only the subset of XML needed for the notebook file format is supported:
elements, attributes, text, comments, CDATA sections, processing
instructions, the five predefined entities and numeric character
references. Anything else is a fatal [`Error::Parse`].
*/
use std::fmt;
use std::str;

use crate::error::{Error, Result};
use crate::ByteSource;

const INITIAL_BUFFER_SIZE: usize = 1024;

/// Byte range into the reader's buffer.
///
/// Spans are plain indices, so buffer reallocation does not invalidate
/// them; compaction shifts them through [`Pending::shift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Span {
	start: usize,
	end: usize,
}

impl Span {
	fn len(&self) -> usize {
		self.end - self.start
	}
}

/// Spans of the node currently under construction.
///
/// While a node is being lexed, a buffer refill may compact the live data
/// window towards the buffer start. Every span recorded here is shifted by
/// the same distance the bytes moved, which keeps them valid. While
/// `active`, the refill logic also refrains from evicting data at or after
/// `data_start`.
#[derive(Debug, Default)]
struct Pending {
	active: bool,
	name: Span,
	temp_attr_name: Span,
	attrs: Vec<(Span, Span)>,
}

impl Pending {
	fn begin(&mut self) {
		self.active = true;
		self.name = Span::default();
		self.temp_attr_name = Span::default();
		self.attrs.clear();
	}

	fn shift(&mut self, distance: usize) {
		if !self.active {
			return;
		}
		let shift = |span: &mut Span| {
			if span.len() > 0 {
				span.start -= distance;
				span.end -= distance;
			}
		};
		shift(&mut self.name);
		shift(&mut self.temp_attr_name);
		for (name, value) in self.attrs.iter_mut() {
			shift(name);
			shift(value);
		}
	}
}

/// What the main read loop decided on, before spans are resolved into
/// string views.
enum RawKind {
	Opening { empty: bool },
	Closing,
	Text(Span),
	End,
}

/// Ordered attribute list of an opening tag.
///
/// Insertion order is document order; names are not required to be unique.
/// [`Attributes::get`] returns the first match, which is the lookup policy
/// the document parser relies on.
#[derive(Clone, Copy)]
pub struct Attributes<'a> {
	buf: &'a [u8],
	spans: &'a [(Span, Span)],
}

impl<'a> Attributes<'a> {
	fn resolve(&self, span: Span) -> &'a str {
		// Safety: every span was UTF-8-validated when the node was
		// resolved, before this struct was handed out.
		unsafe { str::from_utf8_unchecked(&self.buf[span.start..span.end]) }
	}

	/// Look up an attribute value by name (first match).
	pub fn get(&self, name: &str) -> Option<&'a str> {
		self.spans
			.iter()
			.find(|(n, _)| self.resolve(*n) == name)
			.map(|(_, v)| self.resolve(*v))
	}

	pub fn len(&self) -> usize {
		self.spans.len()
	}

	pub fn is_empty(&self) -> bool {
		self.spans.is_empty()
	}

	/// Iterate over `(name, value)` pairs in document order.
	pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
		self.spans
			.iter()
			.map(move |(n, v)| (self.resolve(*n), self.resolve(*v)))
	}
}

impl<'a> fmt::Debug for Attributes<'a> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

/// One lexical unit of the raw XML stream.
///
/// All contained views point into the reader's buffer and are valid until
/// the next [`Reader::read_node`] call (enforced by the borrow).
#[derive(Debug)]
pub enum Node<'a> {
	Opening(OpeningNode<'a>),
	Closing(ClosingNode<'a>),
	Text(TextNode<'a>),
	/// End of the byte stream. Carries nothing.
	End,
}

#[derive(Debug)]
pub struct OpeningNode<'a> {
	name: &'a str,
	empty: bool,
	attributes: Attributes<'a>,
}

impl<'a> OpeningNode<'a> {
	pub fn name(&self) -> &'a str {
		self.name
	}

	/// Whether this is a self-closing ("empty") element, i.e. there will
	/// be no matching closing node.
	pub fn is_empty(&self) -> bool {
		self.empty
	}

	pub fn attributes(&self) -> Attributes<'a> {
		self.attributes
	}
}

#[derive(Debug)]
pub struct ClosingNode<'a> {
	name: &'a str,
}

impl<'a> ClosingNode<'a> {
	pub fn name(&self) -> &'a str {
		self.name
	}
}

#[derive(Debug)]
pub struct TextNode<'a> {
	text: &'a str,
}

impl<'a> TextNode<'a> {
	pub fn text(&self) -> &'a str {
		self.text
	}
}

fn resolve_named_entity(name: &[u8]) -> Option<u8> {
	match name {
		b"amp" => Some(b'&'),
		b"lt" => Some(b'<'),
		b"gt" => Some(b'>'),
		b"apos" => Some(b'\''),
		b"quot" => Some(b'"'),
		_ => None,
	}
}

/**
# Streaming in-situ XML reader

Pull-based: each [`Reader::read_node`] call drains the [`ByteSource`] until
a full node is available or the end of data is reached. The source's
`close()` is invoked exactly once when the reader is dropped, including
during unwinding.
*/
pub struct Reader<S: ByteSource> {
	source: S,
	closed: bool,

	buffer: Vec<u8>,
	// Invariant: data_start <= current_pos <= data_end <= buffer.len().
	// data_start is the eviction barrier: bytes before it may be
	// discarded by the next refill, bytes at or after it belong to the
	// in-flight node.
	data_start: usize,
	current_pos: usize,
	data_end: usize,
	has_more_data: bool,
	last_node_was_opening: bool,

	// Cumulative shrinkage from in-place entity replacement that has not
	// been applied to the bytes in [first_offset, current_pos) yet. Only
	// meaningful while non-zero.
	reading_offset: usize,
	first_offset: usize,

	pending: Pending,
}

impl<S: ByteSource> Reader<S> {
	pub fn new(source: S) -> Reader<S> {
		Self::with_capacity(source, INITIAL_BUFFER_SIZE)
	}

	/// Create a reader with a custom initial buffer size.
	///
	/// The buffer still grows on demand; a small initial size merely
	/// forces the growth and compaction paths early (which is what the
	/// tests use it for).
	pub fn with_capacity(source: S, capacity: usize) -> Reader<S> {
		Reader {
			source,
			closed: false,
			buffer: vec![0u8; capacity.max(16)],
			data_start: 0,
			current_pos: 0,
			data_end: 0,
			has_more_data: true,
			last_node_was_opening: false,
			reading_offset: 0,
			first_offset: 0,
			pending: Pending::default(),
		}
	}

	/// Reads the next node from the XML input.
	///
	/// Returns [`Node::End`] once the end of data is reached. Processing
	/// instructions, comments, CDATA sections and whitespace-only text
	/// runs never produce a node.
	pub fn read_node(&mut self) -> Result<Node<'_>> {
		let kind = loop {
			if !self.last_node_was_opening {
				// Content between nodes at non-leaf depth is
				// insignificant.
				self.skip_whitespace()?;
			} else if self.current_pos == self.data_end {
				self.refill_buffer()?;
			}

			if self.current_pos == self.data_end && !self.has_more_data {
				break RawKind::End;
			}

			let c = self.peek()?;
			if c == b'<' {
				self.advance();
				match self.peek()? {
					b'/' => {
						self.parse_closing_node()?;
						break RawKind::Closing;
					}
					b'?' => self.ignore_node_end()?,
					b'!' => self.ignore_special_xml()?,
					_ => {
						let empty = self.parse_opening_node()?;
						break RawKind::Opening { empty };
					}
				}
			} else if self.last_node_was_opening {
				// Discard whitespace-only text nodes
				if let Some(span) = self.parse_text_node()? {
					break RawKind::Text(span);
				}
			} else {
				return Err(Error::unexpected_char(
					"outside of a node",
					c as char,
				));
			}
		};
		self.resolve_node(kind)
	}

	/// Validate the spans of the finished node and hand out views.
	fn resolve_node(&self, kind: RawKind) -> Result<Node<'_>> {
		let check = |span: Span| -> Result<&str> {
			Ok(str::from_utf8(&self.buffer[span.start..span.end])?)
		};
		match kind {
			RawKind::End => Ok(Node::End),
			RawKind::Text(span) => Ok(Node::Text(TextNode {
				text: check(span)?,
			})),
			RawKind::Closing => Ok(Node::Closing(ClosingNode {
				name: check(self.pending.name)?,
			})),
			RawKind::Opening { empty } => {
				let name = check(self.pending.name)?;
				for (n, v) in self.pending.attrs.iter() {
					check(*n)?;
					check(*v)?;
				}
				Ok(Node::Opening(OpeningNode {
					name,
					empty,
					attributes: Attributes {
						buf: &self.buffer,
						spans: &self.pending.attrs,
					},
				}))
			}
		}
	}

	/// Refill the buffer, making room first if necessary: if no node is
	/// in flight, everything before the read cursor is evicted; the live
	/// data window is compacted to the buffer start; if the buffer is
	/// full even then, its size is doubled.
	///
	/// Returns the distance existing data was shifted to the left, which
	/// has already been applied to the reader's own indices and the
	/// pending node's spans. Callers holding local span starts must apply
	/// it themselves.
	fn refill_buffer(&mut self) -> Result<usize> {
		if !self.pending.active {
			// Nothing before the cursor needs to stay addressable.
			self.data_start = self.current_pos;
		}
		let old_data_start = self.data_start;
		if self.data_start != 0 && self.data_start != self.data_end {
			// Move the live window to the start of the buffer
			let shift = self.data_start;
			self.buffer.copy_within(self.data_start..self.data_end, 0);
			self.data_end -= shift;
			self.current_pos -= shift;
			if self.reading_offset != 0 {
				self.first_offset -= shift;
			}
			self.data_start = 0;
		} else if self.data_start == self.data_end {
			// Everything consumed, simply overwrite
			debug_assert!(self.reading_offset == 0);
			self.data_start = 0;
			self.current_pos = 0;
			self.data_end = 0;
		} else if self.data_start == 0 && self.data_end == self.buffer.len() {
			// Buffer full and nothing evictable: double its size
			let new_size = self.buffer.len() * 2;
			self.buffer.resize(new_size, 0);
		}

		let bytes_read = self.source.read(&mut self.buffer[self.data_end..])?;
		self.data_end += bytes_read;
		if bytes_read == 0 {
			self.has_more_data = false;
		}

		let shift = old_data_start - self.data_start;
		if shift != 0 {
			self.pending.shift(shift);
		}
		Ok(shift)
	}

	fn peek(&mut self) -> Result<u8> {
		if self.current_pos == self.data_end && self.has_more_data {
			self.refill_buffer()?;
		}
		if self.current_pos != self.data_end {
			Ok(self.buffer[self.current_pos])
		} else {
			Ok(0)
		}
	}

	fn advance(&mut self) {
		if self.current_pos != self.data_end {
			self.current_pos += 1;
		}
	}

	fn skip_whitespace(&mut self) -> Result<()> {
		while self.peek()?.is_ascii_whitespace() {
			self.advance();
		}
		Ok(())
	}

	/// Apply the accumulated entity shrinkage to the bytes between
	/// `first_offset` and the read cursor, closing the gap left by
	/// replaced references.
	fn move_offset_data(&mut self) {
		if self.reading_offset != 0 && self.current_pos > self.first_offset {
			self.buffer.copy_within(
				self.first_offset..self.current_pos,
				self.first_offset - self.reading_offset,
			);
			self.first_offset = self.current_pos;
		}
	}

	/// Read a character reference (`&...;`) and replace it in place with
	/// the character it denotes. Unrecognized references are left
	/// verbatim.
	///
	/// Returns the distance the surrounding data was shifted by refills
	/// during the reference scan.
	fn replace_character_reference(&mut self) -> Result<usize> {
		// Close any gap from earlier references first, so the write
		// position arithmetic below sees a contiguous prefix.
		self.move_offset_data();
		self.advance(); // Skip '&'
		let mut total_shift = 0usize;
		let mut start = self.current_pos;
		loop {
			while self.current_pos != self.data_end
				&& self.buffer[self.current_pos] != b';'
			{
				self.advance();
			}
			if self.current_pos != self.data_end {
				break;
			}
			if !self.has_more_data {
				return Err(Error::eof("in character reference"));
			}
			let shift = self.refill_buffer()?;
			start -= shift;
			total_shift += shift;
		}
		// current_pos is at ';'
		let entity_len = self.current_pos - start;
		if let Some(replacement) =
			resolve_named_entity(&self.buffer[start..self.current_pos])
		{
			// "&name;" shrinks to one byte
			self.reading_offset += entity_len + 1;
			let dst = self.current_pos - self.reading_offset;
			self.buffer[dst] = replacement;
			self.first_offset = self.current_pos + 1;
		} else if entity_len >= 2 && self.buffer[start] == b'#' {
			// Numeric character references such as &#123; or &#xABC;
			let (digits, radix) = if self.buffer[start + 1] == b'x' {
				(start + 2..self.current_pos, 16)
			} else {
				(start + 1..self.current_pos, 10)
			};
			let codepoint = str::from_utf8(&self.buffer[digits])
				.ok()
				.and_then(|s| u32::from_str_radix(s, radix).ok())
				.and_then(std::char::from_u32);
			if let Some(ch) = codepoint {
				let num_bytes = ch.len_utf8();
				// The encoded form never exceeds the reference markup,
				// so there is always enough space before the tail.
				let dst = self.current_pos - self.reading_offset - entity_len - 1;
				ch.encode_utf8(&mut self.buffer[dst..dst + num_bytes]);
				self.reading_offset += entity_len + 2 - num_bytes;
				self.first_offset = self.current_pos + 1;
			}
			// Unparsable codepoints are left verbatim
		}
		// Unknown entities are left verbatim
		Ok(total_shift)
	}

	/// Scan forward while `pred` holds, refilling as needed, resolving
	/// character references along the way unless `ignore_refs` is set
	/// (data inside comments does not matter).
	fn parse_while(
		&mut self,
		pred: impl Fn(u8) -> bool,
		ignore_refs: bool,
	) -> Result<Span> {
		let mut start = self.current_pos;
		loop {
			while self.current_pos != self.data_end
				&& pred(self.buffer[self.current_pos])
			{
				if self.buffer[self.current_pos] == b'&' && !ignore_refs {
					start -= self.replace_character_reference()?;
				}
				self.advance();
			}
			if self.current_pos != self.data_end {
				break;
			}
			if !self.has_more_data {
				return Err(Error::eof("while parsing a node"));
			}
			start -= self.refill_buffer()?;
		}
		if ignore_refs {
			Ok(Span {
				start,
				end: self.current_pos,
			})
		} else {
			// Apply any outstanding reference shrinkage so the view is
			// contiguous decoded data.
			self.move_offset_data();
			let span = Span {
				start,
				end: self.current_pos - self.reading_offset,
			};
			self.reading_offset = 0;
			Ok(span)
		}
	}

	fn parse_until(&mut self, terminator: u8, ignore_refs: bool) -> Result<Span> {
		self.parse_while(|c| c != terminator, ignore_refs)
	}

	/// Parse a tag or attribute name from the current position.
	fn parse_name(&mut self) -> Result<Span> {
		self.parse_while(
			|c| c.is_ascii_alphanumeric() || c == b':' || c == b'_' || c == b'-',
			false,
		)
	}

	/// Returns the empty-element flag.
	fn parse_opening_node(&mut self) -> Result<bool> {
		self.data_start = self.current_pos;
		self.pending.begin();
		self.pending.name = self.parse_name()?;
		self.skip_whitespace()?;

		loop {
			let c = self.peek()?;
			if c == b'/' || c == b'>' {
				break;
			}
			// The attribute name span lives in `pending` so that a
			// refill during the value scan keeps it valid.
			self.pending.temp_attr_name = self.parse_name()?;
			self.advance(); // Skip '='
			let quote = self.peek()?;
			self.advance(); // Skip opening quote
			let value = self.parse_until(quote, false)?;
			self.advance(); // Skip closing quote
			let name = std::mem::take(&mut self.pending.temp_attr_name);
			self.pending.attrs.push((name, value));
			self.skip_whitespace()?;
		}

		let mut empty = false;
		if self.peek()? == b'/' {
			empty = true;
			self.advance();
		}
		self.advance(); // Skip '>'
		self.pending.active = false;
		self.last_node_was_opening = true;
		Ok(empty)
	}

	fn parse_closing_node(&mut self) -> Result<()> {
		self.advance(); // Skip '/'
		self.data_start = self.current_pos;
		self.pending.begin();
		self.pending.name = self.parse_name()?;
		self.advance(); // Skip '>'
		self.pending.active = false;
		self.last_node_was_opening = false;
		Ok(())
	}

	/// Returns `None` for whitespace-only text runs.
	fn parse_text_node(&mut self) -> Result<Option<Span>> {
		self.data_start = self.current_pos;
		self.pending.begin();
		let span = self.parse_until(b'<', false)?;
		self.pending.active = false;
		self.last_node_was_opening = false;
		let all_whitespace = self.buffer[span.start..span.end]
			.iter()
			.all(|c| c.is_ascii_whitespace());
		if all_whitespace {
			Ok(None)
		} else {
			Ok(Some(span))
		}
	}

	/// Skip a comment, CDATA section or `<!…>` declaration without
	/// producing a node.
	fn ignore_special_xml(&mut self) -> Result<()> {
		self.advance(); // Skip '!'
		if self.peek()? == b'-' {
			self.advance(); // Skip first '-'
			if self.peek()? == b'-' {
				self.advance();
				loop {
					// Go to the next candidate closing hyphen, then
					// check for the second one
					self.parse_until(b'-', true)?;
					self.advance();
					if self.peek()? == b'-' || self.current_pos == self.data_end {
						break;
					}
				}
				// Comments may occur inside text sections
				self.last_node_was_opening = true;
				self.ignore_node_end()?;
			}
		} else if self.peek()? == b'[' {
			// CDATA section
			self.parse_until(b']', true)?;
			self.ignore_node_end()?;
		} else {
			// Other declarations
			self.ignore_node_end()?;
		}
		Ok(())
	}

	fn ignore_node_end(&mut self) -> Result<()> {
		self.parse_until(b'>', true)?;
		self.advance();
		Ok(())
	}
}

impl<S: ByteSource> Drop for Reader<S> {
	fn drop(&mut self) {
		if !self.closed {
			self.closed = true;
			self.source.close();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::ChunkedSource;
	use crate::IoSource;

	fn reader_for(doc: &[u8]) -> Reader<IoSource<&[u8]>> {
		Reader::new(IoSource::new(doc))
	}

	fn expect_opening<'a, S: ByteSource>(
		r: &'a mut Reader<S>,
	) -> OpeningNode<'a> {
		match r.read_node().unwrap() {
			Node::Opening(n) => n,
			_ => panic!("expected opening node"),
		}
	}

	fn expect_text<'a, S: ByteSource>(r: &'a mut Reader<S>) -> &'a str {
		match r.read_node().unwrap() {
			Node::Text(n) => n.text(),
			_ => panic!("expected text node"),
		}
	}

	fn expect_closing<'a, S: ByteSource>(r: &'a mut Reader<S>) -> &'a str {
		match r.read_node().unwrap() {
			Node::Closing(n) => n.name(),
			_ => panic!("expected closing node"),
		}
	}

	#[test]
	fn simple_document() {
		let mut r = reader_for(b"<root a=\"1\" b='two'><leaf/>text</root>");
		{
			let node = expect_opening(&mut r);
			assert_eq!(node.name(), "root");
			assert!(!node.is_empty());
			assert_eq!(node.attributes().len(), 2);
			assert_eq!(node.attributes().get("a"), Some("1"));
			assert_eq!(node.attributes().get("b"), Some("two"));
			assert_eq!(node.attributes().get("c"), None);
		}
		{
			let node = expect_opening(&mut r);
			assert_eq!(node.name(), "leaf");
			assert!(node.is_empty());
		}
		assert_eq!(expect_text(&mut r), "text");
		assert_eq!(expect_closing(&mut r), "root");
		assert!(matches!(r.read_node().unwrap(), Node::End));
	}

	#[test]
	fn whitespace_only_text_is_discarded() {
		let mut r = reader_for(b"<a>\n\t  <b/>\n</a>");
		assert_eq!(expect_opening(&mut r).name(), "a");
		assert_eq!(expect_opening(&mut r).name(), "b");
		assert_eq!(expect_closing(&mut r), "a");
		assert!(matches!(r.read_node().unwrap(), Node::End));
	}

	#[test]
	fn predefined_entities_decode_in_text() {
		let mut r = reader_for(b"<a>&amp;&lt;&gt;&apos;&quot;</a>");
		expect_opening(&mut r);
		assert_eq!(expect_text(&mut r), "&<>'\"");
	}

	#[test]
	fn numeric_references_decode_in_text() {
		let mut r = reader_for(b"<a>&#65;&#x41;&#xe4;</a>");
		expect_opening(&mut r);
		assert_eq!(expect_text(&mut r), "AA\u{e4}");
	}

	#[test]
	fn unknown_references_stay_verbatim() {
		let mut r = reader_for(b"<a>&foo;x&amp;y&#zz;</a>");
		expect_opening(&mut r);
		assert_eq!(expect_text(&mut r), "&foo;x&y&#zz;");
	}

	#[test]
	fn entities_decode_in_attribute_values() {
		let mut r = reader_for(b"<a n=\"x &amp; &#x79;\"/>");
		let node = expect_opening(&mut r);
		assert_eq!(node.attributes().get("n"), Some("x & y"));
	}

	#[test]
	fn attribute_lookup_is_first_match() {
		let mut r = reader_for(b"<a n='first' n='second'/>");
		let node = expect_opening(&mut r);
		assert_eq!(node.attributes().len(), 2);
		assert_eq!(node.attributes().get("n"), Some("first"));
	}

	#[test]
	fn comments_and_declarations_are_skipped() {
		let doc = b"<?xml version='1.0'?>\n<!DOCTYPE x>\n<a><!-- ignore - me -->text<![CDATA[zzz]]></a>";
		let mut r = reader_for(doc);
		assert_eq!(expect_opening(&mut r).name(), "a");
		assert_eq!(expect_text(&mut r), "text");
		assert_eq!(expect_closing(&mut r), "a");
	}

	#[test]
	fn long_value_forces_buffer_growth() {
		let payload: String = std::iter::repeat("0123456789").take(100).collect();
		let doc = format!("<a v=\"{}\">{}</a>", payload, payload);
		let mut r = Reader::with_capacity(IoSource::new(doc.as_bytes()), 16);
		{
			let node = expect_opening(&mut r);
			assert_eq!(node.attributes().get("v").unwrap(), payload);
		}
		assert_eq!(expect_text(&mut r), payload);
		assert_eq!(expect_closing(&mut r), "a");
	}

	#[test]
	fn chunked_source_produces_identical_nodes() {
		let doc = b"<root a=\"&amp;&#65;\"><x>one &lt; two</x></root>";
		for chunk in [1usize, 2, 3, 7] {
			let mut r = Reader::with_capacity(
				ChunkedSource::new(doc.to_vec(), chunk),
				16,
			);
			{
				let node = expect_opening(&mut r);
				assert_eq!(node.name(), "root");
				assert_eq!(node.attributes().get("a"), Some("&A"));
			}
			assert_eq!(expect_opening(&mut r).name(), "x");
			assert_eq!(expect_text(&mut r), "one < two");
			assert_eq!(expect_closing(&mut r), "x");
			assert_eq!(expect_closing(&mut r), "root");
			assert!(matches!(r.read_node().unwrap(), Node::End));
		}
	}

	#[test]
	fn multiple_references_in_one_run() {
		let mut r = reader_for(b"<a>a&amp;b&amp;c and &#x61;&#x62;</a>");
		expect_opening(&mut r);
		assert_eq!(expect_text(&mut r), "a&b&c and ab");
	}

	#[test]
	fn stray_character_outside_node_is_an_error() {
		let mut r = reader_for(b"<a></a>junk");
		expect_opening(&mut r);
		expect_closing(&mut r);
		assert!(matches!(r.read_node(), Err(Error::Parse(_))));
	}

	#[test]
	fn unterminated_tag_is_an_error() {
		let mut r = reader_for(b"<root attr=\"unterminated");
		assert!(matches!(r.read_node(), Err(Error::Parse(_))));
	}

	#[test]
	fn close_is_called_exactly_once() {
		use std::cell::Cell;
		use std::rc::Rc;

		struct CountingSource(Rc<Cell<u32>>);
		impl ByteSource for CountingSource {
			fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
				Ok(0)
			}
			fn close(&mut self) {
				self.0.set(self.0.get() + 1);
			}
		}

		let count = Rc::new(Cell::new(0));
		{
			let mut r = Reader::new(CountingSource(count.clone()));
			assert!(matches!(r.read_node().unwrap(), Node::End));
		}
		assert_eq!(count.get(), 1);
	}
}
