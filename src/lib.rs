/*!
# Streaming reader for Xournal-compatible notebook XML

This crate reads the restricted XML dialect written by Xournal, Xournal++
and MrWriter, in two layers:

* The [tokenizer] turns a byte stream into a flat sequence of
  [`Node`]s (opening tags with attributes, closing tags, text), decoding
  character references in place and lending string views out of its own
  buffer. No allocation happens per node; views stay valid until the next
  node is requested, which the borrow checker enforces.
* The [parser] consumes that node stream, tracks element nesting depth
  against the notebook document schema, converts attribute values to
  typed data and forwards the results to a [`DocumentBuilder`]
  implemented by the caller.

Input bytes come from a [`ByteSource`]; [`IoSource`] adapts anything
implementing [`std::io::Read`].

Malformed input is treated leniently where the legacy formats demand it:
unknown tags, unknown attributes and unparsable values are skipped with a
[`log`] warning, while grammar violations and unbalanced tags abort with
an [`Error`].

## Example

```
use xoj_xml::{Reader, Node, IoSource};

let doc = &b"<xournal version=\"0.4.8\"><page/></xournal>"[..];
let mut reader = Reader::new(IoSource::new(doc));
match reader.read_node()? {
	Node::Opening(node) => {
		assert_eq!(node.name(), "xournal");
		assert_eq!(node.attributes().get("version"), Some("0.4.8"));
	}
	other => panic!("unexpected node: {:?}", other),
}
# Ok::<(), xoj_xml::Error>(())
```
*/
use std::io;

pub mod codec;
mod error;
pub mod model;
pub mod tags;
pub mod tokenizer;
pub mod parser;


pub use error::{Error, Result, SyntaxError};
pub use model::{
	Color, Domain, LineStyle, PageStyle, PageStyleFormat, Point, StrokeCapStyle,
	StrokeTool,
};
pub use parser::{DocumentBuilder, DocumentParser};
pub use tags::TagType;
pub use tokenizer::{Attributes, Node, Reader};

/**
# Source of input bytes

Abstraction the [tokenizer](crate::tokenizer) pulls its input from. A
source hands out whatever amount of data it has ready, which need not
align with any XML structure; the tokenizer buffers across reads.
*/
pub trait ByteSource {
	/// Read up to `buf.len()` bytes into `buf`, returning how many were
	/// written. `Ok(0)` signals the end of data.
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

	/// Called exactly once when the reader is done with the source, also
	/// on error paths.
	fn close(&mut self) {}
}

/// [`ByteSource`] over any [`io::Read`], e.g. a file or an in-memory
/// slice.
pub struct IoSource<R: io::Read> {
	inner: R,
}

impl<R: io::Read> IoSource<R> {
	pub fn new(inner: R) -> IoSource<R> {
		IoSource { inner }
	}

	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl<R: io::Read> ByteSource for IoSource<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.inner.read(buf)
	}
}

/// Parse a complete notebook document from `source`, forwarding all
/// events to `builder`.
///
/// Convenience over constructing a [`DocumentParser`] by hand.
pub fn load_document<S: ByteSource, B: DocumentBuilder>(
	source: S,
	builder: &mut B,
) -> Result<()> {
	DocumentParser::new(source, builder).parse_document()
}
