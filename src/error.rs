/*!
# Error types

This module holds the error types returned by the various functions of this
crate.

Only *fatal* conditions are modelled here. Recoverable oddities in legacy
files (unknown tags, unparsable attribute values, conflicting audio
attachments, …) are reported through [`log::warn!`] and never abort a load.
*/
use std::error;
use std::fmt;
use std::io;
use std::result::Result as StdResult;
use std::str::Utf8Error;

/// Violation of the supported XML subset encountered by the tokenizer.
///
/// These are grammar-level problems: the byte stream cannot be segmented
/// into nodes anymore. There is no tokenizer-level recovery; callers which
/// need tolerance implement it at the document-schema layer instead (by
/// ignoring unrecognized tags, not malformed syntax).
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
	/// End-of-data encountered during a construct where more bytes were
	/// expected.
	///
	/// The contents are implementation details.
	UnexpectedEndOfData(&'static str),

	/// Byte which was not expected at that point in the grammar.
	///
	/// The contents are implementation details.
	UnexpectedCharacter(&'static str, char),
}

impl error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::UnexpectedEndOfData(ctx) => {
				write!(f, "unexpected end of data {}", ctx)
			}
			Self::UnexpectedCharacter(ctx, ch) => {
				write!(f, "unexpected character {:?} {}", ch, ctx)
			}
		}
	}
}

/// Error types which may be returned from the tokenizer or the document
/// parser.
///
/// All of these are fatal: they unwind the whole parse. Whatever has been
/// committed to the [`DocumentBuilder`](crate::DocumentBuilder) through
/// `finalize_*` calls before the error point is kept; this crate makes no
/// consistency guarantee about such a partial document.
#[derive(Debug)]
pub enum Error {
	/// The [`ByteSource`](crate::ByteSource) reported a failure.
	Read(io::Error),

	/// The byte stream violates the supported XML grammar subset.
	Parse(SyntaxError),

	/// A node view contained an invalid UTF-8 sequence.
	InvalidUtf8(Utf8Error),

	/// The document structure is unsound: a closing tag without a matching
	/// opening tag, or an empty document root.
	///
	/// The message names the offending tag and, where applicable, the tag
	/// it should have matched.
	MalformedDocument(String),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub(crate) fn eof(ctx: &'static str) -> Error {
		Error::Parse(SyntaxError::UnexpectedEndOfData(ctx))
	}

	pub(crate) fn unexpected_char(ctx: &'static str, ch: char) -> Error {
		Error::Parse(SyntaxError::UnexpectedCharacter(ctx, ch))
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::Read(e)
	}
}

impl From<SyntaxError> for Error {
	fn from(e: SyntaxError) -> Error {
		Error::Parse(e)
	}
}

impl From<Utf8Error> for Error {
	fn from(e: Utf8Error) -> Error {
		Error::InvalidUtf8(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::Read(e) => write!(f, "read error: {}", e),
			Error::Parse(e) => write!(f, "parse error: {}", e),
			Error::InvalidUtf8(e) => write!(f, "invalid utf-8: {}", e),
			Error::MalformedDocument(msg) => {
				write!(f, "malformed document: {}", msg)
			}
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Read(e) => Some(e),
			Error::Parse(e) => Some(e),
			Error::InvalidUtf8(e) => Some(e),
			Error::MalformedDocument(_) => None,
		}
	}
}
