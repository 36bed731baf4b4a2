use std::io::BufRead;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Read;

use crate::DelimResult;

/// A forward-only source of characters.
///
/// Implementations must keep returning `Ok(None)` once the end of the
/// stream is reached.
pub trait CharSource {
	/// Read the next character, or `None` at the end of the stream.
	fn read_char(&mut self) -> DelimResult<Option<char>>;

	/// Release the underlying resource. Calling this more than once must
	/// be harmless.
	fn close(&mut self) -> DelimResult<()> {
		Ok(())
	}
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		(**self).read_char()
	}

	fn close(&mut self) -> DelimResult<()> {
		(**self).close()
	}
}

/// In-memory text source.
#[derive(Debug, Clone)]
pub struct StrSource {
	text: String,
	offset: usize,
}

impl StrSource {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			offset: 0,
		}
	}
}

impl CharSource for StrSource {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		let next = self.text[self.offset..].chars().next();
		if let Some(ch) = next {
			self.offset += ch.len_utf8();
		}

		Ok(next)
	}
}

/// Decodes UTF-8 characters from any [`Read`] implementation.
///
/// Malformed input surfaces as an [`ErrorKind::InvalidData`] I/O error.
/// After [`close`](CharSource::close) the inner reader is dropped and the
/// source reports end of stream.
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
	reader: Option<BufReader<R>>,
}

impl<R: Read> ReaderSource<R> {
	pub fn new(reader: R) -> Self {
		Self {
			reader: Some(BufReader::new(reader)),
		}
	}

	pub fn is_closed(&self) -> bool {
		self.reader.is_none()
	}
}

/// Length in bytes of the UTF-8 sequence introduced by `lead`.
fn utf8_width(lead: u8) -> Option<usize> {
	match lead {
		0x00..=0x7F => Some(1),
		0xC2..=0xDF => Some(2),
		0xE0..=0xEF => Some(3),
		0xF0..=0xF4 => Some(4),
		_ => None,
	}
}

fn invalid_utf8() -> std::io::Error {
	std::io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

impl<R: Read> CharSource for ReaderSource<R> {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		let Some(reader) = self.reader.as_mut() else {
			return Ok(None);
		};

		let mut bytes = [0u8; 4];
		let lead = loop {
			match reader.fill_buf() {
				Ok([]) => return Ok(None),
				Ok(available) => break available[0],
				Err(error) if error.kind() == ErrorKind::Interrupted => {}
				Err(error) => return Err(error.into()),
			}
		};

		let width = utf8_width(lead).ok_or_else(invalid_utf8)?;
		bytes[0] = lead;
		reader.consume(1);

		if width > 1 {
			reader.read_exact(&mut bytes[1..width]).map_err(|error| {
				if error.kind() == ErrorKind::UnexpectedEof {
					invalid_utf8()
				} else {
					error
				}
			})?;
		}

		let decoded = std::str::from_utf8(&bytes[..width]).map_err(|_| invalid_utf8())?;
		Ok(decoded.chars().next())
	}

	fn close(&mut self) -> DelimResult<()> {
		self.reader = None;
		Ok(())
	}
}
