use std::io::Read;
use std::io::Write;
use std::sync::Arc;

use crate::CharSource;
use crate::DelimError;
use crate::DelimResult;
use crate::FilterConfiguration;
use crate::LookaheadSource;
use crate::Resolver;
use crate::ScanState;
use crate::StrSource;
use crate::TokenScanner;

/// Characters moved per batch by [`StreamFilter::write_to`].
const WRITE_CHUNK: usize = 1024;

/// Pull-based placeholder substitution over a [`CharSource`].
///
/// A filter is itself a [`CharSource`], so one configuration's output can
/// feed another filter. Closing the outermost filter closes every wrapped
/// layer, and the innermost source, exactly once.
pub struct StreamFilter<S, R> {
	source: LookaheadSource<S>,
	config: Arc<FilterConfiguration>,
	scanner: TokenScanner,
	state: ScanState,
	resolver: R,
	closed: bool,
	/// UTF-8 bytes of a character only partly copied out by [`Read::read`].
	spill: [u8; 4],
	spill_range: std::ops::Range<usize>,
}

impl<S, R> std::fmt::Debug for StreamFilter<S, R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StreamFilter")
			.field("config", &self.config)
			.field("state", &self.state)
			.field("closed", &self.closed)
			.finish_non_exhaustive()
	}
}

impl<S: CharSource, R: Resolver> StreamFilter<S, R> {
	/// Wrap `source`. The configuration is validated here so that a broken
	/// configuration never reaches the scanner.
	pub fn new(
		source: S,
		config: impl Into<Arc<FilterConfiguration>>,
		resolver: R,
	) -> DelimResult<Self> {
		let config = config.into();
		config.validate()?;

		Ok(Self {
			source: LookaheadSource::new(source),
			scanner: TokenScanner::new(&config),
			config,
			state: ScanState::new(),
			resolver,
			closed: false,
			spill: [0; 4],
			spill_range: 0..0,
		})
	}

	pub fn state(&self) -> &ScanState {
		&self.state
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// The next filtered character, or `None` at the end of the stream.
	pub fn read_one(&mut self) -> DelimResult<Option<char>> {
		if self.closed {
			return Err(DelimError::Closed);
		}

		self.scanner
			.next_char(&mut self.source, &mut self.state, &mut self.resolver)
	}

	/// Fill `buffer[offset..offset + length]`. Returns the number of
	/// characters written, or `None` if the stream ended before any were.
	pub fn read_into(
		&mut self,
		buffer: &mut [char],
		offset: usize,
		length: usize,
	) -> DelimResult<Option<usize>> {
		let Some(window) = offset
			.checked_add(length)
			.and_then(|end| buffer.get_mut(offset..end))
		else {
			return Err(DelimError::configuration(format!(
				"range {offset}..{offset}+{length} is outside a buffer of {} characters",
				buffer.len()
			)));
		};

		let mut count = 0;
		for slot in window {
			let Some(ch) = self.read_one()? else {
				break;
			};
			*slot = ch;
			count += 1;
		}

		if count == 0 && length > 0 {
			return Ok(None);
		}

		Ok(Some(count))
	}

	/// Discard up to `count` filtered characters, returning how many were
	/// actually skipped.
	pub fn skip(&mut self, count: usize) -> DelimResult<usize> {
		for skipped in 0..count {
			if self.read_one()?.is_none() {
				return Ok(skipped);
			}
		}

		Ok(count)
	}

	/// Release the wrapped source. Only the first call reaches it.
	pub fn close(&mut self) -> DelimResult<()> {
		if self.closed {
			return Ok(());
		}

		self.closed = true;
		self.source.close()
	}

	/// Iterate over the remaining filtered characters. Iteration stops at the
	/// end of the stream; errors are yielded and do not end it.
	pub fn chars(&mut self) -> impl Iterator<Item = DelimResult<char>> + '_ {
		std::iter::from_fn(move || self.read_one().transpose())
	}

	/// Drain the remaining output into a string.
	pub fn read_to_string(&mut self) -> DelimResult<String> {
		let mut output = String::new();
		while let Some(ch) = self.read_one()? {
			output.push(ch);
		}

		Ok(output)
	}

	/// Copy the remaining output to `writer` as UTF-8, returning the number
	/// of characters written. The writer is flushed at the end.
	pub fn write_to(&mut self, writer: &mut impl Write) -> DelimResult<usize> {
		let mut chunk = ['\0'; WRITE_CHUNK];
		let mut encoded = String::with_capacity(WRITE_CHUNK);
		let mut total = 0;

		while let Some(count) = self.read_into(&mut chunk, 0, WRITE_CHUNK)? {
			encoded.clear();
			encoded.extend(&chunk[..count]);
			writer.write_all(encoded.as_bytes())?;
			total += count;
		}

		writer.flush()?;
		Ok(total)
	}

	/// The wrapped source, e.g. to inspect an inner filter of a chain.
	pub fn get_ref(&self) -> &S {
		self.source.get_ref()
	}
}

impl<S: CharSource, R: Resolver> CharSource for StreamFilter<S, R> {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		self.read_one()
	}

	fn close(&mut self) -> DelimResult<()> {
		StreamFilter::close(self)
	}
}

impl<S: CharSource, R: Resolver> Read for StreamFilter<S, R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let mut written = 0;

		while written < buf.len() {
			if self.spill_range.is_empty() {
				let Some(ch) = self.read_one()? else {
					break;
				};
				let len = ch.encode_utf8(&mut self.spill).len();
				self.spill_range = 0..len;
			}

			let pending = &self.spill[self.spill_range.clone()];
			let take = pending.len().min(buf.len() - written);
			buf[written..written + take].copy_from_slice(&pending[..take]);
			written += take;
			self.spill_range.start += take;
		}

		Ok(written)
	}
}

/// Filter a whole string in memory.
pub fn filter_str<R: Resolver>(
	text: &str,
	config: impl Into<Arc<FilterConfiguration>>,
	resolver: R,
) -> DelimResult<String> {
	let mut filter = StreamFilter::new(StrSource::new(text), config, resolver)?;
	let output = filter.read_to_string()?;
	filter.close()?;
	Ok(output)
}
