use crate::CharSource;
use crate::DelimError;
use crate::DelimResult;

/// The rollback window opened by [`LookaheadSource::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mark {
	limit: usize,
	valid: bool,
}

/// Wraps a [`CharSource`] with `mark`/`reset` over a bounded window.
///
/// While a mark is active, every character handed out is retained in
/// `buffer` so that [`reset`](Self::reset) can replay it. Consuming more
/// than `limit` characters past the mark invalidates it, after which
/// `reset` fails with [`DelimError::Rollback`].
#[derive(Debug)]
pub struct LookaheadSource<S> {
	inner: S,
	/// Characters pulled from `inner` since the active mark.
	buffer: Vec<char>,
	/// Read position within `buffer`.
	cursor: usize,
	mark: Option<Mark>,
}

impl<S: CharSource> LookaheadSource<S> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			buffer: Vec::new(),
			cursor: 0,
			mark: None,
		}
	}

	/// Record the current position. Up to `limit` characters read after
	/// this call can be replayed with [`reset`](Self::reset).
	pub fn mark(&mut self, limit: usize) {
		self.buffer.drain(..self.cursor);
		self.cursor = 0;
		self.mark = Some(Mark { limit, valid: true });
	}

	/// Rewind to the last mark.
	pub fn reset(&mut self) -> DelimResult<()> {
		match self.mark {
			Some(Mark { valid: true, .. }) => {
				self.cursor = 0;
				Ok(())
			}
			Some(Mark { limit, valid: false }) => Err(DelimError::Rollback { limit }),
			None => Err(DelimError::Rollback { limit: 0 }),
		}
	}

	/// Characters consumed since the active mark.
	pub fn consumed_since_mark(&self) -> usize {
		match self.mark {
			Some(Mark { valid: true, .. }) => self.cursor,
			_ => 0,
		}
	}

	pub fn read(&mut self) -> DelimResult<Option<char>> {
		if let Some(&ch) = self.buffer.get(self.cursor) {
			self.advance();
			return Ok(Some(ch));
		}

		let next = self.inner.read_char()?;
		match (next, self.mark) {
			(Some(ch), Some(Mark { valid: true, .. })) => {
				self.buffer.push(ch);
				self.advance();
				Ok(Some(ch))
			}
			(next, _) => Ok(next),
		}
	}

	/// Read and discard up to `count` characters, returning how many were
	/// actually skipped.
	pub fn skip(&mut self, count: usize) -> DelimResult<usize> {
		for skipped in 0..count {
			if self.read()?.is_none() {
				return Ok(skipped);
			}
		}

		Ok(count)
	}

	pub fn close(&mut self) -> DelimResult<()> {
		self.buffer.clear();
		self.cursor = 0;
		self.mark = None;
		self.inner.close()
	}

	pub fn get_ref(&self) -> &S {
		&self.inner
	}

	fn advance(&mut self) {
		self.cursor += 1;

		let Some(mark) = self.mark.as_mut() else {
			return;
		};

		if mark.valid && self.cursor > mark.limit {
			mark.valid = false;
			self.buffer.drain(..self.cursor);
			self.cursor = 0;
		}
	}
}
