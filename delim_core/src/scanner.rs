use tracing::debug;
use tracing::trace;

use crate::CharSource;
use crate::DelimError;
use crate::DelimResult;
use crate::FilterConfiguration;
use crate::LookaheadSource;
use crate::Resolver;

/// Mutable scan state owned by exactly one stream.
///
/// `pending_text` holds a replacement (or a verbatim placeholder) that is
/// being drained one character per read. `pending_cursor` is a byte offset
/// into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
	pending_text: String,
	pending_cursor: usize,
	end_of_stream: bool,
	aborted: bool,
}

impl ScanState {
	pub fn new() -> Self {
		Self::default()
	}

	/// The part of the pending replacement that has not been emitted yet.
	pub fn pending(&self) -> &str {
		&self.pending_text[self.pending_cursor..]
	}

	pub fn is_end_of_stream(&self) -> bool {
		self.end_of_stream
	}

	/// Set once a resolver failure has aborted the stream.
	pub fn is_aborted(&self) -> bool {
		self.aborted
	}

	fn set_pending(&mut self, text: String) {
		self.pending_text = text;
		self.pending_cursor = 0;
	}

	fn next_pending(&mut self) -> Option<char> {
		let ch = self.pending().chars().next()?;
		self.pending_cursor += ch.len_utf8();

		if self.pending_cursor == self.pending_text.len() {
			self.pending_text.clear();
			self.pending_cursor = 0;
		}

		Some(ch)
	}
}

/// A delimiter pair pre-split into characters for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tokens {
	begin: Vec<char>,
	end: Vec<char>,
}

/// What the lookahead found at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
	/// Plain character.
	Literal,
	/// The escape string matched and no begin token follows it.
	Escaped,
	/// The escape string matched directly before a begin token.
	EscapedDelimiter,
	/// The begin token of `delimiters[index]` matched.
	Placeholder(usize),
}

/// The streaming state machine that finds and replaces placeholders.
///
/// The scanner is immutable and may be shared; all per-stream state lives
/// in [`ScanState`].
#[derive(Debug, Clone)]
pub struct TokenScanner {
	delimiters: Vec<Tokens>,
	escape: Vec<char>,
	preserve_escaped_delimiter: bool,
	multiline_matching_allowed: bool,
	lookahead_capacity: usize,
}

impl TokenScanner {
	pub fn new(config: &FilterConfiguration) -> Self {
		let delimiters = config
			.delimiters()
			.iter()
			.map(|spec| {
				Tokens {
					begin: spec.begin().chars().collect(),
					end: spec.end().chars().collect(),
				}
			})
			.collect();

		Self {
			delimiters,
			escape: config
				.escape_string()
				.map(|escape| escape.chars().collect())
				.unwrap_or_default(),
			preserve_escaped_delimiter: config.preserve_escaped_delimiter(),
			multiline_matching_allowed: config.multiline_matching_allowed(),
			lookahead_capacity: config.lookahead_capacity(),
		}
	}

	/// Emit the next output character, or `None` at the end of the stream.
	pub fn next_char<S, R>(
		&self,
		source: &mut LookaheadSource<S>,
		state: &mut ScanState,
		resolver: &mut R,
	) -> DelimResult<Option<char>>
	where
		S: CharSource,
		R: Resolver + ?Sized,
	{
		if state.aborted {
			return Err(DelimError::Aborted);
		}

		loop {
			if let Some(ch) = state.next_pending() {
				return Ok(Some(ch));
			}

			if state.end_of_stream {
				return Ok(None);
			}

			source.mark(self.lookahead_capacity);
			let Some(ch) = source.read()? else {
				state.end_of_stream = true;
				return Ok(None);
			};

			if self.is_line_break(ch) {
				return Ok(Some(ch));
			}

			match self.decide(source, ch)? {
				Decision::Literal => return Ok(Some(ch)),
				decision @ (Decision::Escaped | Decision::EscapedDelimiter) => {
					source.skip(self.escape.len())?;

					let mut text = String::new();
					if decision == Decision::Escaped || self.preserve_escaped_delimiter {
						text.extend(&self.escape);
					}
					if let Some(next) = source.read()? {
						text.push(next);
					}

					state.set_pending(text);
				}
				Decision::Placeholder(index) => {
					let Some(placeholder) = self.capture(source, &self.delimiters[index])? else {
						// Unterminated: emit the begin position's first character
						// and rescan from the one after it.
						source.reset()?;
						return source.read();
					};

					trace!(%placeholder, "captured placeholder");
					let replacement = match resolver.resolve(&placeholder) {
						Ok(Some(value)) => {
							debug!(%placeholder, "resolved placeholder");
							value
						}
						Ok(None) => {
							debug!(%placeholder, "unresolved placeholder left verbatim");
							placeholder
						}
						Err(cause) => {
							state.aborted = true;
							return Err(DelimError::Interpolation {
								placeholder,
								source: cause,
							});
						}
					};

					state.set_pending(replacement);
				}
			}
		}
	}

	/// Inspect the characters after `ch` and rewind to the mark. Returns
	/// with the source positioned just after `ch`, except for escapes, which
	/// leave it at the mark.
	fn decide<S: CharSource>(
		&self,
		source: &mut LookaheadSource<S>,
		ch: char,
	) -> DelimResult<Decision> {
		let escaped = self.match_escape(source, ch)?;
		let offset = if escaped { self.escape.len() } else { 0 };
		let matched = self.match_begin(source, offset)?;
		source.reset()?;

		match (escaped, matched) {
			(true, None) => Ok(Decision::Escaped),
			(true, Some(_)) => Ok(Decision::EscapedDelimiter),
			(false, Some(index)) => Ok(Decision::Placeholder(index)),
			(false, None) => {
				source.skip(1)?;
				Ok(Decision::Literal)
			}
		}
	}

	fn is_line_break(&self, ch: char) -> bool {
		ch == '\n' && !self.multiline_matching_allowed
	}

	/// `first` has already been read from the source.
	fn match_escape<S: CharSource>(
		&self,
		source: &mut LookaheadSource<S>,
		first: char,
	) -> DelimResult<bool> {
		let Some((&head, rest)) = self.escape.split_first() else {
			return Ok(false);
		};

		if head != first {
			return Ok(false);
		}

		self.match_chars(source, rest)
	}

	/// First delimiter, in insertion order, whose begin token starts
	/// `offset` characters past the mark.
	fn match_begin<S: CharSource>(
		&self,
		source: &mut LookaheadSource<S>,
		offset: usize,
	) -> DelimResult<Option<usize>> {
		for (index, tokens) in self.delimiters.iter().enumerate() {
			source.reset()?;
			source.skip(offset)?;

			if self.match_chars(source, &tokens.begin)? {
				return Ok(Some(index));
			}
		}

		Ok(None)
	}

	fn match_chars<S: CharSource>(
		&self,
		source: &mut LookaheadSource<S>,
		expected: &[char],
	) -> DelimResult<bool> {
		for &wanted in expected {
			match source.read()? {
				Some(ch) if ch == wanted && !self.is_line_break(ch) => {}
				_ => return Ok(false),
			}
		}

		Ok(true)
	}

	/// Consume the begin token and collect characters up to and including
	/// the end token. Returns `None` when EOF, a disallowed line break, or the
	/// edge of the lookahead window comes first.
	///
	/// The end token is matched with a trailing counter that restarts from
	/// the full token length on any mismatch, so an end token that overlaps
	/// itself (e.g. `aab` in `aaab`) can be missed.
	fn capture<S: CharSource>(
		&self,
		source: &mut LookaheadSource<S>,
		tokens: &Tokens,
	) -> DelimResult<Option<String>> {
		source.skip(tokens.begin.len())?;

		let mut placeholder: String = tokens.begin.iter().collect();
		let mut remaining = tokens.end.len();

		while source.consumed_since_mark() < self.lookahead_capacity {
			let Some(ch) = source.read()? else {
				break;
			};

			if self.is_line_break(ch) {
				break;
			}

			placeholder.push(ch);

			if ch == tokens.end[tokens.end.len() - remaining] {
				remaining -= 1;
				if remaining == 0 {
					return Ok(Some(placeholder));
				}
			} else {
				remaining = tokens.end.len();
			}
		}

		trace!(%placeholder, "placeholder cut short");
		Ok(None)
	}
}
