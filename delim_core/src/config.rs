use serde::Deserialize;

use crate::DelimError;
use crate::DelimResult;
use crate::DelimiterSet;
use crate::DelimiterSpecification;

/// Fixed safety margin added to the lookahead window on top of the
/// configured token lengths.
pub const BASE_LOOKAHEAD_CAPACITY: usize = 255;

/// Serializable filter settings, as written in a `delim.toml` file:
///
/// ```toml
/// delimiters = ["${*}", "@"]
/// escape = "\\"
/// preserve_escape = false
/// multiline = false
/// ```
///
/// Validation happens when converting into a [`FilterConfiguration`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterSettings {
	/// Compact delimiter specs in priority order. Empty means the default
	/// `${*}`.
	pub delimiters: Vec<String>,
	/// Escape string that suppresses substitution of the following
	/// placeholder.
	pub escape: Option<String>,
	/// Keep the escape string in the output when it escapes a delimiter.
	pub preserve_escape: bool,
	/// Allow placeholders to span line breaks.
	pub multiline: bool,
}

impl TryFrom<FilterSettings> for FilterConfiguration {
	type Error = DelimError;

	fn try_from(settings: FilterSettings) -> Result<Self, Self::Error> {
		let mut config = if settings.delimiters.is_empty() {
			Self::default()
		} else {
			Self::with_delimiters(DelimiterSet::parse_all(&settings.delimiters)?)?
		};

		config.set_escape_string(settings.escape)?;
		config.set_preserve_escaped_delimiter(settings.preserve_escape);
		config.set_multiline_matching_allowed(settings.multiline);

		Ok(config)
	}
}

/// Validated configuration shared by every stream it is attached to.
///
/// The lookahead capacity is derived from the escape string and the
/// delimiter set, and is recomputed by every setter that changes either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfiguration {
	delimiters: DelimiterSet,
	escape_string: Option<String>,
	preserve_escaped_delimiter: bool,
	multiline_matching_allowed: bool,
	lookahead_capacity: usize,
}

impl Default for FilterConfiguration {
	fn default() -> Self {
		let mut config = Self {
			delimiters: std::iter::once(DelimiterSpecification::default()).collect(),
			escape_string: None,
			preserve_escaped_delimiter: false,
			multiline_matching_allowed: false,
			lookahead_capacity: 0,
		};
		config.recompute_lookahead_capacity();
		config
	}
}

impl FilterConfiguration {
	/// Configuration using the conventional `${*}` delimiter.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_delimiters(delimiters: DelimiterSet) -> DelimResult<Self> {
		let mut config = Self::default();
		config.set_delimiters(delimiters)?;
		Ok(config)
	}

	/// Parse and set the delimiters from compact specs, e.g.
	/// `["${*}", "@"]`.
	pub fn from_specs<I, S>(specs: I) -> DelimResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self::with_delimiters(DelimiterSet::parse_all(specs)?)
	}

	pub fn delimiters(&self) -> &DelimiterSet {
		&self.delimiters
	}

	pub fn escape_string(&self) -> Option<&str> {
		self.escape_string.as_deref()
	}

	pub fn preserve_escaped_delimiter(&self) -> bool {
		self.preserve_escaped_delimiter
	}

	pub fn multiline_matching_allowed(&self) -> bool {
		self.multiline_matching_allowed
	}

	pub fn lookahead_capacity(&self) -> usize {
		self.lookahead_capacity
	}

	pub fn set_delimiters(&mut self, delimiters: DelimiterSet) -> DelimResult<()> {
		if delimiters.is_empty() {
			return Err(DelimError::configuration("at least one delimiter is required"));
		}

		self.delimiters = delimiters;
		self.recompute_lookahead_capacity();
		Ok(())
	}

	/// Append a delimiter parsed from a compact spec. Duplicates are ignored.
	pub fn add_delimiter(&mut self, spec: &str) -> DelimResult<()> {
		let spec = DelimiterSpecification::parse(spec)?;
		if self.delimiters.insert(spec) {
			self.recompute_lookahead_capacity();
		}
		Ok(())
	}

	pub fn set_escape_string(&mut self, escape: Option<String>) -> DelimResult<()> {
		if escape.as_deref() == Some("") {
			return Err(DelimError::configuration("escape string is empty"));
		}

		self.escape_string = escape;
		self.recompute_lookahead_capacity();
		Ok(())
	}

	pub fn set_preserve_escaped_delimiter(&mut self, preserve: bool) {
		self.preserve_escaped_delimiter = preserve;
	}

	pub fn set_multiline_matching_allowed(&mut self, allowed: bool) {
		self.multiline_matching_allowed = allowed;
	}

	/// Checks the invariants a stream relies on before its first read.
	pub fn validate(&self) -> DelimResult<()> {
		if self.delimiters.is_empty() {
			return Err(DelimError::configuration("at least one delimiter is required"));
		}

		if self.escape_string.as_deref() == Some("") {
			return Err(DelimError::configuration("escape string is empty"));
		}

		Ok(())
	}

	fn expected_lookahead_capacity(&self) -> usize {
		let escape = self
			.escape_string
			.as_deref()
			.map_or(0, |escape| escape.chars().count());
		let delimiters: usize = self
			.delimiters
			.iter()
			.map(DelimiterSpecification::char_len)
			.sum();

		BASE_LOOKAHEAD_CAPACITY + escape + delimiters
	}

	fn recompute_lookahead_capacity(&mut self) {
		self.lookahead_capacity = self.expected_lookahead_capacity();
	}
}

