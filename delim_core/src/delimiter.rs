use std::fmt::Display;
use std::str::FromStr;

use derive_more::Deref;
use serde::Deserialize;
use serde::Deserializer;

use crate::DelimError;
use crate::DelimResult;

/// Separator between the begin and end tokens in a compact delimiter spec.
pub const DELIMITER_WILDCARD: char = '*';

/// The conventional default delimiter, `${` ... `}`.
pub const DEFAULT_DELIMITER: &str = "${*}";

/// A begin/end token pair marking the boundaries of a placeholder.
///
/// Both tokens are always non-empty. A compact spec containing exactly one
/// `*` splits into `begin*end`; anything else is self-delimiting, so `"@"`
/// describes `@name@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelimiterSpecification {
	begin: String,
	end: String,
}

impl DelimiterSpecification {
	/// Parse a compact delimiter spec such as `"${*}"` or `"@"`.
	pub fn parse(spec: &str) -> DelimResult<Self> {
		if spec.is_empty() {
			return Err(DelimError::configuration("delimiter specification is empty"));
		}

		let wildcards = spec.matches(DELIMITER_WILDCARD).count();
		if wildcards != 1 {
			return Ok(Self {
				begin: spec.to_string(),
				end: spec.to_string(),
			});
		}

		let (begin, end) = spec
			.split_once(DELIMITER_WILDCARD)
			.unwrap_or((spec, spec));

		if begin.is_empty() || end.is_empty() {
			return Err(DelimError::configuration(format!(
				"delimiter specification `{spec}` has an empty begin or end token"
			)));
		}

		Ok(Self {
			begin: begin.to_string(),
			end: end.to_string(),
		})
	}

	pub fn begin(&self) -> &str {
		&self.begin
	}

	pub fn end(&self) -> &str {
		&self.end
	}

	/// True when the begin and end tokens are the same string.
	pub fn is_self_delimiting(&self) -> bool {
		self.begin == self.end
	}

	/// Number of characters in the begin and end tokens combined.
	pub fn char_len(&self) -> usize {
		self.begin.chars().count() + self.end.chars().count()
	}

	/// If `placeholder` is wrapped in this pair, return the text between the
	/// tokens.
	pub fn strip<'a>(&self, placeholder: &'a str) -> Option<&'a str> {
		if placeholder.len() < self.begin.len() + self.end.len() {
			return None;
		}

		placeholder
			.strip_prefix(self.begin.as_str())
			.and_then(|rest| rest.strip_suffix(self.end.as_str()))
	}
}

impl Default for DelimiterSpecification {
	fn default() -> Self {
		Self {
			begin: "${".to_string(),
			end: "}".to_string(),
		}
	}
}

impl Display for DelimiterSpecification {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_self_delimiting() {
			write!(f, "{}", self.begin)
		} else {
			write!(f, "{}{DELIMITER_WILDCARD}{}", self.begin, self.end)
		}
	}
}

impl FromStr for DelimiterSpecification {
	type Err = DelimError;

	fn from_str(spec: &str) -> Result<Self, Self::Err> {
		Self::parse(spec)
	}
}

impl<'de> Deserialize<'de> for DelimiterSpecification {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let spec = String::deserialize(deserializer)?;
		Self::parse(&spec).map_err(serde::de::Error::custom)
	}
}

/// An insertion-ordered set of delimiter specifications.
///
/// Adding a specification that is already present is a no-op, so the
/// position of its first insertion is what decides match priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct DelimiterSet(Vec<DelimiterSpecification>);

impl DelimiterSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse each compact spec in order, collapsing duplicates.
	pub fn parse_all<I, S>(specs: I) -> DelimResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut set = Self::new();
		for spec in specs {
			set.insert(DelimiterSpecification::parse(spec.as_ref())?);
		}

		Ok(set)
	}

	/// Returns `true` if the specification was not already present.
	pub fn insert(&mut self, spec: DelimiterSpecification) -> bool {
		if self.0.contains(&spec) {
			return false;
		}

		self.0.push(spec);
		true
	}

	/// The specification whose begin and end tokens wrap `placeholder`, in
	/// insertion order.
	pub fn find_wrapping(&self, placeholder: &str) -> Option<&DelimiterSpecification> {
		self.0.iter().find(|spec| spec.strip(placeholder).is_some())
	}
}

impl FromIterator<DelimiterSpecification> for DelimiterSet {
	fn from_iter<T: IntoIterator<Item = DelimiterSpecification>>(iter: T) -> Self {
		let mut set = Self::new();
		for spec in iter {
			set.insert(spec);
		}
		set
	}
}

impl<'a> IntoIterator for &'a DelimiterSet {
	type IntoIter = std::slice::Iter<'a, DelimiterSpecification>;
	type Item = &'a DelimiterSpecification;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
