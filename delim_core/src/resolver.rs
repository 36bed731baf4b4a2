use std::collections::BTreeMap;

use crate::BoxError;
use crate::DelimiterSet;

/// Maps a captured placeholder, delimiters included (e.g. `"${name}"`), to
/// its replacement.
///
/// `Ok(None)` declines the placeholder, which then passes through
/// unchanged. An `Err` aborts the stream being filtered.
pub trait Resolver {
	fn resolve(&mut self, placeholder: &str) -> Result<Option<String>, BoxError>;
}

impl<F, E> Resolver for F
where
	F: FnMut(&str) -> Result<Option<String>, E>,
	E: Into<BoxError>,
{
	fn resolve(&mut self, placeholder: &str) -> Result<Option<String>, BoxError> {
		self(placeholder).map_err(Into::into)
	}
}

/// A [`Resolver`] built from an infallible lookup function.
#[derive(Debug, Clone, Copy)]
pub struct LookupFn<F>(F);

/// Wrap an infallible `placeholder -> Option<value>` function as a
/// [`Resolver`].
pub fn lookup_fn<F>(lookup: F) -> LookupFn<F>
where
	F: FnMut(&str) -> Option<String>,
{
	LookupFn(lookup)
}

impl<F> Resolver for LookupFn<F>
where
	F: FnMut(&str) -> Option<String>,
{
	fn resolve(&mut self, placeholder: &str) -> Result<Option<String>, BoxError> {
		Ok((self.0)(placeholder))
	}
}

/// Resolves `begin name end` placeholders from a table of named values.
///
/// The delimiters are stripped using the first specification in the set that
/// wraps the placeholder, then the remaining name is looked up. Unknown
/// names and placeholders no specification wraps are left unresolved.
#[derive(Debug, Clone, Default)]
pub struct PropertyResolver {
	delimiters: DelimiterSet,
	properties: BTreeMap<String, String>,
}

impl PropertyResolver {
	pub fn new(delimiters: DelimiterSet) -> Self {
		Self {
			delimiters,
			properties: BTreeMap::new(),
		}
	}

	pub fn with_properties<I, K, V>(delimiters: DelimiterSet, properties: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut resolver = Self::new(delimiters);
		resolver.extend(properties);
		resolver
	}

	/// Add or replace a property, returning the previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.properties.insert(name.into(), value.into())
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.properties.get(name).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.properties.len()
	}

	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// Look up the value for a placeholder that still carries its
	/// delimiters.
	pub fn lookup(&self, placeholder: &str) -> Option<&str> {
		let name = self.delimiters.find_wrapping(placeholder)?.strip(placeholder)?;
		self.get(name)
	}
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyResolver {
	fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
		for (name, value) in iter {
			self.insert(name, value);
		}
	}
}

impl Resolver for PropertyResolver {
	fn resolve(&mut self, placeholder: &str) -> Result<Option<String>, BoxError> {
		let value = self.lookup(placeholder).map(str::to_string);
		if value.is_none() {
			tracing::debug!(placeholder, "no property for placeholder");
		}

		Ok(value)
	}
}
