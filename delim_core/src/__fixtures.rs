use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::BoxError;
use crate::CharSource;
use crate::DelimResult;
use crate::FilterConfiguration;
use crate::PropertyResolver;
use crate::StrSource;
use crate::StreamFilter;
use crate::filter_str;

/// Resolve placeholders (delimiters included) from a fixed table.
pub fn table_resolver(
	entries: &[(&str, &str)],
) -> impl FnMut(&str) -> Result<Option<String>, BoxError> + use<> {
	let table: HashMap<String, String> = entries
		.iter()
		.map(|(key, value)| ((*key).to_string(), (*value).to_string()))
		.collect();

	move |placeholder: &str| Ok(table.get(placeholder).cloned())
}

/// Filter `input` with `config` and the given placeholder table.
pub fn filter_with(
	input: &str,
	config: FilterConfiguration,
	entries: &[(&str, &str)],
) -> DelimResult<String> {
	filter_str(input, config, table_resolver(entries))
}

/// A configuration using the given compact specs.
pub fn config_for(specs: &[&str]) -> FilterConfiguration {
	FilterConfiguration::from_specs(specs.iter().copied()).expect("valid delimiter specs")
}

/// `${*}` with a `\` escape string.
pub fn escaped_config(preserve: bool) -> FilterConfiguration {
	let mut config = FilterConfiguration::default();
	config
		.set_escape_string(Some("\\".to_string()))
		.expect("valid escape");
	config.set_preserve_escaped_delimiter(preserve);
	config
}

/// A source that counts how often it has been closed.
pub struct CountingSource {
	inner: StrSource,
	pub closes: Rc<Cell<usize>>,
}

impl CountingSource {
	pub fn new(text: &str) -> Self {
		Self {
			inner: StrSource::new(text),
			closes: Rc::new(Cell::new(0)),
		}
	}
}

impl CharSource for CountingSource {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		self.inner.read_char()
	}

	fn close(&mut self) -> DelimResult<()> {
		self.closes.set(self.closes.get() + 1);
		Ok(())
	}
}

/// A source that fails with an I/O error after yielding `text`.
pub struct FailingSource {
	inner: StrSource,
}

impl FailingSource {
	pub fn new(text: &str) -> Self {
		Self {
			inner: StrSource::new(text),
		}
	}
}

impl CharSource for FailingSource {
	fn read_char(&mut self) -> DelimResult<Option<char>> {
		match self.inner.read_char()? {
			Some(ch) => Ok(Some(ch)),
			None => Err(std::io::Error::other("disk on fire").into()),
		}
	}
}

/// A `${*}` filter over `text` that resolves nothing.
pub fn identity_filter(text: &str) -> StreamFilter<StrSource, PropertyResolver> {
	let config = FilterConfiguration::default();
	let resolver = PropertyResolver::new(config.delimiters().clone());
	StreamFilter::new(StrSource::new(text), config, resolver).expect("default configuration is valid")
}
