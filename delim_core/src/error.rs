use miette::Diagnostic;
use thiserror::Error;

/// Boxed error returned by a [`Resolver`](crate::Resolver) when a lookup
/// fails outright (as opposed to declining with `None`).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DelimError {
	#[error(transparent)]
	#[diagnostic(code(delim::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid filter configuration: {0}")]
	#[diagnostic(
		code(delim::configuration),
		help("delimiters are written as `<begin>*<end>` (e.g. `${{*}}`) or as a single token (e.g. `@`)")
	)]
	Configuration(String),

	#[error("failed to resolve placeholder `{placeholder}`")]
	#[diagnostic(code(delim::interpolation))]
	Interpolation {
		placeholder: String,
		#[source]
		source: BoxError,
	},

	#[error("cannot roll back the lookahead buffer: mark is invalid or exceeded {limit} character(s)")]
	#[diagnostic(
		code(delim::rollback),
		help("the lookahead window is derived from the configured delimiters and escape string")
	)]
	Rollback { limit: usize },

	#[error("the stream was aborted by an earlier interpolation failure")]
	#[diagnostic(code(delim::aborted))]
	Aborted,

	#[error("the stream has been closed")]
	#[diagnostic(code(delim::closed))]
	Closed,

	#[error("failed to read config file `{path}`: {reason}")]
	#[diagnostic(code(delim::config_read))]
	ConfigRead { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(delim::config_parse),
		help("check that delim.toml is valid TOML with top-level filter keys and an optional [properties] table")
	)]
	ConfigParse(String),
}

impl DelimError {
	pub(crate) fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration(message.into())
	}
}

impl From<DelimError> for std::io::Error {
	fn from(error: DelimError) -> Self {
		match error {
			DelimError::Io(io) => io,
			other => std::io::Error::other(other),
		}
	}
}

pub type DelimResult<T> = Result<T, DelimError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
