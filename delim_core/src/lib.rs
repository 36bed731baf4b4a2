//! `delim_core` is the streaming engine behind [delim](https://github.com/ifiokjr/delim). It reads a character stream and replaces placeholders, text wrapped in a configurable begin/end delimiter pair such as `${name}` or `@name@`, with values from a [`Resolver`]. Literal text passes through unchanged, in a single forward pass with a bounded lookahead window.
//!
//! ## Processing Pipeline
//!
//! ```text
//! CharSource (StrSource, ReaderSource, or another StreamFilter)
//!   → LookaheadSource (mark / reset over a bounded window)
//!   → TokenScanner (escape check → delimiter check → key capture → resolve)
//!   → StreamFilter (drains replacements one character per read)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Filter settings and the validated [`FilterConfiguration`], including the derived lookahead capacity.
//! - [`source`] — The [`CharSource`] trait with in-memory and UTF-8 reader implementations.
//!
//! ## Key Types
//!
//! - [`DelimiterSpecification`] — A begin/end token pair parsed from `"${*}"` or `"@"`.
//! - [`DelimiterSet`] — Insertion-ordered, duplicate-free delimiters. Earlier entries win.
//! - [`StreamFilter`] — The public read interface: `read_one`, `read_into`, `skip`, `close`.
//! - [`PropertyResolver`] — A map-backed [`Resolver`] that strips delimiters before lookup.
//!
//! ## Quick Start
//!
//! ```rust
//! use delim_core::FilterConfiguration;
//! use delim_core::PropertyResolver;
//! use delim_core::filter_str;
//!
//! let config = FilterConfiguration::from_specs(["${*}", "@"]).unwrap();
//! let resolver =
//! 	PropertyResolver::with_properties(config.delimiters().clone(), [("name", "delim")]);
//!
//! let output = filter_str("hello ${name} and @name@", config, resolver).unwrap();
//! assert_eq!(output, "hello delim and delim");
//! ```

pub use config::*;
pub use delimiter::*;
pub use error::*;
pub use filter::*;
pub use lookahead::*;
pub use resolver::*;
pub use scanner::*;
pub use source::*;

pub mod config;
mod delimiter;
#[allow(unused_assignments)]
mod error;
mod filter;
mod lookahead;
mod resolver;
mod scanner;
pub mod source;

#[cfg(test)]
mod __fixtures;
