use std::path::PathBuf;

use clap::Parser;

pub use config::*;

pub mod config;

/// Delimiters used when neither the command line nor a config file names
/// any.
pub const DEFAULT_DELIMITERS: [&str; 2] = ["${*}", "@"];

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about = "Replace placeholders such as `${name}` in files and streams.",
	long_about = "delim filters text in a single streaming pass, replacing placeholders \
	              wrapped in configurable delimiters with property values.\n\nProperties come \
	              from the [properties] table of delim.toml and from --define flags. \
	              Placeholders without a value are left untouched.\n\nExamples:\n  delim -D \
	              name=world greeting.txt\n  delim --delimiter '#{*}' --escape '\\' -o out.txt \
	              in.txt\n  cat template | delim -D version=1.0.0"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct DelimCli {
	/// Files to filter. Reads stdin when empty or `-`.
	pub inputs: Vec<PathBuf>,

	/// Write the output to this file instead of stdout. Only valid with a
	/// single input.
	#[arg(long, short, conflicts_with = "output_dir")]
	pub output: Option<PathBuf>,

	/// Write each filtered input into this directory, keeping its file name.
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	/// Delimiter specification, either `<begin>*<end>` (e.g. `${*}`) or a
	/// single self-delimiting token (e.g. `@`). Repeat to enable several;
	/// earlier delimiters win when they overlap.
	#[arg(long = "delimiter", short = 'd', value_name = "SPEC")]
	pub delimiters: Vec<String>,

	/// Escape string that suppresses substitution of the placeholder
	/// directly after it, e.g. `\`.
	#[arg(long, short, value_name = "STRING")]
	pub escape: Option<String>,

	/// Keep the escape string in the output when it escapes a delimiter.
	#[arg(long, default_value_t = false, conflicts_with = "no_preserve_escape")]
	pub preserve_escape: bool,

	/// Drop the escape string even if the config file preserves it.
	#[arg(long, default_value_t = false)]
	pub no_preserve_escape: bool,

	/// Allow placeholders to span line breaks.
	#[arg(long, default_value_t = false, conflicts_with = "no_multiline")]
	pub multiline: bool,

	/// Stop placeholders at line breaks even if the config file allows
	/// multiline matching.
	#[arg(long, default_value_t = false)]
	pub no_multiline: bool,

	/// Define a property as `KEY=VALUE`. Overrides values from the config
	/// file.
	#[arg(long = "define", short = 'D', value_name = "KEY=VALUE", value_parser = parse_define)]
	pub defines: Vec<(String, String)>,

	/// Path to a config file. Defaults to the first of `delim.toml`,
	/// `.delim.toml` or `.config/delim.toml` in the current directory.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Enable verbose logging on stderr.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_define(define: &str) -> Result<(String, String), String> {
	let Some((key, value)) = define.split_once('=') else {
		return Err(format!("expected KEY=VALUE, got `{define}`"));
	};

	if key.is_empty() {
		return Err(format!("property name is empty in `{define}`"));
	}

	Ok((key.to_string(), value.to_string()))
}
