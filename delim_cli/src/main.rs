use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use delim_cli::DEFAULT_DELIMITERS;
use delim_cli::DelimCli;
use delim_cli::DelimConfig;
use delim_core::AnyEmptyResult;
use delim_core::DelimError;
use delim_core::DelimResult;
use delim_core::FilterConfiguration;
use delim_core::FilterSettings;
use delim_core::PropertyResolver;
use delim_core::ReaderSource;
use delim_core::StreamFilter;
use owo_colors::OwoColorize;
use supports_color::Stream;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DelimCli::parse();

	// Respect NO_COLOR env var, --no-color flag and non-terminal stderr.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	if let Err(e) = run(&args) {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<DelimError>() {
			Ok(delim_err) => {
				let report: miette::Report = (*delim_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so that filtered output on stdout stays clean.
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "delim=debug,delim_core=debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn run(args: &DelimCli) -> AnyEmptyResult {
	let file_config = load_config(args)?;
	let config = Arc::new(build_configuration(args, file_config.as_ref())?);

	let mut properties = PropertyResolver::new(config.delimiters().clone());
	if let Some(file_config) = &file_config {
		properties.extend(file_config.properties());
	}
	properties.extend(args.defines.iter().cloned());
	debug!(
		delimiters = ?config.delimiters().iter().map(ToString::to_string).collect::<Vec<_>>(),
		properties = properties.len(),
		"filter configured"
	);

	let inputs = if args.inputs.is_empty() {
		vec![PathBuf::from("-")]
	} else {
		args.inputs.clone()
	};

	if args.output.is_some() && inputs.len() > 1 {
		return Err("--output accepts a single input; use --output-dir for several".into());
	}

	for input in &inputs {
		let target = output_target(args, input)?;
		let written = filter_one(input, target.as_deref(), &config, properties.clone())?;
		info!(input = %input.display(), written, "filtered input");
	}

	Ok(())
}

fn load_config(args: &DelimCli) -> DelimResult<Option<DelimConfig>> {
	if let Some(path) = &args.config {
		return DelimConfig::load(path).map(Some);
	}

	let root = std::env::current_dir()?;
	let discovered = DelimConfig::discover(&root)?;
	if let Some((path, _)) = &discovered {
		debug!(path = %path.display(), "using config file");
	}

	Ok(discovered.map(|(_, config)| config))
}

/// Command line flags override the config file; delimiters fall back to
/// [`DEFAULT_DELIMITERS`] when neither names any.
fn build_configuration(
	args: &DelimCli,
	file_config: Option<&DelimConfig>,
) -> DelimResult<FilterConfiguration> {
	let file_settings = file_config.map(|config| config.filter.clone()).unwrap_or_default();

	let delimiters = [args.delimiters.clone(), file_settings.delimiters]
		.into_iter()
		.find(|delimiters| !delimiters.is_empty())
		.unwrap_or_else(|| DEFAULT_DELIMITERS.iter().map(ToString::to_string).collect());

	FilterConfiguration::try_from(FilterSettings {
		delimiters,
		escape: args.escape.clone().or(file_settings.escape),
		preserve_escape: switch(
			args.preserve_escape,
			args.no_preserve_escape,
			file_settings.preserve_escape,
		),
		multiline: switch(args.multiline, args.no_multiline, file_settings.multiline),
	})
}

/// Resolve a `--flag` / `--no-flag` pair, falling back to the config file.
fn switch(on: bool, off: bool, file: bool) -> bool {
	if on {
		true
	} else if off {
		false
	} else {
		file
	}
}

fn is_stdio(path: &Path) -> bool {
	path.as_os_str() == "-"
}

/// Where the filtered `input` goes. `None` means stdout.
fn output_target(args: &DelimCli, input: &Path) -> Result<Option<PathBuf>, String> {
	if let Some(output) = &args.output {
		return Ok(Some(output.clone()));
	}

	let Some(dir) = &args.output_dir else {
		return Ok(None);
	};

	if is_stdio(input) {
		return Err("stdin has no file name; use --output instead of --output-dir".to_string());
	}

	let Some(name) = input.file_name() else {
		return Err(format!("input `{}` has no file name", input.display()));
	};

	Ok(Some(dir.join(name)))
}

fn filter_one(
	input: &Path,
	target: Option<&Path>,
	config: &Arc<FilterConfiguration>,
	properties: PropertyResolver,
) -> DelimResult<usize> {
	let reader: Box<dyn Read> = if is_stdio(input) {
		Box::new(std::io::stdin().lock())
	} else {
		let file = File::open(input).map_err(|e| {
			std::io::Error::new(e.kind(), format!("cannot open `{}`: {e}", input.display()))
		})?;
		Box::new(file)
	};

	let mut filter = StreamFilter::new(ReaderSource::new(reader), config.clone(), properties)?;

	let Some(path) = target else {
		let written = filter.write_to(&mut BufWriter::new(std::io::stdout().lock()))?;
		filter.close()?;
		return Ok(written);
	};

	// The output is written next to its target and renamed into place once
	// the input is fully read, so `-o in.txt in.txt` filters in place and a
	// failed read never leaves a partial file behind.
	let dir = match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		Some(parent) => parent,
		None => Path::new("."),
	};
	std::fs::create_dir_all(dir)?;

	let mut staged = NamedTempFile::new_in(dir)?;
	let written = filter.write_to(&mut BufWriter::new(staged.as_file_mut()))?;
	filter.close()?;
	staged.persist(path).map_err(|e| e.error)?;
	debug!(path = %path.display(), "wrote output");

	Ok(written)
}
