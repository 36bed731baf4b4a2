use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use delim_core::DelimError;
use delim_core::DelimResult;
use delim_core::FilterSettings;
use serde::Deserialize;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["delim.toml", ".delim.toml", ".config/delim.toml"];

/// Configuration loaded from a `delim.toml` file.
///
/// ```toml
/// delimiters = ["${*}", "@"]
/// escape = "\\"
/// preserve_escape = false
/// multiline = false
///
/// [properties]
/// name = "world"
/// version = "1.2.0"
/// port = 8080
/// ```
///
/// Property values may be strings, numbers, booleans or dates; they are
/// substituted in their TOML text form.
#[derive(Debug, Default, Deserialize)]
pub struct DelimConfig {
	#[serde(flatten)]
	pub filter: FilterSettings,
	#[serde(default)]
	properties: BTreeMap<String, toml::Value>,
}

impl DelimConfig {
	/// Find the first config file candidate that exists under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn discover(root: &Path) -> DelimResult<Option<(PathBuf, Self)>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let config = Self::load(&config_path)?;
		Ok(Some((config_path, config)))
	}

	/// Load and validate a config file at an explicit path.
	pub fn load(path: &Path) -> DelimResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			DelimError::ConfigRead {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})?;

		Self::parse(&content)
	}

	pub fn parse(content: &str) -> DelimResult<Self> {
		let config: Self =
			toml::from_str(content).map_err(|e| DelimError::ConfigParse(e.to_string()))?;

		if let Some((name, _)) = config
			.properties
			.iter()
			.find(|(_, value)| matches!(value, toml::Value::Array(_) | toml::Value::Table(_)))
		{
			return Err(DelimError::ConfigParse(format!(
				"property `{name}` must be a string, number, boolean or date"
			)));
		}

		Ok(config)
	}

	/// Property values rendered as the text that replaces their
	/// placeholders.
	pub fn properties(&self) -> impl Iterator<Item = (String, String)> + '_ {
		self.properties.iter().map(|(name, value)| {
			let text = match value {
				toml::Value::String(text) => text.clone(),
				other => other.to_string(),
			};
			(name.clone(), text)
		})
	}
}
