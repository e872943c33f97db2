use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tweet_chain_core::DEFAULT_MAX_LENGTH_CHARS;

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_ENV: &str = "TWEET_CHAIN_CONFIG";

/// Server settings, read from a JSON file. Missing fields take their default.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Chain loaded at startup (if it exists) and written by `/v1/save`.
	pub chain_path: PathBuf,
	/// Budget used when a request does not give `max_length`.
	pub max_length_chars: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 5000,
			chain_path: PathBuf::from("./data/chain.json"),
			max_length_chars: DEFAULT_MAX_LENGTH_CHARS,
		}
	}
}

impl ServerConfig {
	/// Loads the file named by `TWEET_CHAIN_CONFIG`, or the defaults when unset.
	pub fn get() -> Result<Self> {
		match std::env::var_os(CONFIG_ENV) {
			Some(path) => Self::get_from_path(PathBuf::from(path)),
			None => {
				log::info!("{CONFIG_ENV} not set, using default configuration");
				Ok(Self::default())
			}
		}
	}

	pub fn get_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config {}", path.display()))?;
		let config: Self = serde_json::from_str(&contents)
			.with_context(|| format!("Failed to parse config {}", path.display()))?;
		anyhow::ensure!(config.max_length_chars > 0, "max_length_chars must be greater than 0");
		Ok(config)
	}
}
