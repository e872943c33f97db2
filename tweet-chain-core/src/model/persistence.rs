use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Deserializer};
use serde_json::Number;

use super::distribution::{Distribution, StoredDistribution};
use super::markov_chain::MarkovChain;
use crate::error::{ChainError, PersistenceError};
use crate::io::build_output_path;

/// On-disk representation of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	/// Human-readable `{ context: { counts, total } }` document.
	Json,
	/// Compact `postcard` snapshot.
	Binary,
}

impl Format {
	/// Picks the format from a file extension: `.json` is JSON, anything
	/// else is the binary snapshot.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
			_ => Format::Binary,
		}
	}

	pub fn extension(&self) -> &'static str {
		match self {
			Format::Json => "json",
			Format::Binary => "bin",
		}
	}
}

/// Builds the default chain path for a training file.
///
/// Example: `data/posts.txt` + `Format::Json` → `data/posts.json`
pub fn default_chain_path<P: AsRef<Path>>(input_path: P, format: Format) -> Result<PathBuf, ChainError> {
	Ok(build_output_path(input_path, format.extension())?)
}

/// Distribution as read from JSON, before validation.
///
/// Numbers are kept as written and `total` is optional so that malformed
/// files are reported as validation failures instead of generic parse errors.
#[derive(Deserialize)]
struct RawDistribution {
	counts: HashMap<String, Number>,
	total: Option<Number>,
}

/// Reads a JSON number as a count.
///
/// `negative` builds the error for a negative integer; anything else outside
/// the `u64` range becomes [`PersistenceError::InvalidNumber`].
fn to_count(
	context: &str,
	field: &str,
	number: &Number,
	negative: impl FnOnce(i64) -> PersistenceError,
) -> Result<u64, PersistenceError> {
	if let Some(value) = number.as_u64() {
		return Ok(value);
	}
	match number.as_i64() {
		Some(value) => Err(negative(value)),
		None => Err(PersistenceError::InvalidNumber {
			context: context.to_owned(),
			field: field.to_owned(),
			value: number.to_string(),
		}),
	}
}

impl RawDistribution {
	fn validate(self, context: &str) -> Result<Distribution, PersistenceError> {
		let total = match &self.total {
			None => return Err(PersistenceError::MissingTotal { context: context.to_owned() }),
			Some(total) => to_count(context, "total", total, |total| PersistenceError::NegativeTotal {
				context: context.to_owned(),
				total,
			})?,
		};

		let mut counts = HashMap::with_capacity(self.counts.len());
		for (token, count) in self.counts {
			let count = to_count(context, &format!("count of {token:?}"), &count, |count| {
				PersistenceError::NegativeCount { context: context.to_owned(), token: token.clone(), count }
			})?;
			counts.insert(token, count);
		}

		Distribution::from_parts(context, counts, total)
	}
}

/// Validates every distribution, naming the context of the first bad one.
fn from_stored(stored: HashMap<String, StoredDistribution>) -> Result<MarkovChain, PersistenceError> {
	let mut contexts = HashMap::with_capacity(stored.len());
	for (context, distribution) in stored {
		let distribution = Distribution::from_parts(&context, distribution.counts, distribution.total)?;
		contexts.insert(context, distribution);
	}
	Ok(MarkovChain::from_contexts(contexts))
}

/// Any serde format goes through the same checks as [`MarkovChain::load`].
impl<'de> Deserialize<'de> for MarkovChain {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let stored = HashMap::<String, StoredDistribution>::deserialize(deserializer)?;
		from_stored(stored).map_err(serde::de::Error::custom)
	}
}

impl MarkovChain {
	/// Serializes the chain to its JSON document.
	pub fn to_json(&self) -> Result<String, ChainError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Parses and validates a JSON document.
	///
	/// # Errors
	/// - [`ChainError::Json`] if the document is not a map of `{ counts, total }` objects
	/// - [`ChainError::Persistence`] if any distribution is inconsistent
	pub fn from_json(json: &str) -> Result<Self, ChainError> {
		let raw: HashMap<String, RawDistribution> = serde_json::from_str(json)?;

		let mut contexts = HashMap::with_capacity(raw.len());
		for (context, distribution) in raw {
			let distribution = distribution.validate(&context)?;
			contexts.insert(context, distribution);
		}
		Ok(MarkovChain::from_contexts(contexts))
	}

	/// Serializes the chain to a compact binary snapshot.
	pub fn to_bytes(&self) -> Result<Vec<u8>, ChainError> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes a binary snapshot, then checks every distribution.
	///
	/// # Errors
	/// - [`ChainError::Binary`] if the bytes are not a snapshot
	/// - [`ChainError::Persistence`] if any distribution is inconsistent
	pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
		let stored: HashMap<String, StoredDistribution> = postcard::from_bytes(bytes)?;
		Ok(from_stored(stored)?)
	}

	/// Writes the chain to `path`, in the format given by its extension.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ChainError> {
		let path = path.as_ref();
		match Format::from_path(path) {
			Format::Json => std::fs::write(path, self.to_json()?)?,
			Format::Binary => std::fs::write(path, self.to_bytes()?)?,
		}
		info!("Saved chain with {} contexts to {}", self.len(), path.display());
		Ok(())
	}

	/// Reads a chain from `path`, in the format given by its extension.
	///
	/// The loaded chain is validated; a malformed file is an error, never a
	/// partially loaded chain.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ChainError> {
		let path = path.as_ref();
		let chain = match Format::from_path(path) {
			Format::Json => Self::from_json(&std::fs::read_to_string(path)?)?,
			Format::Binary => Self::from_bytes(&std::fs::read(path)?)?,
		};
		info!("Loaded chain with {} contexts from {}", chain.len(), path.display());
		Ok(chain)
	}
}
