use thiserror::Error;

/// Errors reported by the chain, its persistence layer and text sources.
///
/// Every failure is surfaced to the caller as a distinct variant; the crate
/// never substitutes a default value (such as an empty string) for one.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The token was never observed as a predecessor, so it has no distribution.
	#[error("token {0:?} is not present in the chain")]
	UnknownContext(String),

	/// A random start was requested but the chain holds no contexts yet.
	#[error("the chain is empty, no context to start from")]
	EmptyChain,

	/// A generation or training parameter is out of range.
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	/// Serialized chain state was read successfully but is inconsistent.
	#[error("invalid chain state: {0}")]
	Persistence(#[from] PersistenceError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse JSON chain: {0}")]
	Json(#[from] serde_json::Error),

	#[error("failed to decode binary chain: {0}")]
	Binary(#[from] postcard::Error),
}

/// Validation failures raised when loading a persisted chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
	#[error("context {context:?} has no `total`")]
	MissingTotal { context: String },

	#[error("context {context:?} has a negative total ({total})")]
	NegativeTotal { context: String, total: i64 },

	#[error("context {context:?} has a negative count for {token:?} ({count})")]
	NegativeCount { context: String, token: String, count: i64 },

	/// A count or total that is not an integer in the `u64` range (a float,
	/// or a value too large to store).
	#[error("context {context:?} has an invalid number for {field}: {value}")]
	InvalidNumber { context: String, field: String, value: String },

	#[error("context {context:?} has a zero count for {token:?}")]
	ZeroCount { context: String, token: String },

	#[error("context {context:?} has no successor counts")]
	EmptyDistribution { context: String },

	#[error("context {context:?} declares total {total} but its counts sum to {sum}")]
	TotalMismatch { context: String, total: u64, sum: u128 },
}
