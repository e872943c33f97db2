use std::collections::HashMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Frequency table of the tokens observed right after one context token.
///
/// Conceptually, this is the set of outgoing edges of a node in the Markov
/// chain, each edge weighted by its number of observations.
///
/// ## Invariants
/// - `total` always equals the sum of `counts`
/// - Each stored count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "StoredDistribution")]
pub struct Distribution {
	/// Observed successor tokens and how many times each was seen.
	/// Example: { "world" => 42, "there" => 3 }
	counts: HashMap<String, u64>,
	/// Running sum of `counts`, kept in sync by `update` and `merge`.
	total: u64,
}

/// Distribution as written by `Serialize`, before its invariants are checked.
#[derive(Deserialize)]
pub(crate) struct StoredDistribution {
	pub(crate) counts: HashMap<String, u64>,
	pub(crate) total: u64,
}

impl TryFrom<StoredDistribution> for Distribution {
	type Error = PersistenceError;

	/// Standalone distributions have no context name; chains go through
	/// `from_parts` so errors name the offending context.
	fn try_from(stored: StoredDistribution) -> Result<Self, Self::Error> {
		Self::from_parts("", stored.counts, stored.total)
	}
}

impl Distribution {
	/// Creates an empty distribution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuilds a distribution from persisted parts, checking its invariants.
	///
	/// # Errors
	/// Returns a [`PersistenceError`] naming `context` if the counts are empty,
	/// contain a zero, or do not add up to `total`.
	pub(crate) fn from_parts(context: &str, counts: HashMap<String, u64>, total: u64) -> Result<Self, PersistenceError> {
		if counts.is_empty() {
			return Err(PersistenceError::EmptyDistribution { context: context.to_owned() });
		}
		if let Some((token, _)) = counts.iter().find(|(_, count)| **count == 0) {
			return Err(PersistenceError::ZeroCount {
				context: context.to_owned(),
				token: token.clone(),
			});
		}

		// Summed in u128 so a corrupted file cannot overflow the check
		let sum: u128 = counts.values().map(|count| u128::from(*count)).sum();
		if sum != u128::from(total) {
			return Err(PersistenceError::TotalMismatch {
				context: context.to_owned(),
				total,
				sum,
			});
		}
		Ok(Self { counts, total })
	}

	/// Records one more occurrence of `token`.
	///
	/// - If the token already exists, its count is increased.
	/// - Otherwise, it is inserted with a count of 1.
	pub fn update(&mut self, token: &str) {
		match self.counts.get_mut(token) {
			Some(count) => *count += 1,
			None => {
				self.counts.insert(token.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	/// Draws a token with probability proportional to its count, using the
	/// thread-local generator.
	///
	/// # Panics
	/// Panics if the distribution is empty. The chain only stores distributions
	/// that received at least one `update`, so this signals a broken invariant.
	pub fn pick(&self) -> &str {
		self.pick_with(&mut rand::rng())
	}

	/// Same as [`pick`](Self::pick) with a caller-provided generator.
	///
	/// Draws `r` uniformly in `[0, total)` and returns the first token, in
	/// iteration order, whose cumulative count exceeds `r`.
	pub fn pick_with<R: Rng>(&self, rng: &mut R) -> &str {
		assert!(self.total > 0, "pick() called on an empty distribution");

		let draw = rng.random_range(0..self.total);
		let mut cumulative = 0u64;
		for (token, count) in &self.counts {
			cumulative += *count;
			if draw < cumulative {
				return token;
			}
		}

		unreachable!("distribution total {} exceeds the sum of its counts", self.total)
	}

	/// Adds every count of `other` into this distribution.
	pub fn merge(&mut self, other: &Self) {
		for (token, count) in &other.counts {
			*self.counts.entry(token.clone()).or_insert(0) += count;
		}
		self.total += other.total;
	}

	/// Number of times `token` was observed, 0 if never.
	pub fn count(&self, token: &str) -> u64 {
		self.counts.get(token).copied().unwrap_or(0)
	}

	/// Sum of all counts.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct successor tokens.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates over `(token, count)` pairs in storage order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.counts.iter().map(|(token, count)| (token.as_str(), *count))
	}
}
