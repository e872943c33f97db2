use std::collections::HashMap;

use log::debug;
use rand::Rng;
use rand::prelude::IteratorRandom;
use serde::Serialize;

use super::distribution::Distribution;
use crate::error::ChainError;
use crate::tokenizer::tokenize;

/// Reserved token recording that a sequence ended after its context.
///
/// It starts with a control character: every multi-character token the
/// tokenizer emits starts with a printable one, so no real token can equal it.
pub const END_OF_SEQUENCE: &str = "\u{3}END_OF_TWEET";

/// First-order Markov chain over tokens.
///
/// Maps each context token to the [`Distribution`] of tokens observed right
/// after it. Serializes as `{ context: { counts: {..}, total: n } }`;
/// deserializing checks every distribution (see `persistence`).
///
/// # Invariants
/// - A context is present iff it was observed as a predecessor at least once
/// - Every stored distribution is non-empty
/// - The chain only grows: there is no removal
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct MarkovChain {
	contexts: HashMap<String, Distribution>,
}

/// Why a generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
	/// The end-of-sequence marker was drawn.
	EndOfSequence,
	/// Appending another token would have exceeded the character budget,
	/// or the budget was reached exactly.
	LengthLimit,
}

/// Text produced by [`MarkovChain::generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
	pub text: String,
	pub stop: StopReason,
}

/// Size summary of a chain.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainStats {
	/// Distinct context tokens.
	pub contexts: usize,
	/// Distinct (context, successor) pairs.
	pub transitions: usize,
	/// Sum of every distribution total.
	pub observations: u64,
}

impl MarkovChain {
	/// Creates an empty chain.
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn from_contexts(contexts: HashMap<String, Distribution>) -> Self {
		Self { contexts }
	}

	/// Trains the chain on one token sequence.
	///
	/// Every adjacent pair `(a, b)` adds one observation of `b` after `a`,
	/// and the last token gets one observation of [`END_OF_SEQUENCE`].
	///
	/// # Notes
	/// - Sequences shorter than 2 tokens record nothing, not even the
	///   end-of-sequence marker.
	pub fn train<S: AsRef<str>>(&mut self, tokens: &[S]) {
		if tokens.len() < 2 {
			return;
		}

		for pair in tokens.windows(2) {
			self.observe(pair[0].as_ref(), pair[1].as_ref());
		}
		if let Some(last) = tokens.last() {
			self.observe(last.as_ref(), END_OF_SEQUENCE);
		}
	}

	/// Tokenizes a raw post and trains on the result.
	pub fn train_text(&mut self, text: &str) {
		self.train(&tokenize(text));
	}

	/// Trains on a stream of raw posts.
	///
	/// `limit` caps how many posts are consumed (`None` for all of them).
	/// Returns the number of posts consumed.
	pub fn train_texts<I, S>(&mut self, texts: I, limit: Option<usize>) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut consumed = 0;
		for text in texts.into_iter().take(limit.unwrap_or(usize::MAX)) {
			self.train_text(text.as_ref());
			consumed += 1;
		}
		debug!("Trained on {consumed} texts, chain now has {} contexts", self.contexts.len());
		consumed
	}

	/// Records one observation of `next` after `context`.
	fn observe(&mut self, context: &str, next: &str) {
		match self.contexts.get_mut(context) {
			Some(distribution) => distribution.update(next),
			None => {
				let mut distribution = Distribution::new();
				distribution.update(next);
				self.contexts.insert(context.to_owned(), distribution);
			}
		}
	}

	/// Draws the token following `token`.
	///
	/// # Errors
	/// Returns [`ChainError::UnknownContext`] if `token` was never observed
	/// as a predecessor.
	pub fn generate_next(&self, token: &str) -> Result<&str, ChainError> {
		self.generate_next_with(token, &mut rand::rng())
	}

	/// Same as [`generate_next`](Self::generate_next) with a caller-provided generator.
	pub fn generate_next_with<R: Rng>(&self, token: &str, rng: &mut R) -> Result<&str, ChainError> {
		self.contexts
			.get(token)
			.map(|distribution| distribution.pick_with(rng))
			.ok_or_else(|| ChainError::UnknownContext(token.to_owned()))
	}

	/// Generates a text starting with `seed`, at most `max_length_chars`
	/// characters long.
	///
	/// Each step draws a successor of the last token and appends it after a
	/// single space. Generation stops on [`END_OF_SEQUENCE`] or when the
	/// next token would not fit in the budget.
	///
	/// # Errors
	/// - [`ChainError::UnknownContext`] as soon as the current token has no
	///   distribution; no partial text is returned in that case
	/// - [`ChainError::InvalidParameter`] if a known `seed` alone is longer
	///   than `max_length_chars`
	pub fn generate(&self, seed: &str, max_length_chars: usize) -> Result<Generated, ChainError> {
		self.generate_with(seed, max_length_chars, &mut rand::rng())
	}

	/// Same as [`generate`](Self::generate) with a caller-provided generator.
	pub fn generate_with<R: Rng>(&self, seed: &str, max_length_chars: usize, rng: &mut R) -> Result<Generated, ChainError> {
		if !self.contains(seed) {
			return Err(ChainError::UnknownContext(seed.to_owned()));
		}
		let mut length = seed.chars().count();
		if length > max_length_chars {
			return Err(ChainError::InvalidParameter(format!(
				"seed is {length} characters long, over the {max_length_chars} character limit"
			)));
		}

		let mut text = seed.to_owned();
		let mut current = seed;

		loop {
			let next = self.generate_next_with(current, rng)?;
			if next == END_OF_SEQUENCE {
				return Ok(Generated { text, stop: StopReason::EndOfSequence });
			}

			// +1 for the separating space
			let appended = length + 1 + next.chars().count();
			if appended > max_length_chars {
				return Ok(Generated { text, stop: StopReason::LengthLimit });
			}

			text.push(' ');
			text.push_str(next);
			length = appended;
			if length == max_length_chars {
				return Ok(Generated { text, stop: StopReason::LengthLimit });
			}
			current = next;
		}
	}

	/// Returns a random context token, useful to start a generation.
	///
	/// Returns `None` if the chain is empty.
	pub fn random_context(&self) -> Option<&str> {
		self.random_context_with(&mut rand::rng())
	}

	/// Same as [`random_context`](Self::random_context) with a caller-provided generator.
	pub fn random_context_with<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		self.contexts.keys().choose(rng).map(String::as_str)
	}

	/// Merges another chain into this one, summing every count.
	///
	/// Used to combine partial chains trained in parallel.
	pub fn merge(&mut self, other: &Self) {
		for (context, distribution) in &other.contexts {
			if let Some(existing) = self.contexts.get_mut(context) {
				existing.merge(distribution);
			} else {
				self.contexts.insert(context.clone(), distribution.clone());
			}
		}
	}

	/// Distribution of successors of `token`, if it was ever a predecessor.
	pub fn distribution(&self, token: &str) -> Option<&Distribution> {
		self.contexts.get(token)
	}

	pub fn contains(&self, token: &str) -> bool {
		self.contexts.contains_key(token)
	}

	/// Number of context tokens.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Iterates over `(context, distribution)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Distribution)> {
		self.contexts.iter().map(|(context, distribution)| (context.as_str(), distribution))
	}

	pub fn stats(&self) -> ChainStats {
		self.contexts.values().fold(
			ChainStats { contexts: self.contexts.len(), ..ChainStats::default() },
			|mut stats, distribution| {
				stats.transitions += distribution.len();
				stats.observations += distribution.total();
				stats
			},
		)
	}
}
