use rand::Rng;

use super::markov_chain::{Generated, MarkovChain};
use crate::error::ChainError;

/// Character budget of a generated post.
pub const DEFAULT_MAX_LENGTH_CHARS: usize = 140;

/// Strategy used to select the first token of a generated post.
///
/// # Variants
/// - `Random`: start from a random context token of the chain.
/// - `Custom(String)`: start from the provided token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartSeed {
	Random,
	Custom(String),
}

/// Generation parameters.
///
/// # Invariants
/// - `max_length_chars` is strictly positive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationInput {
	/// How the first token is chosen.
	pub start_seed: StartSeed,

	/// Maximum length of the output, in characters.
	max_length_chars: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self { start_seed: StartSeed::Random, max_length_chars: DEFAULT_MAX_LENGTH_CHARS }
	}
}

impl GenerationInput {
	/// Creates an input with the default character budget.
	pub fn new(start_seed: StartSeed) -> Self {
		Self { start_seed, ..Self::default() }
	}

	/// Returns the current character budget.
	pub fn max_length_chars(&self) -> usize {
		self.max_length_chars
	}

	/// Sets the character budget.
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_max_length_chars(&mut self, max_length_chars: usize) -> Result<(), ChainError> {
		if max_length_chars == 0 {
			return Err(ChainError::InvalidParameter("max_length_chars must be greater than 0".to_owned()));
		}
		self.max_length_chars = max_length_chars;
		Ok(())
	}
}

impl MarkovChain {
	/// Generates a post according to `input`.
	///
	/// # Errors
	/// - [`ChainError::EmptyChain`] if a random start is requested on an empty chain
	/// - [`ChainError::UnknownContext`] if the custom seed (or a later token) is unknown
	pub fn generate_from(&self, input: &GenerationInput) -> Result<Generated, ChainError> {
		self.generate_from_with(input, &mut rand::rng())
	}

	/// Same as [`generate_from`](Self::generate_from) with a caller-provided generator.
	pub fn generate_from_with<R: Rng>(&self, input: &GenerationInput, rng: &mut R) -> Result<Generated, ChainError> {
		let seed = match &input.start_seed {
			StartSeed::Random => self.random_context_with(rng).ok_or(ChainError::EmptyChain)?,
			StartSeed::Custom(seed) => seed.as_str(),
		};
		self.generate_with(seed, input.max_length_chars, rng)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_budget() {
		let input = GenerationInput::default();
		assert_eq!(input.max_length_chars(), 140);
		assert_eq!(input.start_seed, StartSeed::Random);
	}

	#[test]
	fn zero_budget_is_rejected() {
		let mut input = GenerationInput::new(StartSeed::Custom("hi".to_owned()));
		assert!(matches!(input.set_max_length_chars(0), Err(ChainError::InvalidParameter(_))));
		assert_eq!(input.max_length_chars(), 140);

		input.set_max_length_chars(280).unwrap();
		assert_eq!(input.max_length_chars(), 280);
	}

	#[test]
	fn random_start_on_empty_chain() {
		let chain = MarkovChain::new();
		assert!(matches!(chain.generate_from(&GenerationInput::default()), Err(ChainError::EmptyChain)));
	}

	#[test]
	fn custom_start() {
		let mut chain = MarkovChain::new();
		chain.train_text("good morning everyone");

		let input = GenerationInput::new(StartSeed::Custom("good".to_owned()));
		assert_eq!(chain.generate_from(&input).unwrap().text, "good morning everyone");

		let input = GenerationInput::new(StartSeed::Custom("evening".to_owned()));
		assert!(matches!(chain.generate_from(&input), Err(ChainError::UnknownContext(_))));
	}

	#[test]
	fn random_start_uses_a_known_token() {
		let mut chain = MarkovChain::new();
		chain.train_text("one two three four");

		let generated = chain.generate_from(&GenerationInput::default()).unwrap();
		let first = generated.text.split(' ').next().unwrap();
		assert!(chain.contains(first));
	}
}
