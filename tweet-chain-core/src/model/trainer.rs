use std::sync::mpsc;
use std::thread;

use log::debug;

use super::markov_chain::MarkovChain;
use crate::error::ChainError;
use crate::source::TextSource;

/// Number of chunks per CPU when training in parallel.
const CHUNKS_PER_CPU: usize = 8;

/// Trains a new chain on `texts` using every available core.
///
/// # Behavior
/// - Splits texts into chunks (CPU cores * factor).
/// - Spawns scoped threads that each train a partial chain on one chunk.
/// - Merges all partial chains as they arrive.
///
/// # Notes
/// - Counts are sums, so the result equals sequential training on the same
///   texts regardless of merge order.
pub fn train_parallel<S: AsRef<str> + Sync>(texts: &[S]) -> MarkovChain {
	if texts.is_empty() {
		return MarkovChain::new();
	}

	let chunks = num_cpus::get() * CHUNKS_PER_CPU;
	let chunk_size = texts.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for chunk in texts.chunks(chunk_size) {
			let tx = tx.clone();
			scope.spawn(move || {
				let mut partial = MarkovChain::new();
				partial.train_texts(chunk, None);
				// The receiver outlives the scope, send cannot fail
				let _ = tx.send(partial);
			});
		}
	});
	drop(tx);

	let mut chain = MarkovChain::new();
	for partial in rx.iter() {
		chain.merge(&partial);
	}
	debug!("Parallel training on {} texts produced {} contexts", texts.len(), chain.len());
	chain
}

impl MarkovChain {
	/// Fetches texts from `source` and trains on at most `limit` of them.
	///
	/// Returns the number of texts consumed.
	pub fn train_from_source<T: TextSource + ?Sized>(&mut self, source: &mut T, limit: Option<usize>) -> Result<usize, ChainError> {
		let texts = source.fetch()?;
		Ok(self.train_texts(texts, limit))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn corpus() -> Vec<String> {
		(0..500)
			.map(|i| format!("post number {i} says hello @user{} #tag{} :)", i % 7, i % 3))
			.collect()
	}

	#[test]
	fn parallel_equals_sequential() {
		let texts = corpus();

		let mut sequential = MarkovChain::new();
		sequential.train_texts(&texts, None);

		assert_eq!(train_parallel(&texts), sequential);
	}

	#[test]
	fn parallel_on_nothing() {
		let texts: Vec<String> = Vec::new();
		assert!(train_parallel(&texts).is_empty());
	}

	#[test]
	fn train_from_source_applies_limit() {
		let mut source = vec!["a b".to_owned(), "c d".to_owned(), "e f".to_owned()];
		let mut chain = MarkovChain::new();

		assert_eq!(chain.train_from_source(&mut source, Some(1)).unwrap(), 1);
		assert!(chain.contains("a"));
		assert!(!chain.contains("c"));
	}
}
