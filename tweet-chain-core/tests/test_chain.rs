use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tweet_chain_core::{
	ChainError, END_OF_SEQUENCE, Format, GenerationInput, LineFileSource, MarkovChain, StartSeed, StopReason, tokenize,
	train_parallel,
};

const POSTS: [&str; 6] = [
	"Hello @world #test :) http://example.com 42.5",
	"Hello there, how are you today?",
	"I can't believe it's already Friday :D",
	"Check out https://rust-lang.org #rustlang",
	"Friday again?! Hello weekend",
	"are you coming to the party @world",
];

fn random_sequence(rng: &mut StdRng) -> Vec<String> {
	let vocabulary = ["a", "b", "c", "d", "e", "#x", "@y", ":)"];
	let len = rng.random_range(0..12);
	(0..len)
		.map(|_| vocabulary[rng.random_range(0..vocabulary.len())].to_owned())
		.collect()
}

fn assert_totals_consistent(chain: &MarkovChain) {
	for (context, distribution) in chain.iter() {
		let sum: u64 = distribution.iter().map(|(_, count)| count).sum();
		assert_eq!(distribution.total(), sum, "context {context:?}");
		assert!(distribution.total() > 0, "context {context:?} is empty");
	}
}

fn temp_path(name: &str) -> std::path::PathBuf {
	std::env::temp_dir().join(format!("tweet-chain-{}-{name}", std::process::id()))
}

#[test]
fn every_pair_is_recorded() {
	let mut rng = StdRng::seed_from_u64(11);
	let mut chain = MarkovChain::new();

	for _ in 0..200 {
		let tokens = random_sequence(&mut rng);
		chain.train(&tokens);

		if tokens.len() >= 2 {
			for pair in tokens.windows(2) {
				assert!(chain.distribution(&pair[0]).unwrap().count(&pair[1]) >= 1);
			}
			let last = tokens.last().unwrap();
			assert!(chain.distribution(last).unwrap().count(END_OF_SEQUENCE) >= 1);
		}
		assert_totals_consistent(&chain);
	}
}

#[test]
fn generation_terminates_within_budget() {
	let mut chain = MarkovChain::new();
	chain.train_texts(POSTS, None);
	let mut rng = StdRng::seed_from_u64(5);

	for _ in 0..500 {
		let generated = chain.generate_with("Hello", 140, &mut rng).unwrap();
		assert!(generated.text.chars().count() <= 140);
		assert!(generated.text.starts_with("Hello"));
		assert!(!generated.text.contains(END_OF_SEQUENCE));
	}
}

#[test]
fn generated_tokens_follow_observed_transitions() {
	let mut chain = MarkovChain::new();
	chain.train_texts(POSTS, None);
	let mut rng = StdRng::seed_from_u64(9);

	for _ in 0..200 {
		let generated = chain.generate_with("Hello", 280, &mut rng).unwrap();
		// Only tokens without inner spaces are produced by these posts
		let tokens: Vec<&str> = generated.text.split(' ').collect();
		for pair in tokens.windows(2) {
			assert!(chain.distribution(pair[0]).unwrap().count(pair[1]) >= 1, "{pair:?}");
		}
		if generated.stop == StopReason::EndOfSequence {
			let last = tokens.last().unwrap();
			assert!(chain.distribution(last).unwrap().count(END_OF_SEQUENCE) >= 1);
		}
	}
}

#[test]
fn unseen_seed_fails() {
	let mut chain = MarkovChain::new();
	chain.train_texts(POSTS, None);

	assert!(matches!(
		chain.generate("xyz_unseen_token", 140),
		Err(ChainError::UnknownContext(token)) if token == "xyz_unseen_token"
	));
}

#[test]
fn save_and_load_both_formats() {
	let chain = train_parallel(&POSTS);
	assert_totals_consistent(&chain);

	for format in [Format::Json, Format::Binary] {
		let path = temp_path(&format!("round-trip.{}", format.extension()));
		chain.save(&path).unwrap();
		let loaded = MarkovChain::load(&path);
		std::fs::remove_file(&path).unwrap();

		let loaded = loaded.unwrap();
		assert_eq!(loaded, chain);
		assert_totals_consistent(&loaded);

		let input = GenerationInput::new(StartSeed::Custom("Hello".to_owned()));
		assert!(loaded.generate_from(&input).is_ok());
	}
}

#[test]
fn malformed_file_is_rejected() {
	let path = temp_path("malformed.json");
	std::fs::write(&path, r#"{"Hello": {"counts": {"there": 2}, "total": 5}}"#).unwrap();
	let loaded = MarkovChain::load(&path);
	std::fs::remove_file(&path).unwrap();

	assert!(matches!(loaded, Err(ChainError::Persistence(_))));
}

#[test]
fn train_from_file_source() {
	let path = temp_path("posts.txt");
	std::fs::write(&path, POSTS.join("\n")).unwrap();
	let mut chain = MarkovChain::new();
	let consumed = chain.train_from_source(&mut LineFileSource::new(&path), None);
	std::fs::remove_file(&path).unwrap();

	assert_eq!(consumed.unwrap(), POSTS.len());
	let mut expected = MarkovChain::new();
	for post in POSTS {
		expected.train(&tokenize(post));
	}
	assert_eq!(chain, expected);
}
