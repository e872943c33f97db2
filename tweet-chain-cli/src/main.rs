use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use tweet_chain_core::{
	ChainError, DEFAULT_MAX_LENGTH_CHARS, Format, GenerationInput, LineFileSource, MarkovChain, StartSeed, TextSource,
	default_chain_path, tokenize, train_parallel,
};

/// Train a Markov chain on posts and generate new ones.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Train a chain on text files holding one post per line
	Train {
		/// Input files
		#[arg(required = true)]
		inputs: Vec<PathBuf>,

		/// Output chain file (`.json` or binary). Defaults to the first input with a `.json` extension
		#[arg(short, long)]
		output: Option<PathBuf>,

		/// Existing chain to extend instead of starting empty
		#[arg(long)]
		extend: Option<PathBuf>,

		/// Maximum number of posts read from each input
		#[arg(short, long)]
		limit: Option<usize>,
	},

	/// Generate posts from a trained chain
	Generate {
		/// Chain file
		chain: PathBuf,

		/// First token; a random known token when omitted
		#[arg(short, long)]
		seed: Option<String>,

		/// Maximum length of each post, in characters
		#[arg(short, long, default_value_t = DEFAULT_MAX_LENGTH_CHARS)]
		max_length: usize,

		/// Number of posts to generate
		#[arg(short, long, default_value_t = 1)]
		count: usize,
	},

	/// Print the tokens of a text, one per line
	Tokenize { text: String },

	/// Print the size of a trained chain
	Stats { chain: PathBuf },
}

fn train(inputs: &[PathBuf], output: Option<PathBuf>, extend: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
	let output = match output {
		Some(output) => output,
		None => default_chain_path(&inputs[0], Format::Json)?,
	};

	let mut chain = match extend {
		Some(path) => MarkovChain::load(&path).with_context(|| format!("Failed to load {}", path.display()))?,
		None => MarkovChain::new(),
	};

	for input in inputs {
		let mut texts = LineFileSource::new(input)
			.fetch()
			.with_context(|| format!("Failed to read {}", input.display()))?;
		if let Some(limit) = limit {
			texts.truncate(limit);
		}
		chain.merge(&train_parallel(&texts));
		info!("Trained on {} posts from {}", texts.len(), input.display());
	}

	chain.save(&output).with_context(|| format!("Failed to save {}", output.display()))?;
	let stats = chain.stats();
	println!(
		"{}: {} contexts, {} transitions, {} observations",
		output.display(),
		stats.contexts,
		stats.transitions,
		stats.observations
	);
	Ok(())
}

fn generate(chain_path: &Path, seed: Option<String>, max_length: usize, count: usize) -> Result<()> {
	let chain = MarkovChain::load(chain_path).with_context(|| format!("Failed to load {}", chain_path.display()))?;

	let mut input = GenerationInput::new(match seed {
		Some(seed) => StartSeed::Custom(seed),
		None => StartSeed::Random,
	});
	input.set_max_length_chars(max_length)?;

	for _ in 0..count {
		match chain.generate_from(&input) {
			Ok(generated) => println!("{}", generated.text),
			Err(ChainError::UnknownContext(token)) => {
				anyhow::bail!("\"{token}\" is not present in the chain, try another seed")
			}
			Err(e) => return Err(e.into()),
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match Cli::parse().command {
		Command::Train { inputs, output, extend, limit } => train(&inputs, output, extend, limit),
		Command::Generate { chain, seed, max_length, count } => generate(&chain, seed, max_length, count),
		Command::Tokenize { text } => {
			for token in tokenize(&text) {
				println!("{token}");
			}
			Ok(())
		}
		Command::Stats { chain: chain_path } => {
			let chain = MarkovChain::load(&chain_path)
				.with_context(|| format!("Failed to load {}", chain_path.display()))?;
			let stats = chain.stats();
			println!("contexts: {}", stats.contexts);
			println!("transitions: {}", stats.transitions);
			println!("observations: {}", stats.observations);
			Ok(())
		}
	}
}
