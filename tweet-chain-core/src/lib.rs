//! First-order Markov chain text generation for short posts.
//!
//! This crate provides:
//! - A regex tokenizer for tweets (emoticons, mentions, hashtags, URLs, ...)
//! - A Markov chain trained incrementally from token sequences
//! - Weighted random generation bounded by a character budget
//! - JSON and binary persistence with validation on load
//!
//! File helpers are kept internal.

/// Tweet tokenizer.
pub mod tokenizer;

/// Chain, distributions, generation, training and persistence.
pub mod model;

/// Sources of raw texts to train on.
pub mod source;

/// Error types shared by the whole crate.
pub mod error;

/// I/O utilities (line reading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{ChainError, PersistenceError};
pub use model::distribution::Distribution;
pub use model::generation_input::{GenerationInput, StartSeed, DEFAULT_MAX_LENGTH_CHARS};
pub use model::markov_chain::{ChainStats, END_OF_SEQUENCE, Generated, MarkovChain, StopReason};
pub use model::persistence::{Format, default_chain_path};
pub use model::trainer::train_parallel;
pub use source::{LineFileSource, TextSource};
pub use tokenizer::tokenize;
