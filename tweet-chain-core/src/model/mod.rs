//! Markov chain model over tweet tokens.
//!
//! - Successor frequency tables (`Distribution`)
//! - The first-order chain itself (`MarkovChain`)
//! - Generation parameters (`GenerationInput`)
//! - Parallel training and JSON / binary persistence

/// Weighted multiset of successor tokens for one context.
///
/// Supports O(1) updates and weighted random draws.
pub mod distribution;

/// Context token → distribution mapping, training and generation.
pub mod markov_chain;

/// Seed strategy and character budget used by `MarkovChain::generate_from`.
pub mod generation_input;

/// Multithreaded training and training from a `TextSource`.
pub mod trainer;

/// Saving and loading chains, with validation on load.
pub mod persistence;
