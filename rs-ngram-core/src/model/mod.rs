//! Top-level module for the n-gram language model.
//!
//! Components, leaves first:
//! - Tokenization of corpus lines (`tokenizer`)
//! - Ordered count distributions and weighted sampling (`distribution`)
//! - Context to continuation counts for every context length (`frequency_table`)
//! - One-shot model construction (`builder`)
//! - The immutable model and its binary format (`language_model`)
//! - Generation parameters (`generation_input`)
//! - The stateful text walk and paragraph formatting (`generator`)

/// Splits a corpus line into word and punctuation tokens.
pub mod tokenizer;

/// Ordered continuation counts with a cached total.
///
/// Holds the weighted sampler used by generation.
pub mod distribution;

/// Mapping from a context (0 to `order - 1` tokens) to its continuation distribution.
pub mod frequency_table;

/// Builds a `LanguageModel` from a corpus, sequentially or sharded across threads.
pub mod builder;

/// The built model: order, sentence-start distribution and frequency table.
///
/// Supports binary save/load and static validation.
pub mod language_model;

/// Validated parameters for a single generation run.
pub mod generation_input;

/// Random walk over a model producing paragraphs of text.
pub mod generator;
