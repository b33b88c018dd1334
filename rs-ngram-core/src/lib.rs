//! Word-level n-gram language model library.
//!
//! This crate provides a small statistical text synthesis pipeline:
//! - A whitespace/punctuation tokenizer
//! - A frequency table builder accumulating every context length at once
//! - A compact binary model format
//! - A weighted sampler and a backoff-driven text generator
//!
//! Randomness is always injected by the caller, so generation is
//! reproducible for a fixed seed and a fixed model.

/// Tokenizer, frequency tables, model persistence and generation.
pub mod model;

/// Error type shared by all operations.
pub mod error;

/// I/O utilities (corpus loading, model files, path helpers).
///
/// Corpus loading and the output path helper are exposed publicly;
/// model file access goes through `LanguageModel`.
pub mod io;

pub use error::{LmError, LmResult};
pub use model::builder::ModelBuilder;
pub use model::generation_input::GenerationInput;
pub use model::generator::TextGenerator;
pub use model::language_model::LanguageModel;
