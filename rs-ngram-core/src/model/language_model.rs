use std::collections::HashSet;
use std::path::Path;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distribution::Distribution;
use super::frequency_table::FrequencyTable;
use super::generation_input::GenerationInput;
use super::generator::TextGenerator;
use super::tokenizer::is_sentence_terminator;
use crate::error::{LmError, LmResult};
use crate::io::{read_bytes, write_bytes};

/// Tag opening every encoded model.
pub const MAGIC: [u8; 4] = *b"NGLM";

/// Current binary format version.
///
/// Models written with another version are rejected on load.
pub const FORMAT_VERSION: u16 = 1;

/// A built n-gram language model.
///
/// Holds:
/// - `order`: longest context length + 1
/// - `first_words`: distribution of sentence-initial words
/// - `table`: continuation counts for every context length in `0..order`
///
/// A model is produced once by `ModelBuilder` or `load`, and is read-only
/// afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LanguageModel {
	order: usize,
	first_words: Distribution,
	table: FrequencyTable,
}

impl LanguageModel {
	pub(crate) fn from_parts(order: usize, first_words: Distribution, table: FrequencyTable) -> Self {
		Self { order, first_words, table }
	}

	/// Longest context length + 1.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Distribution of sentence-initial words.
	pub fn first_words(&self) -> &Distribution {
		&self.first_words
	}

	/// Context to continuation counts.
	pub fn table(&self) -> &FrequencyTable {
		&self.table
	}

	/// Encodes the model.
	///
	/// Layout: `MAGIC`, `FORMAT_VERSION`, then order, first-word
	/// distribution and frequency table as sequential postcard fields.
	pub fn save(&self) -> LmResult<Vec<u8>> {
		Ok(postcard::to_stdvec(&(MAGIC, FORMAT_VERSION, self))?)
	}

	/// Decodes a model written by `save`.
	///
	/// # Errors
	/// - `UnknownFormat` if the magic tag is missing
	/// - `UnsupportedVersion` for any other format version
	/// - `ModelCodec` if the payload cannot be decoded, or a distribution
	///   holds an empty token, a zero count or a duplicate
	/// - `TrailingBytes` if data remains after the model
	/// - `CorruptModel` if the decoded model breaks an invariant
	pub fn load(bytes: &[u8]) -> LmResult<Self> {
		let (magic, rest): ([u8; 4], &[u8]) =
			postcard::take_from_bytes(bytes).map_err(|_| LmError::UnknownFormat)?;
		if magic != MAGIC {
			return Err(LmError::UnknownFormat);
		}

		let (version, rest): (u16, &[u8]) = postcard::take_from_bytes(rest)?;
		if version != FORMAT_VERSION {
			return Err(LmError::UnsupportedVersion(version));
		}

		let (model, rest): (Self, &[u8]) = postcard::take_from_bytes(rest)?;
		if !rest.is_empty() {
			return Err(LmError::TrailingBytes(rest.len()));
		}
		if model.order == 0 {
			return Err(LmError::CorruptModel("order is 0"));
		}
		if model.table.iter().any(|(context, _)| context.len() >= model.order) {
			return Err(LmError::CorruptModel("context longer than order allows"));
		}
		if model.table.iter().any(|(context, _)| context.iter().any(String::is_empty)) {
			return Err(LmError::CorruptModel("empty token in context"));
		}

		Ok(model)
	}

	/// Encodes the model and writes it to `path`.
	pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LmResult<()> {
		let bytes = self.save()?;
		write_bytes(&path, &bytes)?;
		info!("saved model ({} bytes) to {}", bytes.len(), path.as_ref().display());
		Ok(())
	}

	/// Reads and decodes a model from `path`.
	pub fn load_from_file<P: AsRef<Path>>(path: P) -> LmResult<Self> {
		let bytes = read_bytes(&path)?;
		let model = Self::load(&bytes)?;
		info!(
			"loaded order-{} model with {} contexts from {}",
			model.order,
			model.table.len(),
			path.as_ref().display()
		);
		Ok(model)
	}

	/// Checks that generation can reach the end of a sentence.
	///
	/// Walks the follower graph (length-1 contexts) from every
	/// sentence-initial word, looking for `.`, `?` or `!`. For order 1
	/// only sentence-initial words are ever drawn.
	///
	/// Reachability is over-approximated: longer contexts only allow a
	/// subset of these followers.
	///
	/// # Errors
	/// - `EmptyModel` if no sentence start was observed
	/// - `NoReachableTerminator` if no terminator is reachable
	pub fn validate(&self) -> LmResult<()> {
		if self.first_words.total() == 0 {
			return Err(LmError::EmptyModel);
		}

		let mut seen: HashSet<&str> = HashSet::new();
		let mut pending: Vec<&str> = self.first_words.iter().map(|(token, _)| token).collect();
		while let Some(token) = pending.pop() {
			if is_sentence_terminator(token) {
				return Ok(());
			}
			if self.order < 2 || !seen.insert(token) {
				continue;
			}
			if let Some(followers) = self.table.get(&[token.to_owned()]) {
				pending.extend(
					followers
						.iter()
						.map(|(next, _)| next)
						.filter(|next| !seen.contains(next)),
				);
			}
		}

		Err(LmError::NoReachableTerminator)
	}

	/// Generates paragraphs of at least `target_size` tokens.
	///
	/// Shortcut for `TextGenerator::new(self)?.generate(..)` with the
	/// default paragraph settings.
	pub fn generate<R: Rng + ?Sized>(&self, target_size: usize, rng: &mut R) -> LmResult<String> {
		let input = GenerationInput::new(target_size)?;
		TextGenerator::new(self)?.generate(&input, rng)
	}
}
