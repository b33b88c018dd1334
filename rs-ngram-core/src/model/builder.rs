use std::path::Path;
use std::thread;

use log::{debug, info, warn};

use super::distribution::Distribution;
use super::frequency_table::FrequencyTable;
use super::language_model::LanguageModel;
use super::tokenizer::tokenize;
use crate::error::{LmError, LmResult};
use crate::io::read_lines;

/// Default model order (longest context + 1).
pub const DEFAULT_ORDER: usize = 3;

/// Accumulates corpus statistics into a `LanguageModel`.
///
/// A builder is consumed by any of the `build*` methods, so a builder
/// can only ever produce one model and a model only exists once built.
///
/// # Responsibilities
/// - Tokenize each corpus line as one sentence
/// - Count sentence-initial words
/// - Count continuations for every context length in `0..order`
#[derive(Debug)]
pub struct ModelBuilder {
	order: usize,
	first_words: Distribution,
	table: FrequencyTable,
	sentences: usize,
}

impl ModelBuilder {
	/// Creates an empty builder for models of the given order.
	///
	/// # Errors
	/// Returns `InvalidOrder` if `order` is 0.
	pub fn new(order: usize) -> LmResult<Self> {
		if order == 0 {
			return Err(LmError::InvalidOrder(order));
		}
		Ok(Self {
			order,
			first_words: Distribution::new(),
			table: FrequencyTable::new(),
			sentences: 0,
		})
	}

	/// Order of the model being built.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Adds one corpus line (one sentence).
	///
	/// Lines without any token are skipped entirely.
	fn add_sentence(&mut self, line: &str) {
		let tokens: Vec<String> = tokenize(line).map(str::to_owned).collect();
		let Some(first) = tokens.first() else {
			return;
		};

		self.first_words.add(first);
		self.table.add_sentence(&tokens, self.order);
		self.sentences += 1;
	}

	/// Merges a partial builder of the same order into this one.
	fn merge(&mut self, other: &Self) {
		self.first_words.merge(&other.first_words);
		self.table.merge(&other.table);
		self.sentences += other.sentences;
	}

	/// Builds the model from corpus lines in a single sequential pass.
	pub fn build<I, S>(mut self, lines: I) -> LanguageModel
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for line in lines {
			self.add_sentence(line.as_ref());
		}
		self.finish()
	}

	/// Builds the model sequentially, reporting `(done, total)` after each line.
	pub fn build_with_progress<S, F>(mut self, lines: &[S], mut progress: F) -> LanguageModel
	where
		S: AsRef<str>,
		F: FnMut(usize, usize),
	{
		let total = lines.len();
		for (done, line) in lines.iter().enumerate() {
			self.add_sentence(line.as_ref());
			progress(done + 1, total);
		}
		self.finish()
	}

	/// Splits the corpus into chunks, builds partial models in parallel
	/// and merges them into the final model.
	///
	/// # Behavior
	/// - Splits input lines into contiguous chunks (based on CPU cores * factor).
	/// - Spawns a scoped thread per chunk to build a partial model.
	/// - Merges partial models in chunk order, so the result is identical
	///   to `build` on the same lines, including continuation order.
	///
	/// # Errors
	/// Returns `BuildWorker` if a worker thread panicked.
	pub fn build_parallel<S>(mut self, lines: &[S]) -> LmResult<LanguageModel>
	where
		S: AsRef<str> + Sync,
	{
		if lines.is_empty() {
			return Ok(self.finish());
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks).max(1);
		let order = self.order;

		let partials = thread::scope(|scope| {
			let handles: Vec<_> = lines
				.chunks(chunk_size)
				.map(|chunk| {
					scope.spawn(move || {
						let mut partial = ModelBuilder::new(order)?;
						for line in chunk {
							partial.add_sentence(line.as_ref());
						}
						Ok::<_, LmError>(partial)
					})
				})
				.collect();

			handles
				.into_iter()
				.map(|handle| handle.join().map_err(|_| LmError::BuildWorker)?)
				.collect::<LmResult<Vec<_>>>()
		})?;

		debug!("merging {} partial models", partials.len());
		for partial in &partials {
			self.merge(partial);
		}
		Ok(self.finish())
	}

	/// Reads a corpus file (one sentence per line) and builds the model.
	///
	/// # Errors
	/// Returns `CorpusRead` if the file cannot be read.
	pub fn build_from_file<P: AsRef<Path>>(self, corpus_path: P) -> LmResult<LanguageModel> {
		let lines = read_lines(&corpus_path)?;
		info!("read {} lines from {}", lines.len(), corpus_path.as_ref().display());
		Ok(self.build(&lines))
	}

	fn finish(self) -> LanguageModel {
		debug!(
			"built order-{} model: {} sentences, {} distinct sentence starts, {} contexts",
			self.order,
			self.sentences,
			self.first_words.len(),
			self.table.len()
		);

		let model = LanguageModel::from_parts(self.order, self.first_words, self.table);
		if let Err(e) = model.validate() {
			warn!("model will not generate text: {e}");
		}
		model
	}
}
