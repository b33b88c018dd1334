use super::distribution::Distribution;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Continuation counts for every observed context.
///
/// A context is the sequence of 0 to `order - 1` tokens immediately
/// preceding a position; the empty context covers every position of
/// every sentence.
///
/// # Responsibilities
/// - Accumulate counts for all context lengths of a sentence in one pass
/// - Look up the distribution of a context without materializing it
/// - Merge with a table built on another shard
///
/// # Invariants
/// - Contexts are never longer than `order - 1`
/// - A context is present only if at least one continuation was observed
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
	/// Mapping from a context to the distribution of the following token
	contexts: HashMap<Vec<String>, Distribution>,
}

impl FrequencyTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records that `next` followed `context` once.
	pub fn observe(&mut self, context: &[String], next: &str) {
		match self.contexts.get_mut(context) {
			Some(distribution) => distribution.add(next),
			None => {
				let mut distribution = Distribution::new();
				distribution.add(next);
				self.contexts.insert(context.to_vec(), distribution);
			}
		}
	}

	/// Adds every (context, next) window of a tokenized sentence.
	///
	/// For each context length `L` in `0..order`, slides a window of
	/// `L + 1` tokens over the sentence: the first `L` tokens are the
	/// context and the last one is the continuation.
	///
	/// # Notes
	/// - Sentences shorter than `L + 1` contribute nothing for that `L`.
	pub fn add_sentence(&mut self, tokens: &[String], order: usize) {
		for length in 0..order {
			if tokens.len() <= length {
				break;
			}
			for window in tokens.windows(length + 1) {
				self.observe(&window[..length], &window[length]);
			}
		}
	}

	/// Returns the distribution of a context, `None` if it was never observed.
	pub fn get(&self, context: &[String]) -> Option<&Distribution> {
		self.contexts.get(context)
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	/// Returns `true` if no context was observed.
	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Iterates over every context and its distribution (arbitrary order).
	pub fn iter(&self) -> impl Iterator<Item = (&[String], &Distribution)> {
		self.contexts.iter().map(|(context, distribution)| (context.as_slice(), distribution))
	}

	/// Merges another table into this one.
	///
	/// # Notes
	/// - Counts for matching contexts and continuations are summed.
	/// - Merging in shard order keeps first-observation order identical
	///   to a sequential build.
	pub fn merge(&mut self, other: &Self) {
		for (context, distribution) in &other.contexts {
			if let Some(existing) = self.contexts.get_mut(context) {
				existing.merge(distribution);
			} else {
				self.contexts.insert(context.clone(), distribution.clone());
			}
		}
	}
}
