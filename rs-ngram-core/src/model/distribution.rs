use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{LmError, LmResult};

/// Observed continuations of one context, with their counts.
///
/// Conceptually a node of a Markov chain whose outgoing edges are
/// weighted by how many times they were observed.
///
/// # Responsibilities
/// - Accumulate continuation counts during the build pass
/// - Draw a continuation by weighted random sampling
/// - Merge with a partial distribution built on another shard
///
/// # Invariants
/// - `total` equals the sum of all entry counts at all times
/// - Entries keep the order in which each token was first observed
/// - Each token appears once, with a count >= 1
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Distribution {
	/// Continuations in first-observation order.
	entries: Vec<(String, u64)>,
	/// Position of each token in `entries`.
	index: HashMap<String, usize>,
	/// Normalization denominator, the sum of all counts.
	total: u64,
}

impl Distribution {
	/// Creates an empty distribution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `token`.
	///
	/// - If the token was already observed, its count is increased.
	/// - Otherwise it is appended with an initial count of 1.
	pub fn add(&mut self, token: &str) {
		self.add_count(token, 1);
	}

	fn add_count(&mut self, token: &str, count: u64) {
		match self.index.get(token) {
			Some(&position) => self.entries[position].1 += count,
			None => {
				self.index.insert(token.to_owned(), self.entries.len());
				self.entries.push((token.to_owned(), count));
			}
		}
		self.total += count;
	}

	/// Sum of all counts.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Count recorded for `token`, 0 if never observed.
	pub fn count(&self, token: &str) -> u64 {
		self.index.get(token).map_or(0, |&position| self.entries[position].1)
	}

	/// Number of distinct continuations.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if nothing was observed.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(token, count)` in first-observation order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.entries.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Draws a continuation using weighted random sampling.
	///
	/// A threshold is drawn uniformly in `[0, total)`, then entries are
	/// walked in first-observation order while accumulating counts; the
	/// first entry whose cumulative count reaches the threshold wins.
	///
	/// # Errors
	/// Returns `DegenerateDistribution` if nothing was observed.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> LmResult<&str> {
		if self.total == 0 {
			return Err(LmError::DegenerateDistribution);
		}

		let threshold = rng.random_range(0..self.total);
		// None is unreachable while `total` matches the entries
		self.pick(threshold).ok_or(LmError::DegenerateDistribution)
	}

	/// Walks entries in first-observation order and returns the first one
	/// whose cumulative count is `>= threshold`.
	///
	/// Returns `None` if `threshold` exceeds `total`.
	fn pick(&self, threshold: u64) -> Option<&str> {
		let mut cumulative: u64 = 0;
		for (token, count) in &self.entries {
			cumulative += *count;
			if threshold <= cumulative {
				return Some(token.as_str());
			}
		}
		None
	}

	/// Merges another distribution into this one.
	///
	/// Counts of shared tokens are summed; tokens only present in
	/// `other` are appended in their order of first observation.
	pub fn merge(&mut self, other: &Self) {
		for (token, count) in &other.entries {
			self.add_count(token, *count);
		}
	}

	/// Rebuilds a distribution from encoded entries, recomputing the total.
	fn from_entries(entries: Vec<(String, u64)>) -> Result<Self, String> {
		let mut index = HashMap::with_capacity(entries.len());
		let mut total: u64 = 0;
		for (position, (token, count)) in entries.iter().enumerate() {
			if token.is_empty() {
				return Err("empty token".to_owned());
			}
			if *count == 0 {
				return Err(format!("zero count for token {token:?}"));
			}
			if index.insert(token.clone(), position).is_some() {
				return Err(format!("duplicate token {token:?}"));
			}
			total = total
				.checked_add(*count)
				.ok_or_else(|| "count overflow".to_owned())?;
		}
		Ok(Self { entries, index, total })
	}
}

/// Encoded as a sequence of `(token, count)` in first-observation order.
impl Serialize for Distribution {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
		for entry in &self.entries {
			seq.serialize_element(entry)?;
		}
		seq.end()
	}
}

impl<'de> Deserialize<'de> for Distribution {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct EntriesVisitor;

		impl<'de> Visitor<'de> for EntriesVisitor {
			type Value = Distribution;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a sequence of (token, count) pairs")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
				let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
				while let Some(entry) = seq.next_element::<(String, u64)>()? {
					entries.push(entry);
				}
				Distribution::from_entries(entries).map_err(de::Error::custom)
			}
		}

		deserializer.deserialize_seq(EntriesVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn distribution(tokens: &[&str]) -> Distribution {
		let mut d = Distribution::new();
		for token in tokens {
			d.add(token);
		}
		d
	}

	#[test]
	fn counts_and_total_stay_consistent() {
		let d = distribution(&["a", "b", "a", "c", "a"]);
		assert_eq!(d.total(), 5);
		assert_eq!(d.count("a"), 3);
		assert_eq!(d.count("b"), 1);
		assert_eq!(d.count("z"), 0);
		assert_eq!(d.total(), d.iter().map(|(_, c)| c).sum::<u64>());
	}

	#[test]
	fn keeps_first_observation_order() {
		let d = distribution(&["b", "a", "b", "c"]);
		let order: Vec<&str> = d.iter().map(|(t, _)| t).collect();
		assert_eq!(order, vec!["b", "a", "c"]);
	}

	#[test]
	fn empty_distribution_is_degenerate() {
		let d = Distribution::new();
		let mut rng = StdRng::seed_from_u64(7);
		assert!(matches!(d.sample(&mut rng), Err(LmError::DegenerateDistribution)));
	}

	#[test]
	fn single_outcome_always_drawn() {
		let d = distribution(&["only", "only"]);
		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..50 {
			assert_eq!(d.sample(&mut rng).unwrap(), "only");
		}
	}

	#[test]
	fn samples_follow_weights() {
		let mut d = Distribution::new();
		for _ in 0..90 {
			d.add("common");
		}
		for _ in 0..10 {
			d.add("rare");
		}
		let mut rng = StdRng::seed_from_u64(42);
		let common = (0..10_000)
			.filter(|_| d.sample(&mut rng).unwrap() == "common")
			.count();
		assert!(common > 8_500 && common < 9_500, "common drawn {common} times");
	}

	#[test]
	fn threshold_matches_cumulative_count_inclusively() {
		let d = distribution(&["a", "b"]);
		// thresholds 0 and 1 both reach the first cumulative count
		assert_eq!(d.pick(0), Some("a"));
		assert_eq!(d.pick(1), Some("a"));
		assert_eq!(d.pick(2), Some("b"));
		assert_eq!(d.pick(3), None);
		for seed in 0..50 {
			let mut rng = StdRng::seed_from_u64(seed);
			assert_eq!(d.sample(&mut rng).unwrap(), "a");
		}
	}

	#[test]
	fn walk_follows_first_observation_order() {
		// cumulative counts: c=2, a=3, b=4
		let d = distribution(&["c", "a", "c", "b"]);
		let picks: Vec<&str> = (0..4).filter_map(|threshold| d.pick(threshold)).collect();
		assert_eq!(picks, vec!["c", "c", "c", "a"]);

		let reordered = distribution(&["a", "c", "c", "b"]);
		let picks: Vec<&str> = (0..4).filter_map(|threshold| reordered.pick(threshold)).collect();
		assert_eq!(picks, vec!["a", "a", "c", "c"]);
	}

	#[test]
	fn same_seed_same_draws() {
		let d = distribution(&["x", "y", "z", "y"]);
		let mut a = StdRng::seed_from_u64(9);
		let mut b = StdRng::seed_from_u64(9);
		for _ in 0..100 {
			assert_eq!(d.sample(&mut a).unwrap(), d.sample(&mut b).unwrap());
		}
	}

	#[test]
	fn merge_sums_and_appends() {
		let mut left = distribution(&["a", "b"]);
		let right = distribution(&["c", "a", "a"]);
		left.merge(&right);
		assert_eq!(left, distribution(&["a", "b", "c", "a", "a"]));
		assert_eq!(left.total(), 5);
	}

	#[test]
	fn encoded_entries_keep_order() {
		let d = distribution(&["z", "a", "z", "m"]);
		let bytes = postcard::to_stdvec(&d).unwrap();
		let back: Distribution = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(back, d);
		assert_eq!(back.total(), 4);
	}

	#[test]
	fn duplicate_entries_are_rejected() {
		let raw = vec![("a".to_owned(), 1u64), ("a".to_owned(), 2u64)];
		let bytes = postcard::to_stdvec(&raw).unwrap();
		assert!(postcard::from_bytes::<Distribution>(&bytes).is_err());
	}

	#[test]
	fn empty_tokens_are_rejected() {
		let raw = vec![("".to_owned(), 1u64), ("Hi".to_owned(), 1u64)];
		let bytes = postcard::to_stdvec(&raw).unwrap();
		assert!(postcard::from_bytes::<Distribution>(&bytes).is_err());
	}
}
