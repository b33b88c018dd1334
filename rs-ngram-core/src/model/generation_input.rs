use std::ops::RangeInclusive;

use crate::error::{LmError, LmResult};

/// Default number of tokens to generate.
pub const DEFAULT_TARGET_SIZE: usize = 10_000;

/// Default bounds (inclusive) on the number of sentences per paragraph.
pub const DEFAULT_PARAGRAPH_SENTENCES: RangeInclusive<usize> = 3..=9;

/// Input parameters for one generation run.
///
/// # Invariants
/// - `target_size >= 1`
/// - `1 <= paragraph_min <= paragraph_max`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationInput {
	/// Minimum number of generation steps before stopping at a sentence end.
	target_size: usize,

	/// Fewest sentences in a paragraph.
	paragraph_min: usize,

	/// Most sentences in a paragraph.
	paragraph_max: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			target_size: DEFAULT_TARGET_SIZE,
			paragraph_min: *DEFAULT_PARAGRAPH_SENTENCES.start(),
			paragraph_max: *DEFAULT_PARAGRAPH_SENTENCES.end(),
		}
	}
}

impl GenerationInput {
	/// Creates an input with the given target size and default paragraphs.
	///
	/// # Errors
	/// Returns `InvalidTargetSize` if `target_size` is 0.
	pub fn new(target_size: usize) -> LmResult<Self> {
		let mut input = Self::default();
		input.set_target_size(target_size)?;
		Ok(input)
	}

	/// Returns the target size.
	pub fn target_size(&self) -> usize {
		self.target_size
	}

	/// Sets the target size.
	///
	/// # Errors
	/// Returns `InvalidTargetSize` if `target_size` is 0.
	pub fn set_target_size(&mut self, target_size: usize) -> LmResult<()> {
		if target_size == 0 {
			return Err(LmError::InvalidTargetSize);
		}
		self.target_size = target_size;
		Ok(())
	}

	/// Returns the range paragraph lengths (in sentences) are drawn from.
	pub fn paragraph_sentences(&self) -> RangeInclusive<usize> {
		self.paragraph_min..=self.paragraph_max
	}

	/// Sets the paragraph length bounds, in sentences, both inclusive.
	///
	/// # Errors
	/// Returns `InvalidParagraphRange` if `min` is 0 or greater than `max`.
	pub fn set_paragraph_sentences(&mut self, min: usize, max: usize) -> LmResult<()> {
		if min == 0 || min > max {
			return Err(LmError::InvalidParagraphRange { min, max });
		}
		self.paragraph_min = min;
		self.paragraph_max = max;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let input = GenerationInput::default();
		assert_eq!(input.target_size(), 10_000);
		assert_eq!(input.paragraph_sentences(), 3..=9);
	}

	#[test]
	fn zero_target_is_rejected() {
		assert!(matches!(GenerationInput::new(0), Err(LmError::InvalidTargetSize)));
		let mut input = GenerationInput::new(5).unwrap();
		assert!(input.set_target_size(0).is_err());
		assert_eq!(input.target_size(), 5);
	}

	#[test]
	fn paragraph_range_is_checked() {
		let mut input = GenerationInput::default();
		assert!(input.set_paragraph_sentences(0, 4).is_err());
		assert!(input.set_paragraph_sentences(5, 4).is_err());
		assert_eq!(input.paragraph_sentences(), 3..=9);
		input.set_paragraph_sentences(2, 2).unwrap();
		assert_eq!(input.paragraph_sentences(), 2..=2);
	}
}
