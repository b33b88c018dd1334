use log::debug;
use rand::Rng;

use crate::error::{LmError, LmResult};
use crate::model::generation_input::GenerationInput;
use crate::model::language_model::LanguageModel;
use crate::model::tokenizer::{is_punctuation_token, is_sentence_terminator};

/// Random walk over a `LanguageModel`.
///
/// # Responsibilities
/// - Track the current context and grow it token by token up to `order - 1`
/// - Back off to a shorter context when the current one was never observed
/// - Restart from sentence-initial words after `.`, `?` or `!`
/// - Join tokens into paragraphs
///
/// The generator only borrows the model; each call owns its own state,
/// and all randomness comes from the caller's RNG.
#[derive(Debug, Clone, Copy)]
pub struct TextGenerator<'m> {
	model: &'m LanguageModel,
}

impl<'m> TextGenerator<'m> {
	/// Creates a generator over a validated model.
	///
	/// # Errors
	/// Returns `EmptyModel` or `NoReachableTerminator` if the model
	/// cannot end a sentence, since generation would never stop.
	pub fn new(model: &'m LanguageModel) -> LmResult<Self> {
		model.validate()?;
		Ok(Self { model })
	}

	/// Generates text and formats it into paragraphs.
	pub fn generate<R: Rng + ?Sized>(&self, input: &GenerationInput, rng: &mut R) -> LmResult<String> {
		let tokens = self.generate_tokens(input.target_size(), rng)?;
		Ok(format_paragraphs(&tokens, input, rng))
	}

	/// Generates tokens until at least `target_size` steps were taken and
	/// a sentence ended at or after that point.
	///
	/// # Behavior
	/// Each step draws from the sentence-initial distribution when the
	/// context is empty, otherwise from the distribution of the last
	/// `context_length` tokens. A drawn token is appended and the context
	/// grows by one (capped at `order - 1`). A sentence terminator resets
	/// the context. An unobserved context drops to one token shorter.
	/// Every step counts toward `target_size`, drawn or not.
	///
	/// # Errors
	/// - `InvalidTargetSize` if `target_size` is 0
	/// - `DegenerateDistribution` if the sentence-initial distribution is empty
	pub fn generate_tokens<R: Rng + ?Sized>(&self, target_size: usize, rng: &mut R) -> LmResult<Vec<String>> {
		if target_size == 0 {
			return Err(LmError::InvalidTargetSize);
		}

		let order = self.model.order();
		let mut tokens: Vec<String> = Vec::with_capacity(target_size.min(1 << 16));
		let mut context_length: usize = 0;
		let mut steps: usize = 0;
		let mut backoffs: usize = 0;
		let mut ended_after_target = false;

		while steps < target_size || !ended_after_target {
			let context = &tokens[tokens.len() - context_length..];
			let drawn = if context_length == 0 {
				self.model.first_words().sample(rng)
			} else {
				match self.model.table().get(context) {
					Some(distribution) => distribution.sample(rng),
					None => Err(LmError::DegenerateDistribution),
				}
			};

			match drawn {
				Ok(token) => {
					tokens.push(token.to_owned());
					if context_length + 1 < order {
						context_length += 1;
					}
					if is_sentence_terminator(token) {
						context_length = 0;
						ended_after_target = steps >= target_size;
					}
				}
				// Back off from the context that had no data
				Err(LmError::DegenerateDistribution) if context_length > 0 => {
					context_length -= 1;
					backoffs += 1;
				}
				Err(e) => return Err(e),
			}

			steps += 1;
		}

		debug!("generated {} tokens in {} steps ({} backoffs)", tokens.len(), steps, backoffs);
		Ok(tokens)
	}
}

/// Joins tokens into text, breaking paragraphs every few sentences.
///
/// - A space precedes every token except the first of a paragraph and
///   punctuation tokens.
/// - After each `k`-th sentence terminator a newline is emitted, with `k`
///   drawn fresh from `input.paragraph_sentences()` for every paragraph.
pub fn format_paragraphs<S, R>(tokens: &[S], input: &GenerationInput, rng: &mut R) -> String
where
	S: AsRef<str>,
	R: Rng + ?Sized,
{
	let mut text = String::new();
	let mut sentences = 0;
	let mut tokens_in_paragraph = 0;
	let mut paragraph_size = rng.random_range(input.paragraph_sentences());

	for token in tokens {
		let token = token.as_ref();
		if tokens_in_paragraph != 0 && !is_punctuation_token(token) {
			text.push(' ');
		}
		if is_sentence_terminator(token) {
			sentences += 1;
		}
		text.push_str(token);
		tokens_in_paragraph += 1;

		if sentences == paragraph_size {
			sentences = 0;
			tokens_in_paragraph = 0;
			paragraph_size = rng.random_range(input.paragraph_sentences());
			text.push('\n');
		}
	}

	text
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::ModelBuilder;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	const CORPUS: [&str; 6] = [
		"The cat sat on the mat.",
		"The dog sat on the rug.",
		"A cat saw the dog, and the dog ran!",
		"Did the cat see a bird?",
		"The bird sang.",
		"Birds sing on the mat.",
	];

	fn model(order: usize, lines: &[&str]) -> LanguageModel {
		ModelBuilder::new(order).unwrap().build(lines)
	}

	#[test]
	fn refuses_models_that_cannot_end() {
		let m = model(3, &["round and round and round"]);
		assert!(matches!(TextGenerator::new(&m), Err(LmError::NoReachableTerminator)));
		let empty = model(3, &[""]);
		assert!(matches!(TextGenerator::new(&empty), Err(LmError::EmptyModel)));
	}

	#[test]
	fn zero_target_is_rejected() {
		let m = model(2, &CORPUS);
		let mut rng = StdRng::seed_from_u64(0);
		let generator = TextGenerator::new(&m).unwrap();
		assert!(matches!(generator.generate_tokens(0, &mut rng), Err(LmError::InvalidTargetSize)));
	}

	#[test]
	fn stops_at_sentence_end_after_target() {
		let m = model(3, &CORPUS);
		let generator = TextGenerator::new(&m).unwrap();
		for seed in 0..20 {
			let mut rng = StdRng::seed_from_u64(seed);
			let tokens = generator.generate_tokens(25, &mut rng).unwrap();
			// Every context in this corpus is observed, so every step draws a token
			assert!(tokens.len() > 25, "seed {seed}: {} tokens", tokens.len());
			assert!(is_sentence_terminator(tokens.last().unwrap()));
			// the first sentence end at or after the target ends the run
			let (last, after_target) = tokens[25..].split_last().unwrap();
			assert!(is_sentence_terminator(last));
			assert!(
				after_target.iter().all(|t| !is_sentence_terminator(t)),
				"seed {seed}: overshot past a sentence end: {tokens:?}"
			);
		}
	}

	#[test]
	fn same_seed_same_text() {
		let m = model(3, &CORPUS);
		let generator = TextGenerator::new(&m).unwrap();
		let input = GenerationInput::new(60).unwrap();
		let a = generator.generate(&input, &mut StdRng::seed_from_u64(1234)).unwrap();
		let b = generator.generate(&input, &mut StdRng::seed_from_u64(1234)).unwrap();
		assert_eq!(a, b);
	}

	#[test]
	fn single_sentence_corpus() {
		let m = model(2, &["Hi."]);
		for seed in 0..10 {
			let mut rng = StdRng::seed_from_u64(seed);
			let tokens = TextGenerator::new(&m).unwrap().generate_tokens(7, &mut rng).unwrap();
			assert!(tokens.iter().all(|t| t == "Hi" || t == "."));
			assert_eq!(tokens.last().map(String::as_str), Some("."));
		}
	}

	#[test]
	fn backs_off_to_shorter_context() {
		// "b" ends a sentence without a terminator: the context ["a", "b"]
		// is never followed, but ["b"] is (by "b ." in the second line).
		let m = model(3, &["a b", "c b ."]);
		assert!(m.table().get(&["a".to_owned(), "b".to_owned()]).is_none());
		assert!(m.table().get(&["b".to_owned()]).is_some());

		let generator = TextGenerator::new(&m).unwrap();
		for seed in 0..20 {
			let mut rng = StdRng::seed_from_u64(seed);
			let tokens = generator.generate_tokens(10, &mut rng).unwrap();
			assert_eq!(tokens.last().map(String::as_str), Some("."));
		}
	}

	#[test]
	fn dead_end_restarts_from_sentence_start() {
		// "stop" is never followed by anything
		let m = model(4, &["go stop", "go on ."]);
		let generator = TextGenerator::new(&m).unwrap();
		for seed in 0..20 {
			let mut rng = StdRng::seed_from_u64(seed);
			let tokens = generator.generate_tokens(5, &mut rng).unwrap();
			assert_eq!(tokens.last().map(String::as_str), Some("."));
		}
	}

	#[test]
	fn order_one_draws_sentence_starts_only() {
		let m = model(1, &["Yes.", "No.", "! bang"]);
		let mut rng = StdRng::seed_from_u64(3);
		let tokens = TextGenerator::new(&m).unwrap().generate_tokens(20, &mut rng).unwrap();
		assert!(tokens.iter().all(|t| t == "Yes" || t == "No" || t == "!"));
	}

	#[test]
	fn formatting_spaces_and_punctuation() {
		let mut input = GenerationInput::default();
		input.set_paragraph_sentences(5, 5).unwrap();
		let tokens = ["Hello", ",", "world", "!", "Bye", "."];
		let text = format_paragraphs(&tokens, &input, &mut StdRng::seed_from_u64(0));
		assert_eq!(text, "Hello, world! Bye.");
	}

	#[test]
	fn formatting_breaks_paragraphs() {
		let mut input = GenerationInput::default();
		input.set_paragraph_sentences(2, 2).unwrap();
		let tokens = ["A", ".", "B", "?", "C", "!", "D", "."];
		let text = format_paragraphs(&tokens, &input, &mut StdRng::seed_from_u64(0));
		assert_eq!(text, "A. B?\nC! D.\n");
	}

	#[test]
	fn generated_text_uses_default_paragraphs() {
		let m = model(3, &CORPUS);
		let text = m.generate(200, &mut StdRng::seed_from_u64(77)).unwrap();
		assert!(!text.is_empty());
		for paragraph in text.lines() {
			let sentences = paragraph.chars().filter(|c| ['.', '?', '!'].contains(c)).count();
			assert!(sentences <= 9, "paragraph with {sentences} sentences");
			assert!(!paragraph.starts_with(' '));
		}
	}
}
