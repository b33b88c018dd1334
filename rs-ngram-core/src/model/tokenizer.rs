/// Characters that close a sentence.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '?', '!'];

/// Returns `true` for ASCII punctuation characters.
pub fn is_punctuation(c: char) -> bool {
	c.is_ascii_punctuation()
}

/// Returns `true` if `token` is a single punctuation character.
pub fn is_punctuation_token(token: &str) -> bool {
	let mut chars = token.chars();
	matches!((chars.next(), chars.next()), (Some(c), None) if is_punctuation(c))
}

/// Returns `true` if `token` is one of `.`, `?` or `!`.
pub fn is_sentence_terminator(token: &str) -> bool {
	let mut chars = token.chars();
	matches!((chars.next(), chars.next()), (Some(c), None) if SENTENCE_TERMINATORS.contains(&c))
}

/// Splits a line into word and punctuation tokens.
///
/// The line is trimmed, then split on single spaces. A leading and a
/// trailing punctuation character are detached from each piece:
///
/// `"Hello, how are you?"` → `["Hello", ",", "how", "are", "you", "?"]`
///
/// Tokens borrow from `line` and are produced lazily; empty pieces
/// (consecutive spaces) yield nothing.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
	line.trim().split(' ').flat_map(split_piece)
}

/// Splits one space-delimited piece into at most three tokens.
fn split_piece(piece: &str) -> impl Iterator<Item = &str> {
	let mut tokens: [Option<&str>; 3] = [None; 3];

	let mut chars = piece.chars();
	let first = match chars.next() {
		None => return tokens.into_iter().flatten(),
		Some(c) => c,
	};
	if chars.next().is_none() {
		tokens[0] = Some(piece);
		return tokens.into_iter().flatten();
	}

	let mut rest = piece;
	if is_punctuation(first) {
		let (lead, tail) = rest.split_at(first.len_utf8());
		tokens[0] = Some(lead);
		rest = tail;
	}

	// A remainder of a single character is emitted unchanged
	let mut rest_chars = rest.chars();
	let last = rest_chars.next_back();
	match last {
		Some(last) if rest_chars.next().is_some() && is_punctuation(last) => {
			let (body, tail) = rest.split_at(rest.len() - last.len_utf8());
			tokens[1] = Some(body);
			tokens[2] = Some(tail);
		}
		_ => tokens[1] = Some(rest),
	}

	tokens.into_iter().flatten()
}
