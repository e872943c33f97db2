use std::sync::LazyLock;

use regex::Regex;

/// Sub-patterns in priority order. At each scan position the first
/// alternative that matches wins, so reordering them changes the output.
const TOKEN_PATTERNS: [&str; 9] = [
	// Emoticons: eyes, optional nose, mouth
	r"[:=;][oO\-]?[D\)\]\(\]/\\OpP]",
	// HTML tags
	r"<[^>]+>",
	// @-mentions
	r"@[\w_]+",
	// Hashtags
	r"#+[\w_]+[\w'_\-]*[\w_]+",
	// URLs
	r"https?://(?:[a-z]|[0-9]|[$-_@.&+]|[!*\(\),]|%[0-9a-f][0-9a-f])+",
	// Numbers
	r"(?:\d+,?)+(?:\.?\d+)?",
	// Words with - and '
	r"[a-z][a-z'\-_]+[a-z]",
	// Other words
	r"[\w_]+",
	// Anything else
	r"\S",
];

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
	let alternation = TOKEN_PATTERNS
		.iter()
		.map(|pattern| format!("(?:{pattern})"))
		.collect::<Vec<_>>()
		.join("|");
	// Constant pattern, covered by the tests below
	Regex::new(&format!("(?i){alternation}")).expect("token pattern must compile")
});

/// Iterates over the tokens of a short text, in order.
///
/// Whitespace between matches is skipped. The last alternative matches any
/// single non-whitespace character, so the scan never stalls.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
	TOKEN_RE.find_iter(text).map(|m| m.as_str())
}

/// Splits a raw post into tokens (emoticons, tags, mentions, hashtags,
/// URLs, numbers, words and single punctuation characters).
///
/// Pure and infallible: an empty or blank input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<&str> {
	tokens(text).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::markov_chain::END_OF_SEQUENCE;

	#[test]
	fn mixed_categories_keep_their_order() {
		assert_eq!(
			tokenize("Hello @world #test :) http://example.com 42.5"),
			vec!["Hello", "@world", "#test", ":)", "http://example.com", "42.5"]
		);
	}

	#[test]
	fn empty_and_blank_inputs() {
		assert!(tokenize("").is_empty());
		assert!(tokenize("  \t\n ").is_empty());
	}

	#[test]
	fn emoticons() {
		assert_eq!(tokenize(":-D ;p =( :O"), vec![":-D", ";p", "=(", ":O"]);
	}

	#[test]
	fn html_tags_may_contain_spaces() {
		assert_eq!(tokenize("<a href=x>link</a>"), vec!["<a href=x>", "link", "</a>"]);
	}

	#[test]
	fn hashtags_and_mentions() {
		assert_eq!(tokenize("##rust-lang @some_user"), vec!["##rust-lang", "@some_user"]);
		// A hashtag needs at least two word characters
		assert_eq!(tokenize("#a"), vec!["#", "a"]);
	}

	#[test]
	fn urls_stop_at_whitespace() {
		assert_eq!(
			tokenize("see https://t.co/AbC%20d?x=1 now"),
			vec!["see", "https://t.co/AbC%20d?x=1", "now"]
		);
	}

	#[test]
	fn numbers() {
		assert_eq!(tokenize("1,000.50 and 7"), vec!["1,000.50", "and", "7"]);
	}

	#[test]
	fn hyphen_and_apostrophe_words() {
		assert_eq!(tokenize("don't well-known"), vec!["don't", "well-known"]);
		// Trailing apostrophe is not part of the word
		assert_eq!(tokenize("dogs'"), vec!["dogs", "'"]);
	}

	#[test]
	fn fallback_emits_single_characters() {
		assert_eq!(tokenize("wow!!!"), vec!["wow", "!", "!", "!"]);
		assert_eq!(tokenize("a"), vec!["a"]);
	}

	#[test]
	fn sentinel_is_never_produced() {
		let produced = tokenize(END_OF_SEQUENCE);
		assert!(!produced.is_empty());
		assert!(produced.iter().all(|token| *token != END_OF_SEQUENCE));
	}
}
