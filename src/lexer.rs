//! A module implementing lexical analysis (tokenization) for the command line.
//!
//! Words are separated by runs of whitespace. Quoting, escaping and comments are
//! not recognized: `echo "a b"` yields the two words `"a` and `b"`.

/// An argument sequence produced by [`split_into_tokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Non-empty words in input order.
    pub args: Vec<String>,
    /// Number of words discarded because the line exceeded the token limit.
    pub dropped: usize,
}

/// Splits `line` into whitespace-separated words, keeping at most `limit` of them.
///
/// Excess words are counted in [`Tokens::dropped`] rather than treated as an error.
/// An all-whitespace line produces an empty sequence.
pub fn split_into_tokens(line: &str, limit: usize) -> Tokens {
    let mut words = line.split_whitespace();
    let args: Vec<String> = words.by_ref().take(limit).map(str::to_owned).collect();
    let dropped = words.count();
    Tokens { args, dropped }
}

/// Strips a trailing `&` (after trimming) and reports whether it was present.
///
/// The returned slice is what remains to be tokenized. `ls&` and `ls &` are both
/// background invocations of `ls`.
pub fn strip_background_marker(line: &str) -> (&str, bool) {
    let trimmed = line.trim();
    match trimmed.strip_suffix('&') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    }
}
