//! Expansion passes applied to a tokenized command, in order: aliases,
//! variables and `~`, then filesystem patterns.

use crate::alias::AliasTable;
use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer::{self, Tokens};
use glob::MatchOptions;

/// Characters that make a word a filesystem pattern.
const WILDCARDS: [char; 3] = ['*', '?', '['];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Rewrites the head of `args` while it names an alias.
///
/// The alias value is tokenized and spliced in place of the head, followed by the
/// original operands. The new head is expanded again unless it is an alias already
/// used in this chain (so `grep -> grep --color=auto` stops after one step).
/// Chains longer than `max_depth` fail instead of looping.
pub fn expand_aliases(
    mut tokens: Tokens,
    aliases: &AliasTable,
    limit: usize,
    max_depth: usize,
) -> Result<Tokens, ShellError> {
    let mut expanded: Vec<String> = Vec::new();

    while let Some(head) = tokens.args.first() {
        if expanded.iter().any(|name| name == head) {
            break;
        }
        let Some(value) = aliases.get(head) else {
            break;
        };
        if expanded.len() == max_depth {
            return Err(ShellError::AliasDepthExceeded {
                name: expanded.first().cloned().unwrap_or_else(|| head.clone()),
                depth: max_depth,
            });
        }

        let mut args = lexer::split_into_tokens(value, limit).args;
        let mut rest = std::mem::take(&mut tokens.args);
        expanded.push(rest.remove(0));
        args.extend(rest);
        if args.len() > limit {
            tokens.dropped += args.len() - limit;
            args.truncate(limit);
        }
        tokens.args = args;
    }

    if !expanded.is_empty() {
        log::debug!("alias {:?} -> {:?}", expanded, tokens.args);
    }
    Ok(tokens)
}

/// Replaces `$NAME` words with the variable's value and a leading `~` with the
/// home directory.
///
/// A reference to an undefined variable is left as written.
pub fn expand_variables(args: &mut [String], env: &Environment) {
    for arg in args.iter_mut() {
        if let Some(name) = arg.strip_prefix('$') {
            if let Some(value) = env.get_var(name) {
                *arg = value;
            }
        } else if arg == "~" || arg.starts_with("~/") {
            let home = env.home_dir.to_string_lossy();
            *arg = format!("{}{}", home, &arg[1..]);
        }
    }
}

pub fn has_wildcards(word: &str) -> bool {
    word.contains(WILDCARDS)
}

/// Replaces each pattern word with the sorted paths it matches.
///
/// Words without matches, and words that are not valid patterns, pass through
/// unchanged. The result is capped at `limit` words.
pub fn expand_patterns(tokens: Tokens, limit: usize) -> Tokens {
    let mut out = Tokens {
        args: Vec::with_capacity(tokens.args.len()),
        dropped: tokens.dropped,
    };

    for word in tokens.args {
        let matches = if has_wildcards(&word) {
            glob_matches(&word)
        } else {
            Vec::new()
        };
        let words = if matches.is_empty() { vec![word] } else { matches };

        for w in words {
            if out.args.len() < limit {
                out.args.push(w);
            } else {
                out.dropped += 1;
            }
        }
    }
    out
}

fn glob_matches(pattern: &str) -> Vec<String> {
    match glob::glob_with(pattern, MATCH_OPTIONS) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path.to_string_lossy().into_owned()),
                Err(e) => {
                    log::debug!("skipping unreadable match for {}: {}", pattern, e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            log::debug!("{} is not a valid pattern: {}", pattern, e);
            Vec::new()
        }
    }
}

/// Runs all three passes over a tokenized command.
pub fn expand(
    tokens: Tokens,
    aliases: &AliasTable,
    env: &Environment,
    limit: usize,
    max_alias_depth: usize,
) -> Result<Tokens, ShellError> {
    let mut tokens = expand_aliases(tokens, aliases, limit, max_alias_depth)?;
    expand_variables(&mut tokens.args, env);
    Ok(expand_patterns(tokens, limit))
}
