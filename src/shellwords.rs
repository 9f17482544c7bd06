//! Shell word splitting and escaping.
//!
//! `svccfg listprop` prints multi-value properties as shell-quoted,
//! space-separated tokens, and `svccfg setprop` expects values in the same
//! form. These helpers follow the Bourne shell rules for the subset of syntax
//! that appears there: bare words, single quotes, double quotes and
//! backslash escapes.
//!
//! # Example
//!
//! ```
//! use smf_property::shellwords;
//!
//! let words = vec!["8.8.8.8".to_string(), "it's here".to_string()];
//! let line = shellwords::join(&words);
//! assert_eq!(line, r"8.8.8.8 it\'s\ here");
//! assert_eq!(shellwords::split(&line).unwrap(), words);
//! ```

use thiserror::Error;

/// A quote was opened but never closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unmatched quote: {line:?}")]
pub struct UnmatchedQuote {
    /// The line that failed to split.
    pub line: String,
}

/// Characters matched by `\s`.
pub(crate) fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Characters that never need escaping.
fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ',' | ':' | '+' | '/' | '@')
}

/// Split a line into words the way a POSIX shell would.
///
/// Adjacent quoted and unquoted pieces concatenate into one word, so
/// `a"b c"'d'` is the single word `ab cd`. An empty quoted string produces
/// an empty word.
pub fn split(line: &str) -> Result<Vec<String>, UnmatchedQuote> {
    let unmatched = || UnmatchedQuote {
        line: line.to_string(),
    };

    let mut words = Vec::new();
    let mut field = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if is_blank(c) => {
                if in_word {
                    words.push(std::mem::take(&mut field));
                    in_word = false;
                }
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => field.push(ch),
                        None => return Err(unmatched()),
                    }
                }
            },
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('$' | '`' | '"' | '\\' | '\n')) => field.push(ch),
                            Some(ch) => {
                                field.push('\\');
                                field.push(ch);
                            },
                            None => return Err(unmatched()),
                        },
                        Some(ch) => field.push(ch),
                        None => return Err(unmatched()),
                    }
                }
            },
            '\\' => {
                in_word = true;
                // A trailing backslash stays literal.
                field.push(chars.next().unwrap_or('\\'));
            },
            c => {
                in_word = true;
                field.push(c);
            },
        }
    }

    if in_word {
        words.push(field);
    }
    Ok(words)
}

/// Escape a string so that the shell reads it back as exactly one word.
///
/// Unsafe characters are backslash-escaped rather than quoted, and the
/// empty string becomes `''`.
pub fn escape(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }

    let mut escaped = String::with_capacity(word.len() * 2);
    for c in word.chars() {
        if c == '\n' {
            // A backslash-newline is a line continuation, so quote it instead.
            escaped.push_str("'\n'");
        } else if is_safe(c) {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

/// Escape each word and join them with single spaces.
pub fn join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| escape(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
