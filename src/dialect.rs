//! Pluggable per-dialect character classifiers.
//!
//! Each classifier answers "is there an X at the cursor" by reporting the
//! matched length in characters and, where useful, a canonical content
//! string (operator text, unescaped identifier, keyword spelling). The
//! tokenizer consults them in a fixed priority order and never backtracks
//! past the cursor.
//!
//! The classifiers are deliberately permissive: an unterminated quoted
//! identifier, string literal or block comment runs to the end of input and
//! is reported as a normal match, mirroring how real drivers treat trailing
//! garbage in best-effort tooling.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::cursor::{LengthBuckets, SourceCursor, length_buckets};
use crate::keyword;

/// A positive classifier answer: how many characters matched, and the
/// canonical content if the token carries one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierMatch {
    pub length: usize,
    pub content: Option<String>,
}

impl ClassifierMatch {
    fn plain(length: usize) -> Self {
        Self {
            length,
            content: None,
        }
    }

    fn with_content(length: usize, content: impl Into<String>) -> Self {
        Self {
            length,
            content: Some(content.into()),
        }
    }
}

/// SQL-dialect seam for the tokenizer.
pub trait Dialect {
    /// A run of whitespace at the cursor.
    fn match_whitespace(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch>;
    /// A line or block comment at the cursor.
    fn match_comment(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch>;
    /// The longest registered operator at the cursor.
    fn match_operator(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch>;
    /// A quoted identifier at the cursor; content is the unescaped text.
    fn match_identifier(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch>;
    /// A string literal at the cursor; content is the unescaped text.
    fn match_string_literal(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch>;
    /// Canonical spelling if `word` is a keyword of this dialect.
    fn keyword(&self, word: &str) -> Option<String>;
}

const OPERATORS: &[&str] = &[
    "!=", "%", "&", "(", ")", "*", "+", ",", "-", ".", "/", ";", "<", "<<", "<=", "<>", "=",
    "==", ">", ">=", ">>", "|", "||", "~",
];

static OPERATOR_BUCKETS: Lazy<LengthBuckets> = Lazy::new(|| length_buckets(OPERATORS));

static WHITESPACE: Lazy<HashSet<char>> =
    Lazy::new(|| [' ', '\t', '\n', '\r', '\x0c'].into_iter().collect());

/// The fixed SQLite rule set.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Scan a delimited region with doubled-delimiter escaping, returning
    /// (total length including delimiters, unescaped inner content). An
    /// unterminated region runs to the end of input.
    fn delimited(cursor: &SourceCursor, quote: char) -> (usize, String) {
        let mut content = String::new();
        let mut i = 1;
        loop {
            match cursor.char_at(i) {
                Some(c) if c == quote => {
                    if cursor.char_at(i + 1) == Some(quote) {
                        content.push(quote);
                        i += 2;
                    } else {
                        return (i + 1, content);
                    }
                }
                Some(c) => {
                    content.push(c);
                    i += 1;
                }
                None => return (i, content),
            }
        }
    }
}

impl Dialect for SqliteDialect {
    fn match_whitespace(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch> {
        let mut length = 0;
        while let Some(c) = cursor.char_at(length) {
            if !WHITESPACE.contains(&c) {
                break;
            }
            length += 1;
        }
        (length > 0).then(|| ClassifierMatch::plain(length))
    }

    fn match_comment(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch> {
        if cursor.starts_with("--") {
            // To the end of the line; the newline itself is left for the
            // whitespace classifier.
            let length = cursor.find("\n", 2).unwrap_or(cursor.remaining());
            return Some(ClassifierMatch::plain(length));
        }
        if cursor.starts_with("/*") {
            let length = match cursor.find("*/", 2) {
                Some(at) => at + 2,
                None => cursor.remaining(),
            };
            return Some(ClassifierMatch::plain(length));
        }
        None
    }

    fn match_operator(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch> {
        cursor
            .longest_match(&OPERATOR_BUCKETS, true)
            .map(|op| ClassifierMatch::with_content(op.chars().count(), op))
    }

    fn match_identifier(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch> {
        match cursor.peek()? {
            quote @ ('"' | '`') => {
                let (length, content) = Self::delimited(cursor, quote);
                Some(ClassifierMatch::with_content(length, content))
            }
            '[' => {
                // Bracket quoting has no escape form; the first `]` closes.
                match cursor.find("]", 1) {
                    Some(at) => {
                        let content: String = (1..at).filter_map(|i| cursor.char_at(i)).collect();
                        Some(ClassifierMatch::with_content(at + 1, content))
                    }
                    None => {
                        let content: String =
                            (1..cursor.remaining()).filter_map(|i| cursor.char_at(i)).collect();
                        Some(ClassifierMatch::with_content(cursor.remaining(), content))
                    }
                }
            }
            _ => None,
        }
    }

    fn match_string_literal(&self, cursor: &mut SourceCursor) -> Option<ClassifierMatch> {
        if cursor.peek()? != '\'' {
            return None;
        }
        let (length, content) = Self::delimited(cursor, '\'');
        Some(ClassifierMatch::with_content(length, content))
    }

    fn keyword(&self, word: &str) -> Option<String> {
        keyword::canonical(word).map(str::to_string)
    }
}
