//! Scan cursor over the source characters with a memoizing substring cache.
//!
//! The dialect classifiers repeatedly ask for "the next N characters" (plain
//! or upper-cased) while probing comment markers, operators and delimiters
//! at a fixed position. The cache memoizes those substrings per requested
//! length and is invalidated whenever the cursor advances, so probing many
//! operator lengths at one position costs one string build per length.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

/// Length-descending candidate buckets for [`SourceCursor::longest_match`].
pub type LengthBuckets = Vec<(usize, HashSet<&'static str>)>;

/// Group fixed candidate strings by character length, longest first.
pub fn length_buckets(candidates: &[&'static str]) -> LengthBuckets {
    candidates
        .iter()
        .copied()
        .into_group_map_by(|s| s.chars().count())
        .into_iter()
        .map(|(len, group)| (len, group.into_iter().collect()))
        .sorted_by(|a, b| b.0.cmp(&a.0))
        .collect()
}

/// Left-to-right scan position over a source string, character-addressed.
#[derive(Debug)]
pub struct SourceCursor {
    chars: Vec<char>,
    pos: usize,
    plain: HashMap<usize, String>,
    upper: HashMap<usize, String>,
}

impl SourceCursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            plain: HashMap::new(),
            upper: HashMap::new(),
        }
    }

    /// Current character offset.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Characters left to scan.
    pub fn remaining(&self) -> usize {
        self.chars.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Advance the cursor by `n` characters, invalidating the cache.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
        self.plain.clear();
        self.upper.clear();
    }

    /// Character at the cursor.
    pub fn peek(&self) -> Option<char> {
        self.char_at(0)
    }

    /// Character `rel` positions ahead of the cursor.
    pub fn char_at(&self, rel: usize) -> Option<char> {
        self.chars.get(self.pos + rel).copied()
    }

    /// Memoized substring of `length` characters at the cursor, clamped to
    /// the end of input.
    pub fn substring(&mut self, length: usize) -> &str {
        let length = length.min(self.remaining());
        self.plain
            .entry(length)
            .or_insert_with(|| self.chars[self.pos..self.pos + length].iter().collect())
    }

    /// Memoized upper-cased substring of `length` characters at the cursor.
    pub fn substring_upper(&mut self, length: usize) -> &str {
        let length = length.min(self.remaining());
        self.upper.entry(length).or_insert_with(|| {
            self.chars[self.pos..self.pos + length]
                .iter()
                .collect::<String>()
                .to_uppercase()
        })
    }

    /// True if the text at the cursor starts with `prefix` (case-sensitive).
    pub fn starts_with(&mut self, prefix: &str) -> bool {
        let len = prefix.chars().count();
        len <= self.remaining() && self.substring(len) == prefix
    }

    /// Find `needle`, scanning forward from `from` characters past the
    /// cursor. Returns the match position relative to the cursor.
    pub fn find(&self, needle: &str, from: usize) -> Option<usize> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() {
            return Some(from);
        }
        let haystack = &self.chars[self.pos..];
        (from..haystack.len().checked_sub(needle.len() - 1)?)
            .find(|&i| haystack[i..i + needle.len()] == needle[..])
    }

    /// Longest-match-wins lookup among fixed candidate strings.
    ///
    /// Buckets must be sorted longest first (see [`length_buckets`]); for
    /// each length the substring of that length at the cursor is tested for
    /// set membership, so the first hit is the longest. Case-insensitive
    /// buckets must hold upper-cased candidates.
    pub fn longest_match(
        &mut self,
        buckets: &LengthBuckets,
        case_sensitive: bool,
    ) -> Option<&'static str> {
        for (length, candidates) in buckets {
            if *length > self.remaining() {
                continue;
            }
            let probe = if case_sensitive {
                self.substring(*length)
            } else {
                self.substring_upper(*length)
            };
            if let Some(hit) = candidates.get(probe).copied() {
                return Some(hit);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_is_clamped_and_memoized() {
        let mut cursor = SourceCursor::new("abc");
        assert_eq!(cursor.substring(2), "ab");
        assert_eq!(cursor.substring(10), "abc");
        // Same length twice hits the cache; result must be stable.
        assert_eq!(cursor.substring(2), "ab");
    }

    #[test]
    fn advance_invalidates_cache() {
        let mut cursor = SourceCursor::new("abcd");
        assert_eq!(cursor.substring(2), "ab");
        cursor.advance(1);
        assert_eq!(cursor.substring(2), "bc");
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn upper_variant() {
        let mut cursor = SourceCursor::new("select");
        assert_eq!(cursor.substring_upper(6), "SELECT");
        assert_eq!(cursor.substring(6), "select");
    }

    #[test]
    fn char_addressing_is_not_byte_addressing() {
        let mut cursor = SourceCursor::new("é<=x");
        cursor.advance(1);
        assert_eq!(cursor.substring(2), "<=");
        assert_eq!(cursor.find("x", 0), Some(2));
    }

    #[test]
    fn find_relative_to_cursor() {
        let mut cursor = SourceCursor::new("ab*/cd*/");
        assert_eq!(cursor.find("*/", 0), Some(2));
        cursor.advance(3);
        assert_eq!(cursor.find("*/", 0), Some(3));
        assert_eq!(cursor.find("zz", 0), None);
    }

    #[test]
    fn longest_match_prefers_longer_operator() {
        let buckets = length_buckets(&["<", "<=", "<<", "="]);
        let mut cursor = SourceCursor::new("<=1");
        assert_eq!(cursor.longest_match(&buckets, true), Some("<="));
        cursor.advance(2);
        assert_eq!(cursor.longest_match(&buckets, true), None);
    }
}
