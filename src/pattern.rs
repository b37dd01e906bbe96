//! Structural pattern matching over token trees.
//!
//! A pattern is itself a token tree, produced by tokenizing a short literal
//! string such as `"any CREATE any TABLE any()"`. The word `any` (which is
//! not a SQLite keyword, so it tokenizes as `Plain`) is the wildcard: skip
//! haystack children until the next literal pattern child matches.
//!
//! The match is greedy, single-pass and non-backtracking: a wildcard always
//! accepts the *first* position where the following literal matches, and an
//! accepted literal match is never revisited. This can reject inputs a
//! backtracking matcher would accept; the behavior is deliberate and relied
//! upon by the DDL scanner, whose patterns hold at most one wildcard between
//! two literals.
//!
//! Nested collections compare by their interiors: for parenthesis groups
//! the delimiter operators are stripped from both sides first, so the
//! pattern fragment `()` (empty interior) matches any parenthesis group.

use crate::error::{Error, Result};
use crate::kind::TokenKind;
use crate::tokenizer::tokenize;
use crate::tree::{TokenId, TokenTree};

/// Wildcard word recognized inside pattern strings.
const WILDCARD: &str = "any";

/// Inclusive child-index span of a successful match within the haystack
/// collection. Wildcard-skipped children before the first literal are not
/// part of the span.
///
/// A pattern with no literal children matches vacuously: both indices then
/// equal the starting offset, which may lie at or past the end of the child
/// list. Such a span marks a position, not matched children, and must not
/// be used to index into the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub first: usize,
    pub last: usize,
}

/// A compiled pattern: the tokenized pattern string's first statement.
#[derive(Debug)]
pub struct Pattern {
    tree: TokenTree,
    statement: TokenId,
}

impl Pattern {
    /// Tokenize `text` and keep its first statement as the pattern body.
    pub fn compile(text: &str) -> Result<Self> {
        let tree = tokenize(text)?;
        let statement = tree
            .child(tree.root(), 0)
            .ok_or_else(|| Error::EmptyPattern(text.to_string()))?;
        Ok(Self { tree, statement })
    }

    /// Match the pattern against the children of `node`, starting at child
    /// index `offset`. `None` is the normal no-match outcome, never an
    /// error.
    pub fn match_at(&self, haystack: &TokenTree, node: TokenId, offset: usize) -> Option<MatchSpan> {
        match_children(
            &self.tree,
            self.tree.children(self.statement),
            haystack,
            haystack.children(node),
            offset,
        )
    }
}

/// Run the wildcard loop of pattern children over haystack children.
fn match_children(
    ptree: &TokenTree,
    pattern: &[TokenId],
    htree: &TokenTree,
    haystack: &[TokenId],
    mut offset: usize,
) -> Option<MatchSpan> {
    let mut span: Option<MatchSpan> = None;
    let mut wildcard = false;

    for &pchild in pattern {
        if ptree.kind(pchild) == TokenKind::Plain && ptree.content(pchild) == Some(WILDCARD) {
            wildcard = true;
            continue;
        }

        // A literal must match at the cursor, or, under a wildcard, at the
        // first position ahead where it does.
        let limit = if wildcard { haystack.len() } else { offset + 1 };
        let mut matched = None;
        while offset < limit && offset < haystack.len() {
            if nodes_match(ptree, pchild, htree, haystack[offset]) {
                matched = Some(offset);
                break;
            }
            offset += 1;
        }
        let at = matched?;
        span = Some(MatchSpan {
            first: span.map_or(at, |s| s.first),
            last: at,
        });
        offset = at + 1;
        wildcard = false;
    }

    // A pattern of only wildcards (or none) matches vacuously with an empty
    // span at the starting offset.
    Some(span.unwrap_or(MatchSpan {
        first: offset,
        last: offset,
    }))
}

/// Node equality for matching: leaves compare by content, collections by
/// their interiors (pattern children may be a prefix of the haystack's).
fn nodes_match(ptree: &TokenTree, pid: TokenId, htree: &TokenTree, hid: TokenId) -> bool {
    let pkind = ptree.kind(pid);
    let hkind = htree.kind(hid);
    if pkind.is_collection() != hkind.is_collection() {
        return false;
    }
    if pkind.is_leaf() {
        return ptree.content(pid) == htree.content(hid);
    }
    let pattern = interior(ptree, pid);
    let haystack = interior(htree, hid);
    match_children(ptree, pattern, htree, haystack, 0).is_some()
}

/// A collection's children with parenthesis delimiters stripped.
fn interior<'a>(tree: &'a TokenTree, id: TokenId) -> &'a [TokenId] {
    let mut children = tree.children(id);
    if tree.kind(id) == TokenKind::Parenthesis {
        if let [head, rest @ ..] = children {
            if tree.content(*head) == Some("(") {
                children = rest;
            }
        }
        if let [rest @ .., tail] = children {
            if tree.content(*tail) == Some(")") {
                children = rest;
            }
        }
    }
    children
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    /// The statement's children of a tokenized snippet.
    fn statement(sql: &str) -> (TokenTree, TokenId) {
        let tree = tokenize(sql).unwrap();
        let stmt = tree.child(tree.root(), 0).unwrap();
        (tree, stmt)
    }

    #[test]
    fn literal_sequence_matches_at_offset() {
        let (tree, stmt) = statement("CREATE TABLE t");
        let pattern = Pattern::compile("CREATE TABLE").unwrap();
        let span = pattern.match_at(&tree, stmt, 0).unwrap();
        assert_eq!(span, MatchSpan { first: 0, last: 1 });
        // Requires the exact position when no wildcard leads.
        assert!(pattern.match_at(&tree, stmt, 1).is_none());
    }

    #[test]
    fn wildcard_skips_to_next_literal() {
        let (tree, stmt) = statement("CREATE UNIQUE INDEX i");
        let pattern = Pattern::compile("any INDEX").unwrap();
        let span = pattern.match_at(&tree, stmt, 0).unwrap();
        assert_eq!(span, MatchSpan { first: 2, last: 2 });
    }

    #[test]
    fn empty_parens_match_any_group() {
        let (tree, stmt) = statement("CREATE TABLE t (a INT CHECK (a > 0))");
        let pattern = Pattern::compile("any CREATE any TABLE any()").unwrap();
        let span = pattern.match_at(&tree, stmt, 0).unwrap();
        let body = tree.child(stmt, span.last as isize).unwrap();
        assert_eq!(tree.kind(body), TokenKind::Parenthesis);
        assert_eq!(tree.source_text(body), "(a INT CHECK (a > 0))");
    }

    #[test]
    fn check_span_inside_table_body() {
        let (tree, stmt) = statement("CREATE TABLE t (a INT CHECK (a > 0))");
        let table = Pattern::compile("any CREATE any TABLE any()").unwrap();
        let body_index = table.match_at(&tree, stmt, 0).unwrap().last;
        let body = tree.child(stmt, body_index as isize).unwrap();

        let check = Pattern::compile("any CHECK()").unwrap();
        let span = check.match_at(&tree, body, 0).unwrap();
        let paren = tree.child(body, span.last as isize).unwrap();
        assert_eq!(tree.source_text(paren), "(a > 0)");
        // The keyword right before the parens is the matched CHECK.
        let kw = tree.child(body, span.first as isize).unwrap();
        assert_eq!(tree.content(kw), Some("CHECK"));
        // One match only: resuming past the span finds nothing.
        assert!(check.match_at(&tree, body, span.last + 1).is_none());
    }

    #[test]
    fn constraint_name_precedes_check() {
        let (tree, stmt) = statement("CREATE TABLE t (a INT, CONSTRAINT ck1 CHECK (a > 0))");
        let table = Pattern::compile("any CREATE any TABLE any()").unwrap();
        let body_index = table.match_at(&tree, stmt, 0).unwrap().last;
        let body = tree.child(stmt, body_index as isize).unwrap();

        let check = Pattern::compile("any CHECK()").unwrap();
        let span = check.match_at(&tree, body, 0).unwrap();

        let constraint = Pattern::compile("CONSTRAINT any").unwrap();
        let at = span.first - 2;
        assert!(constraint.match_at(&tree, body, at).is_some());
        let name = tree.child(body, (span.first - 1) as isize).unwrap();
        assert_eq!(tree.content(name), Some("ck1"));
    }

    #[rstest]
    #[case("SELECT 1", "any CHECK()")]
    #[case("CREATE TABLE t (a INT)", "any CHECK()")]
    #[case("DROP TABLE t", "any CREATE any TABLE any()")]
    fn no_match_is_none(#[case] sql: &str, #[case] pattern: &str) {
        let (tree, stmt) = statement(sql);
        let pattern = Pattern::compile(pattern).unwrap();
        assert!(pattern.match_at(&tree, stmt, 0).is_none());
    }

    #[test]
    fn keywords_compare_canonicalized() {
        let (tree, stmt) = statement("create table t (x int check (x > 0))");
        let pattern = Pattern::compile("any CREATE any TABLE any()").unwrap();
        assert!(pattern.match_at(&tree, stmt, 0).is_some());
    }

    #[test]
    fn greedy_wildcard_takes_first_literal_position() {
        // Two candidate TABLE positions: the wildcard stops at the first.
        let (tree, stmt) = statement("TABLE a TABLE b");
        let pattern = Pattern::compile("any TABLE any").unwrap();
        let span = pattern.match_at(&tree, stmt, 0).unwrap();
        assert_eq!(span.first, 0);
        assert_eq!(span.last, 0);
    }

    #[test]
    fn wildcard_only_pattern_matches_vacuously() {
        let (tree, stmt) = statement("SELECT 1");
        let pattern = Pattern::compile("any").unwrap();
        // The vacuous span sits at the offset, even past the last child,
        // and its indices do not name matched children.
        let span = pattern.match_at(&tree, stmt, 2).unwrap();
        assert_eq!(span, MatchSpan { first: 2, last: 2 });
        assert!(tree.child(stmt, span.last as isize).is_none());
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(matches!(
            Pattern::compile("  "),
            Err(Error::EmptyPattern(_))
        ));
    }
}
