//! Single-pass SQL tokenizer building a [`TokenTree`].
//!
//! The scan walks the source left to right exactly once. At each position
//! the dialect classifiers are consulted in priority order: whitespace and
//! comments (no token), quoted identifiers and string literals, operators
//! (longest match wins, with `(`/`)`/`;` handled structurally), and finally
//! the current character joins the pending word buffer. Flushing the buffer
//! classifies it against the keyword table or emits a `Plain` token.
//!
//! Statements are children of the `Code` root; `;` closes the current
//! statement (a `;` on an empty statement is silently dropped, so redundant
//! separators collapse) and a trailing childless statement is removed after
//! the scan. Parenthesis groups own their delimiter operators, so a group's
//! span includes both parens.
//!
//! The tokenizer holds no per-call state between invocations; concurrent
//! calls on separate inputs are independent.

use tracing::trace;

use crate::cursor::SourceCursor;
use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{Error, Result};
use crate::kind::TokenKind;
use crate::tree::{TokenId, TokenTree};

/// Tokenize `sql` with the built-in SQLite dialect.
pub fn tokenize(sql: &str) -> Result<TokenTree> {
    Tokenizer::new(SqliteDialect).tokenize(sql)
}

/// Tree-building tokenizer parameterized over a [`Dialect`].
#[derive(Debug)]
pub struct Tokenizer<D> {
    dialect: D,
}

/// Transient per-call scan state.
struct Scan {
    tree: TokenTree,
    cursor: SourceCursor,
    /// Stack of open collections; the top is the insertion point.
    stack: Vec<TokenId>,
    /// Pending unquoted word characters not yet classified.
    buffer: String,
}

impl<D: Dialect> Tokenizer<D> {
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Tokenize `sql` into a single `Code` root whose children are the
    /// statements found in the text.
    pub fn tokenize(&self, sql: &str) -> Result<TokenTree> {
        let mut scan = Scan::new(sql);

        while !scan.cursor.is_at_end() {
            if let Some(m) = self
                .dialect
                .match_whitespace(&mut scan.cursor)
                .or_else(|| self.dialect.match_comment(&mut scan.cursor))
            {
                self.flush_word(&mut scan);
                scan.advance(m.length)?;
                continue;
            }

            if let Some(m) = self.dialect.match_identifier(&mut scan.cursor) {
                self.flush_word(&mut scan);
                scan.emit_leaf(TokenKind::Identifier, m.content, m.length)?;
                continue;
            }

            if let Some(m) = self.dialect.match_string_literal(&mut scan.cursor) {
                self.flush_word(&mut scan);
                scan.emit_leaf(TokenKind::StringLiteral, m.content, m.length)?;
                continue;
            }

            if let Some(m) = self.dialect.match_operator(&mut scan.cursor) {
                self.flush_word(&mut scan);
                let text = m.content.clone().unwrap_or_default();
                match text.as_str() {
                    "(" => scan.open_parenthesis(m.length)?,
                    ")" => scan.close_parenthesis(m.length)?,
                    ";" => scan.end_statement(m.length)?,
                    _ => scan.emit_leaf(TokenKind::Operator, m.content, m.length)?,
                }
                continue;
            }

            // Not classifiable here: accumulate into the pending word.
            if let Some(c) = scan.cursor.peek() {
                scan.buffer.push(c);
            }
            scan.cursor.advance(1);
        }

        self.flush_word(&mut scan);
        scan.finish()
    }

    /// Classify and emit the pending word, if any. Keywords are matched
    /// case-insensitively and stored with canonical content; anything else
    /// becomes a `Plain` token with its raw text.
    fn flush_word(&self, scan: &mut Scan) {
        if scan.buffer.is_empty() {
            return;
        }
        let word = std::mem::take(&mut scan.buffer);
        let char_len = word.chars().count();
        let end = scan.cursor.pos();
        let start = end - char_len;
        let (kind, content) = match self.dialect.keyword(&word) {
            Some(canonical) => (TokenKind::Keyword, canonical),
            None => (TokenKind::Plain, word),
        };
        let token = scan.tree.new_leaf(kind, Some(content), start, end);
        let top = scan.top();
        scan.tree.append_child(top, token);
    }
}

impl Scan {
    fn new(sql: &str) -> Self {
        let mut tree = TokenTree::new(sql.to_string());
        let root = tree.root();
        let statement = tree.new_collection(TokenKind::Statement);
        tree.append_child(root, statement);
        Self {
            tree,
            cursor: SourceCursor::new(sql),
            stack: vec![root, statement],
            buffer: String::new(),
        }
    }

    fn top(&self) -> TokenId {
        *self.stack.last().expect("scan stack holds at least the root")
    }

    /// Advance past a classifier match, rejecting zero-length matches which
    /// would stall the scan.
    fn advance(&mut self, length: usize) -> Result {
        if length == 0 {
            return Err(Error::InvalidAdvance {
                offset: self.cursor.pos(),
            });
        }
        self.cursor.advance(length);
        Ok(())
    }

    /// Emit a leaf spanning the next `length` characters into the current
    /// collection, then advance past it.
    fn emit_leaf(&mut self, kind: TokenKind, content: Option<String>, length: usize) -> Result {
        let start = self.cursor.pos();
        self.advance(length)?;
        let token = self.tree.new_leaf(kind, content, start, start + length);
        let top = self.top();
        self.tree.append_child(top, token);
        Ok(())
    }

    /// `(`: open a parenthesis group in the current collection, descend into
    /// it, and emit the delimiter as its first child.
    fn open_parenthesis(&mut self, length: usize) -> Result {
        let group = self.tree.new_collection(TokenKind::Parenthesis);
        let top = self.top();
        self.tree.append_child(top, group);
        self.stack.push(group);
        self.emit_leaf(TokenKind::Operator, Some("(".into()), length)
    }

    /// `)`: emit the delimiter as the group's last child and pop back to the
    /// enclosing collection. A stray `)` with no open group stays where it
    /// is, best-effort.
    fn close_parenthesis(&mut self, length: usize) -> Result {
        self.emit_leaf(TokenKind::Operator, Some(")".into()), length)?;
        if self.tree.kind(self.top()) == TokenKind::Parenthesis {
            self.stack.pop();
        }
        Ok(())
    }

    /// `;`: close the current statement and open a fresh one in the root.
    /// A separator on a childless statement is dropped, so `;;` does not
    /// produce empty statements.
    fn end_statement(&mut self, length: usize) -> Result {
        if !self.tree.has_children(self.top()) {
            return self.advance(length);
        }
        self.emit_leaf(TokenKind::Operator, Some(";".into()), length)?;
        trace!(offset = self.cursor.pos(), "statement boundary");
        let root = self.tree.root();
        self.stack.truncate(1);
        let statement = self.tree.new_collection(TokenKind::Statement);
        self.tree.append_child(root, statement);
        self.stack.push(statement);
        Ok(())
    }

    /// Post-scan cleanup: drop a trailing childless statement (input ending
    /// in `;` plus trivia) and pin the root span to the whole source.
    fn finish(mut self) -> Result<TokenTree> {
        let root = self.tree.root();
        if let Some(last) = self.tree.child(root, -1) {
            if self.tree.kind(last) == TokenKind::Statement && !self.tree.has_children(last) {
                self.tree.remove_child(root, -1);
            }
        }
        self.tree.finalize_root_bounds();
        trace!(statements = self.tree.child_count(root), "tokenized");
        Ok(self.tree)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn statements(tree: &TokenTree) -> Vec<TokenId> {
        tree.children(tree.root()).to_vec()
    }

    /// Flatten one collection level into (kind, content) pairs.
    fn parts(tree: &TokenTree, id: TokenId) -> Vec<(TokenKind, String)> {
        tree.children(id)
            .iter()
            .map(|&c| {
                (
                    tree.kind(c),
                    tree.content(c).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[rstest]
    #[case("SELECT 1", 1)]
    #[case("SELECT 1; SELECT 2;", 2)]
    #[case("SELECT 1;;", 1)]
    #[case(";;;", 0)]
    #[case("", 0)]
    #[case("  -- only a comment\n", 0)]
    fn statement_counts(#[case] sql: &str, #[case] count: usize) {
        let tree = tokenize(sql).unwrap();
        assert_eq!(statements(&tree).len(), count, "{sql:?}");
    }

    #[test]
    fn root_round_trips_source() {
        for sql in [
            "SELECT 1",
            "  SELECT 'héllo' ; \n",
            "CREATE TABLE t (a INT CHECK (a > 0))",
            "-- leading\nSELECT 1;",
        ] {
            let tree = tokenize(sql).unwrap();
            assert_eq!(tree.source_text(tree.root()), sql);
        }
    }

    #[test]
    fn statement_text_includes_terminator() {
        let tree = tokenize("SELECT 1; SELECT 2").unwrap();
        let stmts = statements(&tree);
        assert_eq!(tree.source_text(stmts[0]), "SELECT 1;");
        assert_eq!(tree.source_text(stmts[1]), "SELECT 2");
    }

    #[test]
    fn parenthesis_nesting_two_levels() {
        let tree = tokenize("SELECT (1 + (2 * 3))").unwrap();
        let stmt = statements(&tree)[0];
        let outer = tree
            .children(stmt)
            .iter()
            .copied()
            .find(|&c| tree.kind(c) == TokenKind::Parenthesis)
            .unwrap();
        assert_eq!(tree.source_text(outer), "(1 + (2 * 3))");

        let inner = tree
            .children(outer)
            .iter()
            .copied()
            .find(|&c| tree.kind(c) == TokenKind::Parenthesis)
            .unwrap();
        assert_eq!(tree.source_text(inner), "(2 * 3)");
        // Both groups carry their delimiters as first/last children.
        for group in [outer, inner] {
            assert_eq!(tree.content(tree.child(group, 0).unwrap()), Some("("));
            assert_eq!(tree.content(tree.child(group, -1).unwrap()), Some(")"));
        }
    }

    #[test]
    fn identifier_unescaping() {
        let tree = tokenize("SELECT `a``b`").unwrap();
        let stmt = statements(&tree)[0];
        let token = tree.child(stmt, -1).unwrap();
        assert_eq!(tree.kind(token), TokenKind::Identifier);
        assert_eq!(tree.content(token), Some("a`b"));
        assert_eq!(tree.source_text(token), "`a``b`");
    }

    #[test]
    fn string_literal_unescaping() {
        let tree = tokenize("SELECT 'it''s'").unwrap();
        let stmt = statements(&tree)[0];
        let token = tree.child(stmt, -1).unwrap();
        assert_eq!(tree.kind(token), TokenKind::StringLiteral);
        assert_eq!(tree.content(token), Some("it's"));
    }

    #[test]
    fn longest_operator_wins() {
        let tree = tokenize("a<=b").unwrap();
        let stmt = statements(&tree)[0];
        assert_eq!(
            parts(&tree, stmt),
            vec![
                (TokenKind::Plain, "a".to_string()),
                (TokenKind::Operator, "<=".to_string()),
                (TokenKind::Plain, "b".to_string()),
            ]
        );
    }

    #[rstest]
    #[case("select")]
    #[case("Select")]
    #[case("SELECT")]
    fn keywords_canonicalized(#[case] word: &str) {
        let tree = tokenize(word).unwrap();
        let stmt = statements(&tree)[0];
        let token = tree.child(stmt, 0).unwrap();
        assert_eq!(tree.kind(token), TokenKind::Keyword);
        assert_eq!(tree.content(token), Some("SELECT"));
    }

    #[test]
    fn comments_produce_no_tokens() {
        let tree = tokenize("SELECT /* hidden */ 1 -- tail").unwrap();
        let stmt = statements(&tree)[0];
        assert_eq!(
            parts(&tree, stmt),
            vec![
                (TokenKind::Keyword, "SELECT".to_string()),
                (TokenKind::Plain, "1".to_string()),
            ]
        );
    }

    #[test]
    fn word_offsets_are_char_based() {
        let tree = tokenize("wörter = 1").unwrap();
        let stmt = statements(&tree)[0];
        let token = tree.child(stmt, 0).unwrap();
        assert_eq!(tree.source_text(token), "wörter");
        assert_eq!(tree.bounds(token), Some((0, 6)));
    }

    #[test]
    fn unbalanced_input_is_best_effort() {
        // Missing `)` and a stray one: no panics, one statement each.
        assert_eq!(statements(&tokenize("SELECT (1").unwrap()).len(), 1);
        assert_eq!(statements(&tokenize("SELECT 1)").unwrap()).len(), 1);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Tokenization never panics and the root always reproduces the
            /// input text exactly.
            #[test]
            fn round_trip(sql in ".{0,200}") {
                let tree = tokenize(&sql).unwrap();
                prop_assert_eq!(tree.source_text(tree.root()), sql.as_str());
            }

            /// Statement count never exceeds the number of separators plus
            /// one.
            #[test]
            fn statement_count_bounded(sql in "[a-z;() ]{0,80}") {
                let tree = tokenize(&sql).unwrap();
                let semis = sql.matches(';').count();
                prop_assert!(tree.child_count(tree.root()) <= semis + 1);
            }
        }
    }
}
