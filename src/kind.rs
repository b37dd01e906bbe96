//! Token classification for the tree-building tokenizer.
//!
//! Kinds split into two families: *collections* (`Code`, `Statement`,
//! `Parenthesis`), which own an ordered child list and derive their offsets
//! from it, and *leaves*, which carry their own content and span. The
//! tokenizer only ever nests collections; leaves never have children.

/// Classification of a node in the token tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TokenKind {
    /// Root of a tokenized source string; its children are statements.
    Code,
    /// One semicolon-terminated statement.
    Statement,
    /// A `(...)` group. The delimiter operators are its first and last
    /// children, so its span includes both parentheses.
    Parenthesis,
    /// Recognized SQL keyword; content is the canonical upper-case form.
    Keyword,
    /// Operator or punctuation (`<=`, `,`, `;`, ...).
    Operator,
    /// Quoted identifier; content has the quote escaping collapsed.
    Identifier,
    /// Single-quoted string literal; content has `''` collapsed to `'`.
    StringLiteral,
    /// Any other unquoted word: bare identifiers, numbers, placeholders.
    Plain,
}

impl TokenKind {
    /// True for kinds that own children.
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            TokenKind::Code | TokenKind::Statement | TokenKind::Parenthesis
        )
    }

    /// True for kinds that carry their own content and span.
    pub const fn is_leaf(self) -> bool {
        !self.is_collection()
    }
}
