//! SQL-text tokenizer producing an offset-accurate token tree, plus a
//! wildcard pattern matcher over that tree.
//!
//! The tokenizer consumes a SQL string in one left-to-right pass and builds
//! a single `Code` root whose children are `Statement` tokens, with nested
//! `Parenthesis` groups and leaf tokens for keywords, operators, quoted
//! identifiers, string literals and plain words. Every token carries
//! character offsets into the original source, so the exact text of any
//! subtree can be sliced back out.
//!
//! Modules:
//! - `kind`      : token classification (collections vs leaves).
//! - `tree`      : arena-backed token tree with signed child indexing.
//! - `cursor`    : scan cursor with a memoizing substring cache.
//! - `keyword`   : fixed SQLite keyword table.
//! - `dialect`   : pluggable classifier seam + the SQLite rules.
//! - `tokenizer` : the scanning loop.
//! - `pattern`   : greedy `any`-wildcard structural matching.
//! - `splitter`  : multi-statement splitting with per-statement `:name`
//!   parameter extraction.
//! - `ddl`       : CHECK-constraint scanning of `CREATE TABLE` text.
//!
//! Tokenization is lenient by design: it never validates SQL semantics, and
//! malformed input (unterminated literals, unbalanced parens) still yields a
//! best-effort tree. The only error is an internal classifier contract
//! violation ([`Error::InvalidAdvance`]).
//!
//! Example:
//! ```rust
//! use sqltok::prelude::*;
//!
//! let tree = tokenize("SELECT 1; SELECT 2").unwrap();
//! let statements = tree.children(tree.root());
//! assert_eq!(statements.len(), 2);
//! // The tree keeps exact spans, separator included; the splitter yields
//! // the executable text without it.
//! assert_eq!(tree.source_text(statements[0]), "SELECT 1;");
//! let split = split_statements("SELECT 1; SELECT 2").unwrap();
//! assert_eq!(split[0].sql, "SELECT 1");
//! ```

pub mod cursor;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod keyword;
pub mod kind;
pub mod pattern;
pub mod splitter;
pub mod tokenizer;
pub mod tree;

pub use ddl::{CheckConstraint, find_check_constraints};
pub use dialect::{ClassifierMatch, Dialect, SqliteDialect};
pub use error::{Error, Result};
pub use kind::TokenKind;
pub use pattern::{MatchSpan, Pattern};
pub use splitter::{SplitStatement, split_statements};
pub use tokenizer::{Tokenizer, tokenize};
pub use tree::{TokenId, TokenTree};

/// Convenience prelude re-exporting the most commonly used items.
pub mod prelude {
    pub use super::{
        CheckConstraint, MatchSpan, Pattern, SplitStatement, TokenId, TokenKind, TokenTree,
        find_check_constraints, split_statements, tokenize,
    };
}
