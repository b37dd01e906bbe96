//! Multi-statement splitting for drivers that execute one statement at a
//! time.
//!
//! Splitting goes through the tokenizer so that `;` inside string literals,
//! quoted identifiers and comments never breaks a statement. The executable
//! text of each statement is trimmed and loses its trailing `;`, since
//! one-statement drivers reject the separator; the token tree keeps the
//! exact original spans. The named parameters (`:name` placeholders)
//! occurring in a statement are extracted with a plain regex over its text,
//! so callers can re-bind only the parameters that statement actually uses.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::tokenizer::tokenize;

static PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":[A-Za-z_][A-Za-z0-9_]*").expect("valid placeholder regex"));

/// One executable statement sliced out of a multi-statement string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStatement {
    /// Executable text of the statement: trimmed, trailing `;` dropped.
    pub sql: String,
    /// Named parameters referenced by this statement, in first-use order.
    pub parameters: Vec<String>,
}

/// Split `sql` into individually executable statements. Zero statements
/// (empty input, separators and comments only) is a valid empty result.
pub fn split_statements(sql: &str) -> Result<Vec<SplitStatement>> {
    let tree = tokenize(sql)?;
    let statements: Vec<SplitStatement> = tree
        .children(tree.root())
        .iter()
        .map(|&stmt| {
            let text = tree.source_text(stmt);
            let sql = text.strip_suffix(';').unwrap_or(text).trim();
            SplitStatement {
                sql: sql.to_string(),
                parameters: extract_parameters(sql),
            }
        })
        .collect();
    debug!(count = statements.len(), "split statements");
    Ok(statements)
}

/// `:name` placeholders in `text`, deduplicated in order of first use.
fn extract_parameters(text: &str) -> Vec<String> {
    PARAM_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn splits_into_executable_statements() {
        let split = split_statements(
            "CREATE TABLE t (a INT);\nINSERT INTO t (a) VALUES (:a);\nSELECT * FROM t",
        )
        .unwrap();
        assert_eq!(split.len(), 3);
        assert_eq!(split[0].sql, "CREATE TABLE t (a INT)");
        assert_eq!(split[1].sql, "INSERT INTO t (a) VALUES (:a)");
        assert_eq!(split[2].sql, "SELECT * FROM t");
    }

    #[rstest]
    #[case("SELECT 1; SELECT 2", "SELECT 1")]
    #[case("SELECT 1 ;", "SELECT 1")]
    #[case("SELECT 1", "SELECT 1")]
    fn statement_text_excludes_terminator(#[case] sql: &str, #[case] first: &str) {
        let split = split_statements(sql).unwrap();
        assert_eq!(split[0].sql, first);
    }

    #[test]
    fn parameters_are_scoped_per_statement() {
        let split = split_statements(
            "UPDATE t SET a = :a WHERE id = :id; DELETE FROM t WHERE id = :id",
        )
        .unwrap();
        assert_eq!(split[0].parameters, vec![":a", ":id"]);
        assert_eq!(split[1].parameters, vec![":id"]);
    }

    #[test]
    fn duplicate_parameters_collapse_in_order() {
        let split = split_statements("SELECT :b, :a, :b, :a").unwrap();
        assert_eq!(split[0].parameters, vec![":b", ":a"]);
    }

    #[test]
    fn semicolons_in_literals_do_not_split() {
        let split = split_statements("SELECT 'a;b'; SELECT \"c;d\" -- ;\n").unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].sql, "SELECT 'a;b'");
    }

    #[rstest]
    #[case("")]
    #[case(";;;")]
    #[case("  -- nothing here\n")]
    fn empty_inputs_yield_no_statements(#[case] sql: &str) {
        assert!(split_statements(sql).unwrap().is_empty());
    }
}
