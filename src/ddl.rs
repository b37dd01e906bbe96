//! CHECK-constraint extraction from `CREATE TABLE` text.
//!
//! SQLite reports table DDL verbatim (`sqlite_master.sql`), so constraint
//! reflection has to read it back out of the text. The scan tokenizes the
//! statement, locates the table body with `any CREATE any TABLE any()`,
//! walks every `any CHECK()` span inside it (resuming each search after the
//! previous match), and recovers an explicit name from a preceding
//! `CONSTRAINT any` pair when present.

use tracing::debug;

use crate::error::Result;
use crate::pattern::Pattern;
use crate::tokenizer::tokenize;

/// One `CHECK (...)` clause found in a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    /// Explicit `CONSTRAINT <name>` if one precedes the clause.
    pub name: Option<String>,
    /// Exact text of the check expression, parentheses included.
    pub expression: String,
}

/// Scan `create_sql` for CHECK constraints. Statements without a table body
/// or without checks yield an empty result, not an error.
pub fn find_check_constraints(create_sql: &str) -> Result<Vec<CheckConstraint>> {
    let tree = tokenize(create_sql)?;
    let Some(statement) = tree.child(tree.root(), 0) else {
        return Ok(Vec::new());
    };

    let table = Pattern::compile("any CREATE any TABLE any()")?;
    let Some(span) = table.match_at(&tree, statement, 0) else {
        return Ok(Vec::new());
    };
    let Some(body) = tree.child(statement, span.last as isize) else {
        return Ok(Vec::new());
    };

    let check = Pattern::compile("any CHECK()")?;
    let constraint = Pattern::compile("CONSTRAINT any")?;

    let mut constraints = Vec::new();
    let mut offset = 0;
    while let Some(found) = check.match_at(&tree, body, offset) {
        let Some(paren) = tree.child(body, found.last as isize) else {
            break;
        };
        // `CONSTRAINT <name>` sits exactly two children before the CHECK
        // keyword when the constraint is named.
        let name = found
            .first
            .checked_sub(2)
            .filter(|&at| constraint.match_at(&tree, body, at).is_some())
            .and_then(|_| tree.child(body, (found.first - 1) as isize))
            .and_then(|id| tree.content(id))
            .map(str::to_string);

        constraints.push(CheckConstraint {
            name,
            expression: tree.source_text(paren).to_string(),
        });
        offset = found.last + 1;
    }
    debug!(count = constraints.len(), "check constraints found");
    Ok(constraints)
}
