use std::fmt::Write as _;

use crate::types::Dialect;

/// Generate placeholder groups for a `VALUES` clause (or equivalent).
///
/// `fields` is the number of markers per parenthesized group, `rows` the
/// number of groups. Numbered dialects start counting at 1; numbering is per
/// call and does not carry across calls (see [`placeholders_from`] to thread
/// a running offset).
///
/// ```rust
/// use sql_records::prelude::*;
///
/// assert_eq!(placeholders(3, 2, Dialect::MySql), "(?,?,?),(?,?,?)");
/// assert_eq!(placeholders(2, 2, Dialect::Postgres), "($1,$2),($3,$4)");
/// ```
#[must_use]
pub fn placeholders(fields: usize, rows: usize, dialect: Dialect) -> String {
    placeholders_from(fields, rows, 0, dialect)
}

/// [`placeholders`] with a starting offset for numbered dialects.
///
/// `start` is the count of markers already consumed earlier in the statement,
/// so the first marker emitted here is `$start+1`. The offset is ignored for
/// bare-marker dialects. Zero `fields` or `rows` yields an empty string.
#[must_use]
pub fn placeholders_from(fields: usize, rows: usize, start: usize, dialect: Dialect) -> String {
    if fields == 0 || rows == 0 {
        return String::new();
    }

    match dialect {
        Dialect::MySql => {
            let group = format!("({})", vec!["?"; fields].join(","));
            vec![group; rows].join(",")
        }
        Dialect::Postgres => {
            let mut out = String::new();
            let mut counter = start;
            for row in 0..rows {
                if row > 0 {
                    out.push(',');
                }
                out.push('(');
                for field in 0..fields {
                    if field > 0 {
                        out.push(',');
                    }
                    counter += 1;
                    let _ = write!(out, "${counter}");
                }
                out.push(')');
            }
            out
        }
    }
}
