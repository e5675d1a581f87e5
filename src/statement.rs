use std::fmt::Write as _;

use crate::error::SqlRecordsError;
use crate::placeholder::{placeholders, placeholders_from};
use crate::types::{Dialect, RowValues};

/// Build a single- or multi-row INSERT statement.
///
/// ```rust
/// use sql_records::prelude::*;
///
/// let stmt = insert_into("store", &["id", "product"], 2, Dialect::Postgres)?;
/// assert_eq!(stmt, "INSERT INTO store(id, product) VALUES ($1,$2),($3,$4)");
/// # Ok::<(), SqlRecordsError>(())
/// ```
///
/// # Errors
///
/// Returns `ConfigError` if the table name or column list is empty.
pub fn insert_into(
    table: &str,
    columns: &[&str],
    rows: usize,
    dialect: Dialect,
) -> Result<String, SqlRecordsError> {
    if table.is_empty() {
        return Err(SqlRecordsError::ConfigError("table name is empty".into()));
    }
    if columns.is_empty() {
        return Err(SqlRecordsError::ConfigError("no columns specified".into()));
    }

    Ok(format!(
        "INSERT INTO {}({}) VALUES {}",
        table,
        columns.join(", "),
        placeholders(columns.len(), rows, dialect)
    ))
}

/// Options for [`bulk_update`].
#[derive(Debug, Clone, Default)]
pub struct BulkUpdateOptions<'a> {
    /// Target table.
    pub table: &'a str,
    /// Columns to update, in emission order.
    pub columns: &'a [&'a str],
    /// Primary-key column the CASE branches and IN clause key on.
    pub primary_key: &'a str,
    /// Optional trailing statement text (e.g. `RETURNING id`).
    pub suffix: Option<&'a str>,
}

/// Build a CASE-based single-statement multi-row UPDATE, returning the
/// statement text and the bound arguments in placeholder order.
///
/// `update_data` pairs each primary-key value with the update values for
/// every column in [`BulkUpdateOptions::columns`], in that order. A
/// [`RowValues::Null`] update value emits `WHEN <pk> = <ph> THEN NULL`,
/// consuming one placeholder (the key) instead of two. The numbered dialect
/// counts every placeholder in the statement globally, the trailing IN clause
/// included.
///
/// Each values slice must be exactly as long as the column list; this is a
/// caller contract, debug-asserted only.
///
/// # Errors
///
/// Returns `ConfigError` if the table name, column list, primary-key column,
/// or update-data set is empty.
pub fn bulk_update(
    options: &BulkUpdateOptions<'_>,
    update_data: &[(RowValues, Vec<RowValues>)],
    dialect: Dialect,
) -> Result<(String, Vec<RowValues>), SqlRecordsError> {
    if options.table.is_empty() {
        return Err(SqlRecordsError::ConfigError("table name is empty".into()));
    }
    if options.columns.is_empty() {
        return Err(SqlRecordsError::ConfigError("no columns specified".into()));
    }
    if options.primary_key.is_empty() {
        return Err(SqlRecordsError::ConfigError(
            "no primary key column specified".into(),
        ));
    }
    if update_data.is_empty() {
        return Err(SqlRecordsError::ConfigError("no update keys supplied".into()));
    }

    let mut args = Vec::new();
    let mut stmt = format!("UPDATE {} SET\n", options.table);
    // Markers consumed so far; drives global numbering for Dialect::Postgres.
    let mut marker = 0usize;

    for (j, column) in options.columns.iter().enumerate() {
        if j > 0 {
            stmt.push_str(",\n");
        }
        let _ = write!(stmt, "{column} = CASE");

        for (key, values) in update_data {
            debug_assert_eq!(
                values.len(),
                options.columns.len(),
                "update values must align with the column list"
            );
            let value = &values[j];

            if value.is_null() {
                match dialect {
                    Dialect::Postgres => {
                        marker += 1;
                        let _ = write!(stmt, "\nWHEN {} = ${} THEN NULL", options.primary_key, marker);
                    }
                    Dialect::MySql => {
                        let _ = write!(stmt, "\nWHEN {} = ? THEN NULL", options.primary_key);
                    }
                }
                args.push(key.clone());
            } else {
                match dialect {
                    Dialect::Postgres => {
                        let _ = write!(
                            stmt,
                            "\nWHEN {} = ${} THEN ${}",
                            options.primary_key,
                            marker + 1,
                            marker + 2
                        );
                        marker += 2;
                    }
                    Dialect::MySql => {
                        let _ = write!(stmt, "\nWHEN {} = ? THEN ?", options.primary_key);
                    }
                }
                args.push(key.clone());
                args.push(value.clone());
            }
        }

        stmt.push_str("\nEND");
    }

    let in_clause = placeholders_from(update_data.len(), 1, marker, dialect);
    let _ = write!(stmt, "\nWHERE {} IN {}", options.primary_key, in_clause);
    if let Some(suffix) = options.suffix {
        let _ = write!(stmt, " {suffix}");
    }

    for (key, _) in update_data {
        args.push(key.clone());
    }

    Ok((stmt, args))
}
