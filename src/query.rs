use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::assemble::{
    assemble_records, assemble_rows, assemble_rows_single, assemble_single,
};
use crate::decode::DecoderConfig;
use crate::error::SqlRecordsError;
use crate::executor::Executor;
use crate::record::{Record, validate_shape};
use crate::row::Row;
use crate::types::{ExecutionSummary, RowValues};

/// Per-call options for the typed query path.
///
/// Everything else is chosen through the type system: the record shape is
/// the `T` of [`query`], single-result is the `*_one` function family, and
/// raw mode is the `query_raw*` family.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Coercion rules handed to the row decoder.
    pub decoder: DecoderConfig,
    /// Run each record's post-unmarshal hook on its own task instead of
    /// strictly in row order.
    pub concurrent_post_unmarshal: bool,
}

impl QueryOptions {
    #[must_use]
    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn with_concurrent_post_unmarshal(mut self, on: bool) -> Self {
        self.concurrent_post_unmarshal = on;
        self
    }
}

/// A typed result collection plus the first post-unmarshal failure, if any.
///
/// Hook failures do not discard records: every decoded record is present in
/// `records` (in row order) even when its hook failed, and the caller
/// inspects both fields. This is deliberately different from a decode
/// failure, which discards the whole collection.
#[derive(Debug)]
pub struct QueryOutput<T> {
    /// Decoded records in row-arrival order.
    pub records: Vec<T>,
    /// First hook failure observed, if any.
    pub hook_error: Option<SqlRecordsError>,
}

impl<T> QueryOutput<T> {
    /// Treat a hook failure as fatal, collapsing into a plain `Result`.
    ///
    /// # Errors
    ///
    /// Returns the stored hook error, dropping the records.
    pub fn ok(self) -> Result<Vec<T>, SqlRecordsError> {
        match self.hook_error {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }

    /// The records, ignoring any hook failure.
    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

/// Arguments for [`execute`]: a flat list for a single-row statement, or a
/// nested list for a multi-row batch statement (flattened row-major before
/// binding). The statement text must already contain the matching number of
/// placeholders, typically from
/// [`insert_into`](crate::statement::insert_into).
#[derive(Debug, Clone)]
pub enum ExecArgs {
    /// One row's worth of bind parameters.
    Single(Vec<RowValues>),
    /// Multiple rows of bind parameters, flattened row-major.
    Batch(Vec<Vec<RowValues>>),
}

impl ExecArgs {
    /// Flatten into the bind order the statement's placeholders expect.
    #[must_use]
    pub fn flatten(self) -> Vec<RowValues> {
        match self {
            ExecArgs::Single(params) => params,
            ExecArgs::Batch(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

impl From<Vec<RowValues>> for ExecArgs {
    fn from(params: Vec<RowValues>) -> Self {
        ExecArgs::Single(params)
    }
}

impl From<Vec<Vec<RowValues>>> for ExecArgs {
    fn from(rows: Vec<Vec<RowValues>>) -> Self {
        ExecArgs::Batch(rows)
    }
}

impl From<&[RowValues]> for ExecArgs {
    fn from(params: &[RowValues]) -> Self {
        ExecArgs::Single(params.to_vec())
    }
}

/// Run a read statement and decode every row into `T`.
///
/// Zero rows yield an empty collection, not an error. See [`QueryOutput`]
/// for how hook failures surface.
///
/// # Errors
///
/// `ConfigError` for an invalid shape (before any I/O), `ExecutionError`
/// when the executor fails, `DecodeError` when a row cannot be coerced
/// (already-decoded rows are discarded).
pub async fn query<T, X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
    options: &QueryOptions,
) -> Result<QueryOutput<T>, SqlRecordsError>
where
    T: Record,
    X: Executor + ?Sized,
{
    validate_shape::<T>()?;
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_records(cancel, cursor, options).await
}

/// Run a read statement and decode at most one record.
///
/// The first row is decoded (and hook-processed) and the cursor released
/// without consuming the rest; zero rows yield `None`, not an error.
///
/// # Errors
///
/// As [`query`]; additionally a hook failure on the single record is
/// returned as `HookError`.
pub async fn query_one<T, X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
    options: &QueryOptions,
) -> Result<Option<T>, SqlRecordsError>
where
    T: Record,
    X: Executor + ?Sized,
{
    validate_shape::<T>()?;
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_single(cancel, cursor, options).await
}

/// Run a read statement without a record shape; rows come back as ordered
/// column→value mappings with driver bytes normalized to their native text
/// form.
///
/// # Errors
///
/// `ExecutionError` when the executor fails.
pub async fn query_rows<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
) -> Result<Vec<Row>, SqlRecordsError>
where
    X: Executor + ?Sized,
{
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_rows(cursor, false).await
}

/// Single-row variant of [`query_rows`].
///
/// # Errors
///
/// `ExecutionError` when the executor fails.
pub async fn query_rows_one<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
) -> Result<Option<Row>, SqlRecordsError>
where
    X: Executor + ?Sized,
{
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_rows_single(cursor, false).await
}

/// Like [`query_rows`] but values are returned exactly as the driver
/// delivered them, bypassing all decoding.
///
/// # Errors
///
/// `ExecutionError` when the executor fails.
pub async fn query_raw<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
) -> Result<Vec<Row>, SqlRecordsError>
where
    X: Executor + ?Sized,
{
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_rows(cursor, true).await
}

/// Single-row variant of [`query_raw`].
///
/// # Errors
///
/// `ExecutionError` when the executor fails.
pub async fn query_raw_one<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
) -> Result<Option<Row>, SqlRecordsError>
where
    X: Executor + ?Sized,
{
    let cursor = executor
        .query(cancel, sql, params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    assemble_rows_single(cursor, true).await
}

/// Run a write statement and return the executor's summary.
///
/// No retries, no connection management, no statement caching — the call is
/// delegated to the executor as-is.
///
/// # Errors
///
/// `ExecutionError` wrapping the executor's native error unchanged.
pub async fn execute<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    args: impl Into<ExecArgs>,
) -> Result<ExecutionSummary, SqlRecordsError>
where
    X: Executor + ?Sized,
{
    let params = args.into().flatten();
    let summary = executor
        .execute(cancel, sql, &params)
        .await
        .map_err(SqlRecordsError::ExecutionError)?;
    debug!(rows_affected = summary.rows_affected, "statement executed");
    Ok(summary)
}

/// [`query`] for call sites that treat failure as a programming error:
/// any error — hook failures included — aborts with a panic.
pub async fn must_query<T, X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    params: &[RowValues],
    options: &QueryOptions,
) -> Vec<T>
where
    T: Record,
    X: Executor + ?Sized,
{
    match query(cancel, executor, sql, params, options).await {
        Ok(output) => match output.ok() {
            Ok(records) => records,
            Err(err) => panic!("query must succeed: {err}"),
        },
        Err(err) => panic!("query must succeed: {err}"),
    }
}

/// [`execute`] for call sites that treat failure as a programming error.
pub async fn must_execute<X>(
    cancel: &CancellationToken,
    executor: &X,
    sql: &str,
    args: impl Into<ExecArgs>,
) -> ExecutionSummary
where
    X: Executor + ?Sized,
{
    match execute(cancel, executor, sql, args).await {
        Ok(summary) => summary,
        Err(err) => panic!("execute must succeed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_args_flatten_row_major() {
        let args: ExecArgs = vec![
            vec![RowValues::Int(1), RowValues::Text("a".into())],
            vec![RowValues::Int(2), RowValues::Text("b".into())],
        ]
        .into();
        assert_eq!(
            args.flatten(),
            vec![
                RowValues::Int(1),
                RowValues::Text("a".into()),
                RowValues::Int(2),
                RowValues::Text("b".into()),
            ]
        );
    }

    #[test]
    fn flat_args_pass_through() {
        let args: ExecArgs = vec![RowValues::Int(7)].into();
        assert_eq!(args.flatten(), vec![RowValues::Int(7)]);
    }
}
