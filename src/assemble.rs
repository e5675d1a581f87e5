use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::decode::{FieldMap, decode_record};
use crate::error::SqlRecordsError;
use crate::executor::Cursor;
use crate::query::{QueryOptions, QueryOutput};
use crate::record::Record;
use crate::row::Row;
use crate::types::RowValues;

/// Drain a cursor into a typed record collection, running the post-unmarshal
/// hook per the configured mode.
pub(crate) async fn assemble_records<T: Record>(
    cancel: &CancellationToken,
    cursor: Box<dyn Cursor>,
    options: &QueryOptions,
) -> Result<QueryOutput<T>, SqlRecordsError> {
    if T::POST_UNMARSHAL && options.concurrent_post_unmarshal {
        assemble_concurrent(cancel, cursor, options).await
    } else {
        assemble_sequential(cancel, cursor, options).await
    }
}

/// Hooks run strictly in row order, each completing before the next row's
/// hook begins. A hook failure stops consumption; the records decoded so far
/// (the failed one included) ride alongside the error.
async fn assemble_sequential<T: Record>(
    cancel: &CancellationToken,
    mut cursor: Box<dyn Cursor>,
    options: &QueryOptions,
) -> Result<QueryOutput<T>, SqlRecordsError> {
    let columns = cursor.columns();
    let map = FieldMap::resolve(T::columns(), &columns);

    let mut records = Vec::new();
    let mut hook_error = None;
    let mut row_index = 0usize;

    while let Some(values) = cursor
        .next_row()
        .await
        .map_err(SqlRecordsError::ExecutionError)?
    {
        let mut record: T = decode_record(&values, &map, &options.decoder)?;
        if T::POST_UNMARSHAL {
            let outcome = match record.post_unmarshal(cancel.clone(), row_index, row_index + 1) {
                Some(hook) => hook.await,
                None => Ok(()),
            };
            if let Err(err) = outcome {
                records.push(record);
                hook_error = Some(SqlRecordsError::HookError(err));
                break;
            }
        }
        records.push(record);
        row_index += 1;
    }

    debug!(rows = records.len(), "assembled record collection");
    Ok(QueryOutput {
        records,
        hook_error,
    })
}

/// Each row's hook is spawned onto its own task as soon as the row decodes;
/// the join waits for every task, surfaces the first error observed, and
/// keeps all records regardless of their hook's outcome. In-flight hooks are
/// never cancelled.
async fn assemble_concurrent<T: Record>(
    cancel: &CancellationToken,
    mut cursor: Box<dyn Cursor>,
    options: &QueryOptions,
) -> Result<QueryOutput<T>, SqlRecordsError> {
    let columns = cursor.columns();
    let map = FieldMap::resolve(T::columns(), &columns);

    let mut tasks = Vec::new();
    let mut row_index = 0usize;

    while let Some(values) = cursor
        .next_row()
        .await
        .map_err(SqlRecordsError::ExecutionError)?
    {
        let mut record: T = decode_record(&values, &map, &options.decoder)?;
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move {
            let outcome = match record.post_unmarshal(token, row_index, row_index + 1) {
                Some(hook) => hook.await,
                None => Ok(()),
            };
            (record, outcome)
        }));
        row_index += 1;
    }

    let mut records = Vec::with_capacity(tasks.len());
    let mut hook_error = None;
    for joined in join_all(tasks).await {
        match joined {
            Ok((record, outcome)) => {
                if let Err(err) = outcome
                    && hook_error.is_none()
                {
                    hook_error = Some(SqlRecordsError::HookError(err));
                }
                records.push(record);
            }
            Err(join_err) => {
                if hook_error.is_none() {
                    hook_error = Some(SqlRecordsError::HookError(Box::new(join_err)));
                }
            }
        }
    }

    debug!(
        rows = records.len(),
        failed = hook_error.is_some(),
        "assembled record collection (concurrent hooks)"
    );
    Ok(QueryOutput {
        records,
        hook_error,
    })
}

/// Decode only the first row; the cursor is released without consuming the
/// rest. Zero rows is `None`, not an error.
pub(crate) async fn assemble_single<T: Record>(
    cancel: &CancellationToken,
    mut cursor: Box<dyn Cursor>,
    options: &QueryOptions,
) -> Result<Option<T>, SqlRecordsError> {
    let columns = cursor.columns();
    let map = FieldMap::resolve(T::columns(), &columns);

    let Some(values) = cursor
        .next_row()
        .await
        .map_err(SqlRecordsError::ExecutionError)?
    else {
        return Ok(None);
    };
    drop(cursor);

    let mut record: T = decode_record(&values, &map, &options.decoder)?;
    if T::POST_UNMARSHAL {
        let outcome = match record.post_unmarshal(cancel.clone(), 0, 1) {
            Some(hook) => hook.await,
            None => Ok(()),
        };
        outcome.map_err(SqlRecordsError::HookError)?;
    }
    Ok(Some(record))
}

/// Drain a cursor into untyped row mappings. `raw` skips the native-type
/// normalization and returns values exactly as the driver delivered them.
pub(crate) async fn assemble_rows(
    mut cursor: Box<dyn Cursor>,
    raw: bool,
) -> Result<Vec<Row>, SqlRecordsError> {
    let columns = cursor.columns();
    let index = Row::build_index(&columns);

    let mut rows = Vec::new();
    while let Some(values) = cursor
        .next_row()
        .await
        .map_err(SqlRecordsError::ExecutionError)?
    {
        let values = if raw {
            values
        } else {
            values.into_iter().map(RowValues::native).collect()
        };
        rows.push(Row::with_index(columns.clone(), index.clone(), values));
    }

    debug!(rows = rows.len(), raw, "assembled row collection");
    Ok(rows)
}

/// First row as an untyped mapping, releasing the cursor early.
pub(crate) async fn assemble_rows_single(
    mut cursor: Box<dyn Cursor>,
    raw: bool,
) -> Result<Option<Row>, SqlRecordsError> {
    let columns = cursor.columns();

    let Some(values) = cursor
        .next_row()
        .await
        .map_err(SqlRecordsError::ExecutionError)?
    else {
        return Ok(None);
    };
    drop(cursor);

    let values = if raw {
        values
    } else {
        values.into_iter().map(RowValues::native).collect()
    };
    Ok(Some(Row::new(columns, values)))
}
