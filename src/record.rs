use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::decode::DecoderConfig;
use crate::error::{DriverError, SqlRecordsError};
use crate::types::RowValues;

/// Boxed future returned by a record's post-unmarshal hook.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DriverError>> + Send + 'a>>;

/// A record shape rows decode into.
///
/// `columns()` is the shape's tag table: one column name per field, in field
/// order, built once per type. The decoder resolves it against a result set's
/// columns once per operation and then assigns values by field ordinal —
/// no per-row name lookups. Tags are case-sensitive and must be unique
/// within a shape; a tag with no matching column leaves the field at its
/// zero value, and result columns no tag names are ignored.
///
/// Implement by hand or through [`impl_record!`](crate::impl_record):
/// ```rust
/// use sql_records::prelude::*;
///
/// #[derive(Debug, Default)]
/// struct Item {
///     id: i64,
///     name: String,
/// }
///
/// sql_records::impl_record! {
///     Item { id: "id", name: "name" }
/// }
///
/// assert_eq!(<Item as Record>::columns(), &["id", "name"]);
/// ```
///
/// The two optional capabilities are advertised through associated consts so
/// the assembler checks them once per call, not per row.
pub trait Record: Default + Send + 'static {
    /// Whether [`Record::scan_fast`] provides positional binding.
    const FAST_SCAN: bool = false;

    /// Whether [`Record::post_unmarshal`] hooks each decoded record.
    const POST_UNMARSHAL: bool = false;

    /// Column tags, one per field, in field order.
    fn columns() -> &'static [&'static str];

    /// Assign a value into the field at `field` (an ordinal into
    /// [`Record::columns`]). Unknown ordinals are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` when the value cannot be coerced into the
    /// field's type under `config`.
    fn assign(
        &mut self,
        field: usize,
        value: &RowValues,
        config: &DecoderConfig,
    ) -> Result<(), SqlRecordsError>;

    /// Positional fast path: bind `values` in result-column order, bypassing
    /// name-based mapping entirely. Only consulted when [`Record::FAST_SCAN`]
    /// is set.
    fn scan_fast(
        &mut self,
        values: &[RowValues],
        config: &DecoderConfig,
    ) -> Option<Result<(), SqlRecordsError>> {
        let _ = (values, config);
        None
    }

    /// Post-decode hook, invoked once per decoded record with the record's
    /// row index and the number of rows decoded so far. Only consulted when
    /// [`Record::POST_UNMARSHAL`] is set. The token reports cancellation of
    /// the surrounding operation; a hook is expected to observe it itself —
    /// the assembler never interrupts a running hook.
    fn post_unmarshal(
        &mut self,
        cancel: CancellationToken,
        row_index: usize,
        total_rows: usize,
    ) -> Option<HookFuture<'_>> {
        let _ = (cancel, row_index, total_rows);
        None
    }
}

/// Duplicate tags make name resolution ambiguous; reject before any I/O.
pub(crate) fn validate_shape<T: Record>() -> Result<(), SqlRecordsError> {
    let columns = T::columns();
    for (i, tag) in columns.iter().enumerate() {
        if columns[..i].contains(tag) {
            return Err(SqlRecordsError::ConfigError(format!(
                "duplicate column tag `{tag}` in record shape"
            )));
        }
    }
    Ok(())
}
