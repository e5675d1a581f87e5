//! Convenience re-exports for the common surface.
//!
//! ```rust
//! use sql_records::prelude::*;
//!
//! let stmt = insert_into("store", &["id", "product"], 3, Dialect::MySql);
//! # let _ = stmt;
//! ```

pub use crate::decode::{DecodeHook, DecoderConfig, FromRowValue};
pub use crate::error::{DriverError, SqlRecordsError};
pub use crate::executor::{Cursor, Executor};
pub use crate::placeholder::{placeholders, placeholders_from};
pub use crate::query::{
    ExecArgs, QueryOptions, QueryOutput, execute, must_execute, must_query, query, query_one,
    query_raw, query_raw_one, query_rows, query_rows_one,
};
pub use crate::query_builder::QueryBuilder;
pub use crate::record::{HookFuture, Record};
pub use crate::row::Row;
pub use crate::statement::{BulkUpdateOptions, bulk_update, insert_into};
pub use crate::types::{Dialect, ExecutionSummary, RowValues};
pub use tokio_util::sync::CancellationToken;
