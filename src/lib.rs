//! Generic row-to-record decoding and dialect-aware statement templating
//! over any SQL executor.
//!
//! The crate sits between a SQL-executing connection (supplied as an
//! [`Executor`](executor::Executor) capability) and application data
//! structures: it runs a statement, decodes each result row into a
//! caller-supplied [`Record`](record::Record) shape (or an ordered
//! column→value [`Row`](row::Row) mapping), and builds dialect-correct
//! placeholder and bulk INSERT/UPDATE statement text. It owns no connection,
//! no pool, and no SQL parser.
//!
//! ```rust
//! use sql_records::prelude::*;
//!
//! let stmt = insert_into("store", &["id", "product"], 2, Dialect::Postgres)?;
//! assert_eq!(stmt, "INSERT INTO store(id, product) VALUES ($1,$2),($3,$4)");
//! # Ok::<(), SqlRecordsError>(())
//! ```

mod assemble;
mod macros;

pub mod decode;
pub mod error;
pub mod executor;
pub mod placeholder;
pub mod prelude;
pub mod query;
pub mod query_builder;
pub mod record;
pub mod row;
pub mod statement;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::{DriverError, SqlRecordsError};
pub use query::{
    ExecArgs, QueryOptions, QueryOutput, execute, must_execute, must_query, query, query_one,
    query_raw, query_raw_one, query_rows, query_rows_one,
};
pub use tokio_util::sync::CancellationToken;
