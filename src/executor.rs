use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;
use crate::types::{ExecutionSummary, RowValues};

/// Forward-only stream of rows yielded by an [`Executor`] query.
///
/// A cursor is finite and not restartable: consume it to exhaustion with
/// [`Cursor::next_row`] or release it by dropping. Errors use the driver's
/// native error type, boxed.
#[async_trait]
pub trait Cursor: Send {
    /// Column names of the result set, available as soon as the cursor opens.
    fn columns(&self) -> Arc<Vec<String>>;

    /// Fetch the next row's values, in column order. `None` means exhausted.
    ///
    /// # Errors
    ///
    /// Returns the driver's native error if row retrieval fails mid-stream.
    async fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, DriverError>;
}

/// The capability this crate consumes to run statements against a live
/// connection.
///
/// Implementations handle all actual I/O; the decoding and templating layers
/// above never touch a socket. The cancellation token is threaded through so
/// drivers that can observe it may abort early; drivers that cannot simply
/// ignore it and rely on the caller dropping the future.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement expected to return rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's native error unchanged.
    async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Box<dyn Cursor>, DriverError>;

    /// Run a statement executed for effect (INSERT, UPDATE, DELETE, ...).
    ///
    /// # Errors
    ///
    /// Returns the driver's native error unchanged.
    async fn execute(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ExecutionSummary, DriverError>;
}
