use std::borrow::Cow;

use tokio_util::sync::CancellationToken;

use crate::decode::DecoderConfig;
use crate::error::SqlRecordsError;
use crate::executor::Executor;
use crate::query::{
    ExecArgs, QueryOptions, QueryOutput, execute, query, query_one, query_raw, query_raw_one,
    query_rows, query_rows_one,
};
use crate::record::Record;
use crate::row::Row;
use crate::types::{ExecutionSummary, RowValues};

/// Fluent wrapper over the facade functions.
///
/// ```rust,no_run
/// use sql_records::prelude::*;
/// use sql_records::query_builder::QueryBuilder;
///
/// # #[derive(Debug, Default)]
/// # struct Store { id: i64 }
/// # sql_records::impl_record! { Store { id: "id" } }
/// # async fn demo(executor: &dyn Executor) -> Result<(), SqlRecordsError> {
/// let stores = QueryBuilder::new(executor, "SELECT * FROM store")
///     .fetch::<Store>()
///     .await?
///     .ok()?;
/// # let _ = stores;
/// # Ok(())
/// # }
/// ```
pub struct QueryBuilder<'a, X: ?Sized> {
    executor: &'a X,
    sql: &'a str,
    params: Cow<'a, [RowValues]>,
    options: QueryOptions,
    cancel: CancellationToken,
}

impl<'a, X: Executor + ?Sized> QueryBuilder<'a, X> {
    pub fn new(executor: &'a X, sql: &'a str) -> Self {
        Self {
            executor,
            sql,
            params: Cow::Borrowed(&[]),
            options: QueryOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Provide bind parameters for this statement.
    #[must_use]
    pub fn params(mut self, params: &'a [RowValues]) -> Self {
        self.params = Cow::Borrowed(params);
        self
    }

    /// Replace the options wholesale.
    #[must_use]
    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the decoder configuration.
    #[must_use]
    pub fn decoder(mut self, decoder: DecoderConfig) -> Self {
        self.options.decoder = decoder;
        self
    }

    /// Fan post-unmarshal hooks out onto their own tasks.
    #[must_use]
    pub fn concurrent_post_unmarshal(mut self, on: bool) -> Self {
        self.options.concurrent_post_unmarshal = on;
        self
    }

    /// Thread an ambient cancellation token through the executor and hooks.
    #[must_use]
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Decode every row into `T`.
    ///
    /// # Errors
    ///
    /// As [`query`].
    pub async fn fetch<T: Record>(self) -> Result<QueryOutput<T>, SqlRecordsError> {
        query(&self.cancel, self.executor, self.sql, &self.params, &self.options).await
    }

    /// Decode at most one record.
    ///
    /// # Errors
    ///
    /// As [`query_one`].
    pub async fn fetch_one<T: Record>(self) -> Result<Option<T>, SqlRecordsError> {
        query_one(&self.cancel, self.executor, self.sql, &self.params, &self.options).await
    }

    /// Rows as ordered column→value mappings, native-typed.
    ///
    /// # Errors
    ///
    /// As [`query_rows`].
    pub async fn fetch_rows(self) -> Result<Vec<Row>, SqlRecordsError> {
        query_rows(&self.cancel, self.executor, self.sql, &self.params).await
    }

    /// Single-row variant of [`QueryBuilder::fetch_rows`].
    ///
    /// # Errors
    ///
    /// As [`query_rows_one`].
    pub async fn fetch_rows_one(self) -> Result<Option<Row>, SqlRecordsError> {
        query_rows_one(&self.cancel, self.executor, self.sql, &self.params).await
    }

    /// Rows exactly as the driver delivered them.
    ///
    /// # Errors
    ///
    /// As [`query_raw`].
    pub async fn fetch_raw(self) -> Result<Vec<Row>, SqlRecordsError> {
        query_raw(&self.cancel, self.executor, self.sql, &self.params).await
    }

    /// Single-row variant of [`QueryBuilder::fetch_raw`].
    ///
    /// # Errors
    ///
    /// As [`query_raw_one`].
    pub async fn fetch_raw_one(self) -> Result<Option<Row>, SqlRecordsError> {
        query_raw_one(&self.cancel, self.executor, self.sql, &self.params).await
    }

    /// Execute as a write statement with the builder's flat parameters.
    ///
    /// # Errors
    ///
    /// As [`execute`].
    pub async fn run(self) -> Result<ExecutionSummary, SqlRecordsError> {
        let params = ExecArgs::Single(self.params.into_owned());
        execute(&self.cancel, self.executor, self.sql, params).await
    }
}
