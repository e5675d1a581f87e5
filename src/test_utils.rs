//! Scripted in-memory executor for exercising the decoding and templating
//! pipeline without a live database. Enabled with the `test-utils` feature.
//!
//! Expectations are consumed in order and matched against incoming statement
//! text with a regular expression, in the manner of driver mocks:
//!
//! ```rust
//! use sql_records::prelude::*;
//! use sql_records::test_utils::{MockExecutor, MockRows};
//!
//! let executor = MockExecutor::new();
//! executor.expect_query(
//!     "^SELECT (.+) FROM store$",
//!     MockRows::new(&["id"]).row(vec![RowValues::Int(1)]),
//! );
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;
use crate::executor::{Cursor, Executor};
use crate::types::{ExecutionSummary, RowValues};

/// Error produced when a scripted expectation is missing or does not match.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct MockDbError(pub String);

/// A scripted result set.
#[derive(Debug, Clone)]
pub struct MockRows {
    columns: Vec<String>,
    rows: Vec<Vec<RowValues>>,
}

impl MockRows {
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        }
    }

    /// Append one row of values, in column order.
    #[must_use]
    pub fn row(mut self, values: Vec<RowValues>) -> Self {
        self.rows.push(values);
        self
    }
}

enum Reply {
    Rows(MockRows),
    Summary(ExecutionSummary),
    Error(String),
}

struct Expectation {
    pattern: Regex,
    reply: Reply,
}

/// In-memory [`Executor`] driven by scripted expectations.
#[derive(Default)]
pub struct MockExecutor {
    expectations: Mutex<VecDeque<Expectation>>,
    calls: Mutex<Vec<(String, Vec<RowValues>)>>,
}

impl MockExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a read statement matching `pattern` and reply with `rows`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn expect_query(&self, pattern: &str, rows: MockRows) {
        self.push(pattern, Reply::Rows(rows));
    }

    /// Expect a read statement matching `pattern` and fail it.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn expect_query_error(&self, pattern: &str, message: &str) {
        self.push(pattern, Reply::Error(message.to_string()));
    }

    /// Expect a write statement matching `pattern` and reply with `summary`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn expect_exec(&self, pattern: &str, summary: ExecutionSummary) {
        self.push(pattern, Reply::Summary(summary));
    }

    /// Expect a write statement matching `pattern` and fail it.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn expect_exec_error(&self, pattern: &str, message: &str) {
        self.push(pattern, Reply::Error(message.to_string()));
    }

    fn push(&self, pattern: &str, reply: Reply) {
        let pattern = Regex::new(pattern).expect("invalid expectation pattern");
        self.lock_expectations()
            .push_back(Expectation { pattern, reply });
    }

    /// Statements and flattened parameters received so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Vec<RowValues>)> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Assert every scripted expectation was consumed.
    ///
    /// # Panics
    ///
    /// Panics when expectations remain unmet.
    pub fn verify(&self) {
        let remaining = self.lock_expectations().len();
        assert_eq!(remaining, 0, "{remaining} scripted expectations were not met");
    }

    fn lock_expectations(&self) -> std::sync::MutexGuard<'_, VecDeque<Expectation>> {
        match self.expectations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record_call(&self, sql: &str, params: &[RowValues]) {
        let mut calls = match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        calls.push((sql.to_string(), params.to_vec()));
    }

    fn next_reply(&self, sql: &str) -> Result<Reply, DriverError> {
        let mut expectations = self.lock_expectations();
        match expectations.pop_front() {
            None => Err(Box::new(MockDbError(format!(
                "unexpected statement: {sql}"
            )))),
            Some(expectation) if !expectation.pattern.is_match(sql) => {
                Err(Box::new(MockDbError(format!(
                    "statement `{sql}` does not match expectation `{}`",
                    expectation.pattern
                ))))
            }
            Some(expectation) => Ok(expectation.reply),
        }
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn query(
        &self,
        _cancel: &CancellationToken,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Box<dyn Cursor>, DriverError> {
        self.record_call(sql, params);
        match self.next_reply(sql)? {
            Reply::Rows(rows) => Ok(Box::new(MockCursor {
                columns: Arc::new(rows.columns),
                rows: rows.rows.into(),
            })),
            Reply::Summary(_) => Err(Box::new(MockDbError(format!(
                "statement `{sql}` was scripted as an exec, not a query"
            )))),
            Reply::Error(message) => Err(Box::new(MockDbError(message))),
        }
    }

    async fn execute(
        &self,
        _cancel: &CancellationToken,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ExecutionSummary, DriverError> {
        self.record_call(sql, params);
        match self.next_reply(sql)? {
            Reply::Summary(summary) => Ok(summary),
            Reply::Rows(_) => Err(Box::new(MockDbError(format!(
                "statement `{sql}` was scripted as a query, not an exec"
            )))),
            Reply::Error(message) => Err(Box::new(MockDbError(message))),
        }
    }
}

struct MockCursor {
    columns: Arc<Vec<String>>,
    rows: VecDeque<Vec<RowValues>>,
}

#[async_trait]
impl Cursor for MockCursor {
    fn columns(&self) -> Arc<Vec<String>> {
        self.columns.clone()
    }

    async fn next_row(&mut self) -> Result<Option<Vec<RowValues>>, DriverError> {
        Ok(self.rows.pop_front())
    }
}
