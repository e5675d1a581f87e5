use thiserror::Error;

/// Boxed native error produced by an [`Executor`](crate::executor::Executor)
/// implementation or by a post-unmarshal hook.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SqlRecordsError {
    /// Bad or missing required option. Detected before any I/O is attempted.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The executor call failed; the driver's native error is wrapped unchanged.
    #[error("SQL execution error: {0}")]
    ExecutionError(#[source] DriverError),

    /// Row-to-record coercion failed under the active typing rules.
    #[error("Row decode error: {0}")]
    DecodeError(String),

    /// A post-unmarshal hook returned failure.
    #[error("Post-unmarshal hook error: {0}")]
    HookError(#[source] DriverError),
}
