//! Error types shared by the ring buffer and the parallel mapper.

use thiserror::Error;

/// Boxed error carried by [`Error::MapperFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `ringfork` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A constructor argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The buffer holds no live elements.
    #[error("ring buffer is empty")]
    EmptyBuffer,

    /// The mapped function failed on one of the workers.
    ///
    /// Only the first failure observed is kept; results produced by the
    /// other workers are discarded.
    #[error("parallel map failed on worker {worker}: {source}")]
    MapperFailure {
        /// Id of the worker that reported the failure.
        worker: usize,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

/// A worker thread panicked while running the mapped function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker panicked: {0}")]
pub struct WorkerPanic(
    /// Panic message, if the payload was a string.
    pub String,
);

impl WorkerPanic {
    /// Build from a payload returned by a failed thread join.
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        WorkerPanic(message)
    }
}

/// Result alias for `ringfork` operations.
pub type Result<T> = std::result::Result<T, Error>;
