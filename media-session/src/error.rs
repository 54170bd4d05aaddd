//! Error types for media-session

use thiserror::Error;

/// Fault raised by a session-side future in place of a result
///
/// These mirror the ways an asynchronous session operation can fail to
/// produce a value at all, as opposed to producing an error result code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionFault {
    /// The operation was cancelled before completing
    #[error("Session operation was cancelled")]
    Cancelled,

    /// The operation failed while executing
    #[error("Session operation failed: {0}")]
    Execution(String),

    /// The waiting thread was interrupted
    #[error("Session operation was interrupted")]
    Interrupted,
}

/// Errors reading typed values out of an [`Extras`](crate::Extras) bag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtrasError {
    /// The key exists but holds a value of another type
    #[error("Extra {key:?} is not a valid {expected}")]
    TypeMismatch {
        /// The offending key
        key: String,
        /// The type the caller asked for
        expected: &'static str,
    },
}

/// Errors from the serialized session handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler thread has shut down and no longer accepts work
    #[error("Session handler {0:?} has stopped")]
    Stopped(String),

    /// The handler runtime could not be created
    #[error("Failed to start session handler runtime: {0}")]
    RuntimeInit(String),

    /// A blocking wait was requested from the handler's own thread
    #[error("Cannot block on the thread of session handler {0:?}")]
    BlockingOnHandler(String),
}

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fault_display() {
        assert_eq!(
            SessionFault::Cancelled.to_string(),
            "Session operation was cancelled"
        );
        assert_eq!(
            SessionFault::Execution("boom".to_string()).to_string(),
            "Session operation failed: boom"
        );
    }

    #[test]
    fn test_extras_error_display() {
        let error = ExtrasError::TypeMismatch {
            key: "page".to_string(),
            expected: "int",
        };
        assert_eq!(error.to_string(), "Extra \"page\" is not a valid int");
    }

    #[test]
    fn test_handler_error_display() {
        let error = HandlerError::Stopped("library".to_string());
        assert!(error.to_string().contains("library"));
    }
}
