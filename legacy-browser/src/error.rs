//! Error types for the legacy browsing bridge
//!
//! Only the host-facing connection surface returns these. Operations called
//! on behalf of a legacy client answer through its response sink instead.

use media_session::{HandlerError, RemoteIdentity};
use thiserror::Error;

/// Errors from connecting or configuring a [`LegacyBridge`](crate::LegacyBridge)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The identity has no registered controller
    #[error("Controller {0} is not connected")]
    NotConnected(RemoteIdentity),

    /// The identity already has a registered controller
    #[error("Controller {0} is already connected")]
    AlreadyConnected(RemoteIdentity),

    /// The session refused the connection
    #[error("Session rejected controller {0}")]
    Rejected(RemoteIdentity),

    /// The session handler could not run the request
    #[error("Session handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Invalid bridge configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Result type for bridge connection operations
pub type Result<T> = std::result::Result<T, BridgeError>;
