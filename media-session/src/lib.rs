//! # Media Session
//!
//! Data model and collaborator contracts shared by the legacy browsing bridge
//! and the notification coordinator.
//!
//! ## Overview
//!
//! A modern media session exposes its library through asynchronous,
//! future-based operations ([`LibrarySession`]). Every operation a client
//! triggers runs on the session's [`SessionHandler`]: a dedicated thread with
//! its own single-threaded tokio runtime that executes posted jobs in order.
//!
//! ```text
//! caller thread ──post──▶ SessionHandler (serialized jobs)
//!                              │
//!                              └── LibrarySession::get_children(..) ─▶ LibraryFuture
//!                                                                     │
//!                              spawn_task ◀──── completion ───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use media_session::SessionHandler;
//!
//! let handler = SessionHandler::spawn("library").unwrap();
//! let answer = handler.run_blocking(|| 6 * 7).unwrap();
//! assert_eq!(answer, 42);
//! handler.shutdown();
//! ```

pub mod command;
pub mod error;
pub mod extras;
pub mod handler;
pub mod identity;
pub mod item;
pub mod player;
pub mod result;
pub mod session;

// Re-export main types for convenience
pub use command::{SessionCommand, SessionCommands};
pub use error::{ExtrasError, HandlerError, Result, SessionFault};
pub use extras::Extras;
pub use handler::SessionHandler;
pub use identity::{CallerInfo, RemoteIdentity};
pub use item::{LibraryParams, MediaItem, MediaMetadata};
pub use player::{PlaybackState, PlayerEvent, PlayerEvents, PlayerState};
pub use result::{LibraryResult, ResultCode, SessionResult};
pub use session::{LibraryFuture, LibrarySession, MediaSession, SessionFuture, SessionId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CallerInfo, Extras, LibraryFuture, LibraryParams, LibraryResult, LibrarySession,
        MediaItem, MediaSession, PlaybackState, PlayerEvent, PlayerEvents, PlayerState,
        RemoteIdentity, ResultCode, SessionCommand, SessionCommands, SessionFault,
        SessionFuture, SessionHandler, SessionId, SessionResult,
    };
}
