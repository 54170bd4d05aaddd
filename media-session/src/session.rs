//! Contracts the bridge and the notification coordinator consume
//!
//! A session exposes its library as asynchronous operations returning boxed
//! futures. A future resolves either to a [`LibraryResult`] (which may itself
//! carry an error code) or to a [`SessionFault`] when no result could be
//! produced at all.

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::command::{SessionCommand, SessionCommands};
use crate::error::SessionFault;
use crate::extras::Extras;
use crate::identity::CallerInfo;
use crate::item::{LibraryParams, MediaItem};
use crate::player::PlayerState;
use crate::result::{LibraryResult, SessionResult};

/// Future returned by every asynchronous session operation
pub type SessionFuture<T> = BoxFuture<'static, Result<T, SessionFault>>;

/// Future returned by library operations
pub type LibraryFuture<T> = SessionFuture<LibraryResult<T>>;

/// Stable identifier of a session, used as a map key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A media session as seen by the notification coordinator
pub trait MediaSession: Send + Sync + 'static {
    fn id(&self) -> &SessionId;

    /// Current player snapshot
    fn player_state(&self) -> PlayerState;

    /// Opaque platform token identifying the session
    fn session_token(&self) -> String;
}

/// A session that serves a browsable library
///
/// All methods are called on the session's handler thread. Implementations
/// return futures rather than blocking.
pub trait LibrarySession: MediaSession {
    /// Decide whether to accept a new controller and what it may do
    ///
    /// Returning `None` rejects the connection.
    fn on_connect(&self, caller: &CallerInfo) -> Option<SessionCommands>;

    fn get_library_root(
        &self,
        caller: &CallerInfo,
        params: Option<LibraryParams>,
    ) -> LibraryFuture<MediaItem>;

    fn subscribe(
        &self,
        caller: &CallerInfo,
        parent_id: &str,
        params: Option<LibraryParams>,
    ) -> LibraryFuture<()>;

    fn unsubscribe(&self, caller: &CallerInfo, parent_id: &str) -> LibraryFuture<()>;

    fn get_children(
        &self,
        caller: &CallerInfo,
        parent_id: &str,
        page: i32,
        page_size: i32,
        params: Option<LibraryParams>,
    ) -> LibraryFuture<Vec<MediaItem>>;

    fn get_item(&self, caller: &CallerInfo, media_id: &str) -> LibraryFuture<MediaItem>;

    /// Start a search; results are announced later via a search-result-changed notification
    fn search(
        &self,
        caller: &CallerInfo,
        query: &str,
        params: Option<LibraryParams>,
    ) -> LibraryFuture<()>;

    fn get_search_result(
        &self,
        caller: &CallerInfo,
        query: &str,
        page: i32,
        page_size: i32,
        params: Option<LibraryParams>,
    ) -> LibraryFuture<Vec<MediaItem>>;

    fn custom_command(
        &self,
        caller: &CallerInfo,
        command: &SessionCommand,
        extras: Extras,
    ) -> SessionFuture<SessionResult>;
}
