//! Exactly-once response sinks handed out with every legacy request
//!
//! A [`LegacyResult`] is the bridge's end of a legacy request. It is consumed
//! by either [`send_result`](LegacyResult::send_result) or
//! [`send_error`](LegacyResult::send_error), so a terminal answer can only be
//! delivered once. [`detach`](LegacyResult::detach) marks the request as
//! answered later, off the calling thread.
//!
//! The legacy transport keeps the paired [`ResponseHandle`] and blocks on it
//! the same way the event iterator blocks on its channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use media_session::Extras;

/// Terminal answer to a legacy request
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyResponse<T> {
    /// A result, possibly null
    Result(Option<T>),
    /// An error, with optional detail
    Error(Option<Extras>),
}

impl<T> LegacyResponse<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, LegacyResponse::Error(_))
    }

    /// The result payload, if this is a non-null result
    pub fn into_value(self) -> Option<T> {
        match self {
            LegacyResponse::Result(value) => value,
            LegacyResponse::Error(_) => None,
        }
    }
}

/// Create a connected sink/handle pair for one legacy request
pub fn legacy_result<T>() -> (LegacyResult<T>, ResponseHandle<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    let detached = Arc::new(AtomicBool::new(false));

    (
        LegacyResult {
            tx,
            detached: Arc::clone(&detached),
        },
        ResponseHandle { rx, detached },
    )
}

/// The bridge's end of a legacy request
///
/// Dropping it without sending abandons the request; the handle then
/// observes a disconnected channel.
pub struct LegacyResult<T> {
    tx: mpsc::SyncSender<LegacyResponse<T>>,
    detached: Arc<AtomicBool>,
}

impl<T> LegacyResult<T> {
    /// Tell the caller the answer will arrive asynchronously
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub fn send_result(self, result: Option<T>) {
        self.send(LegacyResponse::Result(result));
    }

    pub fn send_error(self, extras: Option<Extras>) {
        self.send(LegacyResponse::Error(extras));
    }

    fn send(self, response: LegacyResponse<T>) {
        if self.tx.send(response).is_err() {
            tracing::debug!("Legacy caller went away before its response was delivered");
        }
    }
}

impl<T> std::fmt::Debug for LegacyResult<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyResult")
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// The legacy caller's end of a request
pub struct ResponseHandle<T> {
    rx: mpsc::Receiver<LegacyResponse<T>>,
    detached: Arc<AtomicBool>,
}

impl<T> ResponseHandle<T> {
    /// Whether the bridge deferred the answer
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Block until the answer arrives
    ///
    /// Returns `None` if the request was abandoned.
    pub fn recv(&self) -> Option<LegacyResponse<T>> {
        self.rx.recv().ok()
    }

    /// Take the answer if it has already arrived
    pub fn try_recv(&self) -> Option<LegacyResponse<T>> {
        self.rx.try_recv().ok()
    }

    /// Block until the answer arrives or `timeout` expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LegacyResponse<T>> {
        self.rx.recv_timeout(timeout).ok()
    }
}
