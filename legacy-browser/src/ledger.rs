//! Outstanding legacy search requests
//!
//! A legacy search is answered only once the session announces that results
//! for the query are ready. Until then the request waits here. Claiming a
//! request removes it under the same lock, so a request is dispatched at
//! most once.

use std::sync::Arc;

use media_session::{Extras, RemoteIdentity};
use parking_lot::Mutex;

use crate::browser_item::BrowserItem;
use crate::controllers::ControllerInfo;
use crate::response::LegacyResult;

/// A legacy search waiting for its results
#[derive(Debug)]
pub struct PendingSearchRequest {
    pub controller: Arc<ControllerInfo>,
    pub query: String,
    pub extras: Option<Extras>,
    pub result: LegacyResult<Vec<BrowserItem>>,
}

impl PendingSearchRequest {
    pub fn new(
        controller: Arc<ControllerInfo>,
        query: impl Into<String>,
        extras: Option<Extras>,
        result: LegacyResult<Vec<BrowserItem>>,
    ) -> Self {
        Self {
            controller,
            query: query.into(),
            extras,
            result,
        }
    }

    pub fn identity(&self) -> &RemoteIdentity {
        self.controller.identity()
    }

    fn matches(&self, identity: &RemoteIdentity, query: &str) -> bool {
        self.identity() == identity && self.query == query
    }
}

/// Lock-guarded list of pending searches, in arrival order
#[derive(Debug, Default)]
pub struct SearchRequestLedger {
    requests: Mutex<Vec<PendingSearchRequest>>,
}

impl SearchRequestLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, request: PendingSearchRequest) {
        self.requests.lock().push(request);
    }

    /// Remove and return every request from `identity` for exactly `query`
    ///
    /// Matched requests keep their arrival order.
    pub fn take_matching(&self, identity: &RemoteIdentity, query: &str) -> Vec<PendingSearchRequest> {
        let mut requests = self.requests.lock();
        let (matched, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut *requests)
            .into_iter()
            .partition(|request| request.matches(identity, query));
        *requests = remaining;
        matched
    }

    /// Drop every request from `identity`, abandoning their sinks
    pub fn prune(&self, identity: &RemoteIdentity) -> usize {
        let mut requests = self.requests.lock();
        let before = requests.len();
        requests.retain(|request| request.identity() != identity);
        before - requests.len()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}
