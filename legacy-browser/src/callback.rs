//! Controller callbacks installed for legacy clients

use std::sync::Arc;

use media_session::{Extras, LibraryParams, RemoteIdentity};

use crate::controllers::ControllerCallback;
use crate::dispatch::BridgeContext;
use crate::ledger::SearchRequestLedger;

/// Callback of a single legacy client
///
/// Owns the client's outstanding searches and answers them when the session
/// announces results for the same query.
pub(crate) struct BrowserLegacyCallback {
    identity: RemoteIdentity,
    ledger: SearchRequestLedger,
    context: Arc<BridgeContext>,
}

impl BrowserLegacyCallback {
    pub fn new(identity: RemoteIdentity, context: Arc<BridgeContext>) -> Self {
        Self {
            identity,
            ledger: SearchRequestLedger::new(),
            context,
        }
    }
}

impl ControllerCallback for BrowserLegacyCallback {
    fn on_children_changed(&self, parent_id: &str, _item_count: i32, params: Option<&LibraryParams>) {
        let extras = params.map(|p| p.extras.clone()).unwrap_or_default();
        self.context
            .host
            .notify_children_changed(Some(&self.identity), parent_id, &extras);
    }

    fn on_search_result_changed(&self, query: &str, _item_count: i32, _params: Option<&LibraryParams>) {
        let requests = self.ledger.take_matching(&self.identity, query);
        if requests.is_empty() {
            return;
        }

        tracing::debug!(
            "Search results for {:?} ready, answering {} request(s) from {}",
            query,
            requests.len(),
            self.identity
        );

        let context = Arc::clone(&self.context);
        self.context.post("search result", move || {
            context.dispatch_search_results(requests);
        });
    }

    fn search_ledger(&self) -> Option<&SearchRequestLedger> {
        Some(&self.ledger)
    }
}

/// Callback reaching every legacy client at once
pub(crate) struct BroadcastCallback {
    context: Arc<BridgeContext>,
}

impl BroadcastCallback {
    pub fn new(context: Arc<BridgeContext>) -> Self {
        Self { context }
    }
}

impl ControllerCallback for BroadcastCallback {
    fn on_children_changed(&self, parent_id: &str, _item_count: i32, params: Option<&LibraryParams>) {
        let extras = params.map(|p| p.extras.clone()).unwrap_or_else(Extras::new);
        self.context
            .host
            .notify_children_changed(None, parent_id, &extras);
    }

    fn on_search_result_changed(&self, query: &str, _item_count: i32, _params: Option<&LibraryParams>) {
        // Legacy searches are answered per client, never by broadcast
        tracing::warn!("Ignoring broadcast search result change for {:?}", query);
    }
}
