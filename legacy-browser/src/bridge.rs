//! Legacy browsing surface over an asynchronous library session
//!
//! Each legacy call gets exactly one terminal answer. Apart from
//! [`LegacyBridge::get_root`], calls never block: the response sink is
//! detached and the work is posted to the session handler, which checks
//! permissions and forwards to the session.

use std::sync::Arc;

use media_session::command::{
    COMMAND_CODE_LIBRARY_GET_CHILDREN, COMMAND_CODE_LIBRARY_GET_ITEM,
    COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT, COMMAND_CODE_LIBRARY_SEARCH,
    COMMAND_CODE_LIBRARY_SUBSCRIBE, COMMAND_CODE_LIBRARY_UNSUBSCRIBE,
};
use media_session::{
    CallerInfo, Extras, LibraryParams, LibrarySession, RemoteIdentity, SessionCommand,
    SessionHandler,
};

use crate::browser_item::{BrowserItem, BrowserRoot};
use crate::callback::{BroadcastCallback, BrowserLegacyCallback};
use crate::config::BridgeConfig;
use crate::controllers::{ControllerCallback, ControllerInfo, ControllerRegistry};
use crate::dispatch::BridgeContext;
use crate::error::{BridgeError, Result};
use crate::host::LegacyBrowserHost;
use crate::ledger::PendingSearchRequest;
use crate::options::{children_page, to_library_params, to_root_hints, EXTRA_SEARCH_SUPPORTED};
use crate::response::LegacyResult;

/// Controller version reported for legacy clients
pub const LEGACY_CONTROLLER_VERSION: i32 = 0;

/// Interface version reported for legacy clients
pub const LEGACY_CONTROLLER_INTERFACE_VERSION: i32 = 0;

/// Adapter from the legacy browsing protocol to a [`LibrarySession`]
pub struct LegacyBridge {
    context: Arc<BridgeContext>,
    registry: Arc<ControllerRegistry>,
    broadcast: Arc<BroadcastCallback>,
}

impl LegacyBridge {
    pub fn new(
        session: Arc<dyn LibrarySession>,
        handler: SessionHandler,
        host: Arc<dyn LegacyBrowserHost>,
        config: BridgeConfig,
    ) -> Self {
        let context = Arc::new(BridgeContext {
            session,
            handler,
            host,
            config,
        });

        Self {
            broadcast: Arc::new(BroadcastCallback::new(Arc::clone(&context))),
            context,
            registry: Arc::new(ControllerRegistry::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ControllerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.context.config
    }

    pub fn handler(&self) -> &SessionHandler {
        &self.context.handler
    }

    /// Callback that reaches every legacy client at once
    pub fn broadcast_callback(&self) -> Arc<dyn ControllerCallback> {
        self.broadcast.clone()
    }

    /// Connect a legacy client, asking the session what it may do
    ///
    /// Blocks until the session's `on_connect` has run on its handler.
    pub fn connect(
        &self,
        identity: RemoteIdentity,
        root_hints: Option<Extras>,
    ) -> Result<Arc<ControllerInfo>> {
        if self.registry.is_connected(&identity) {
            return Err(BridgeError::AlreadyConnected(identity));
        }

        let caller = CallerInfo {
            controller_version: LEGACY_CONTROLLER_VERSION,
            interface_version: LEGACY_CONTROLLER_INTERFACE_VERSION,
            trusted: self.context.host.is_trusted_for_media_control(&identity),
            connection_hints: root_hints.unwrap_or_default(),
            identity: identity.clone(),
        };
        let callback = Arc::new(BrowserLegacyCallback::new(
            identity.clone(),
            Arc::clone(&self.context),
        ));
        let info = Arc::new(ControllerInfo::new(caller, callback));

        let session = Arc::clone(&self.context.session);
        let connecting = Arc::clone(&info);
        let commands = self
            .context
            .handler
            .run_blocking(move || session.on_connect(connecting.caller()))?;

        match commands {
            Some(commands) => {
                self.registry.add(Arc::clone(&info), commands)?;
                tracing::info!("Legacy controller {} connected", identity);
                Ok(info)
            }
            None => {
                tracing::debug!("Session rejected legacy controller {}", identity);
                Err(BridgeError::Rejected(identity))
            }
        }
    }

    /// Forget a legacy client and abandon its pending searches
    pub fn disconnect(&self, identity: &RemoteIdentity) -> bool {
        let Some(info) = self.registry.remove(identity) else {
            return false;
        };

        if let Some(ledger) = info.callback().search_ledger() {
            let pruned = ledger.prune(identity);
            if pruned > 0 {
                tracing::debug!("Abandoned {} pending search(es) from {}", pruned, identity);
            }
        }

        tracing::info!("Legacy controller {} disconnected", identity);
        true
    }

    /// Library root for a legacy client
    ///
    /// Connects the client first if needed. Blocks the calling thread until
    /// the session's root future completes; there is no deadline on that
    /// wait. Returns `None` when the client is rejected or lacks permission,
    /// and the default root when the session fails to produce one.
    pub fn get_root(
        &self,
        identity: &RemoteIdentity,
        root_hints: Option<&Extras>,
    ) -> Option<BrowserRoot> {
        let controller = match self.registry.get(identity) {
            Some(controller) => controller,
            None => match self.connect(identity.clone(), root_hints.cloned()) {
                Ok(controller) => controller,
                Err(e) => {
                    tracing::debug!("No root for {}: {}", identity, e);
                    return None;
                }
            },
        };

        if !self
            .registry
            .is_command_code_available(identity, COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT)
        {
            tracing::debug!("{} may not get the library root", identity);
            return None;
        }

        let params = to_library_params(root_hints);
        let session = Arc::clone(&self.context.session);
        let outcome = self.context.handler.await_blocking(Box::pin(async move {
            session
                .get_library_root(controller.caller(), params)
                .await
        }));

        let library_result = match outcome {
            Ok(Ok(library_result)) => library_result,
            Ok(Err(fault)) => {
                tracing::error!("Couldn't get a result from get_library_root: {}", fault);
                return Some(self.default_root());
            }
            Err(e) => {
                tracing::error!("Couldn't get a result from get_library_root: {}", e);
                return Some(self.default_root());
            }
        };

        let params = library_result.params.clone();
        let Some(root) = library_result.into_success_value() else {
            // Keep the client connected so it can still reach the session
            return Some(self.default_root());
        };

        let mut extras = params.as_ref().map(to_root_hints).unwrap_or_default();
        extras.put_bool(
            EXTRA_SEARCH_SUPPORTED,
            self.registry
                .is_command_code_available(identity, COMMAND_CODE_LIBRARY_SEARCH),
        );

        Some(BrowserRoot::new(root.media_id, Some(extras)))
    }

    pub fn subscribe(&self, identity: &RemoteIdentity, id: &str, options: Option<Extras>) {
        let Some(controller) = self.registry.get(identity) else {
            return;
        };
        if id.is_empty() {
            tracing::warn!("subscribe(): Ignoring empty id from {}", identity);
            return;
        }

        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let id = id.to_string();
        self.context.post("subscribe", move || {
            if !registry
                .is_command_code_available(controller.identity(), COMMAND_CODE_LIBRARY_SUBSCRIBE)
            {
                tracing::debug!("{} may not subscribe", controller.identity());
                return;
            }
            let params = to_library_params(options.as_ref());
            let future = context.session.subscribe(controller.caller(), &id, params);
            context.ignore_future("subscribe", future);
        });
    }

    pub fn unsubscribe(&self, identity: &RemoteIdentity, id: &str) {
        let Some(controller) = self.registry.get(identity) else {
            return;
        };
        if id.is_empty() {
            tracing::warn!("unsubscribe(): Ignoring empty id from {}", identity);
            return;
        }

        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let id = id.to_string();
        self.context.post("unsubscribe", move || {
            if !registry
                .is_command_code_available(controller.identity(), COMMAND_CODE_LIBRARY_UNSUBSCRIBE)
            {
                tracing::debug!("{} may not unsubscribe", controller.identity());
                return;
            }
            let future = context.session.unsubscribe(controller.caller(), &id);
            context.ignore_future("unsubscribe", future);
        });
    }

    /// Children of `parent_id`, paginated when `options` carry a valid window
    pub fn load_children(
        &self,
        identity: &RemoteIdentity,
        parent_id: &str,
        options: Option<Extras>,
        result: LegacyResult<Vec<BrowserItem>>,
    ) {
        let Some(controller) = self.registry.get(identity) else {
            result.send_error(None);
            return;
        };
        if parent_id.is_empty() {
            tracing::warn!("load_children(): Ignoring empty parent id from {}", identity);
            result.send_error(None);
            return;
        }

        result.detach();
        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let parent_id = parent_id.to_string();
        self.context.post_with_result("load_children", result, move |result| {
            if !registry
                .is_command_code_available(controller.identity(), COMMAND_CODE_LIBRARY_GET_CHILDREN)
            {
                tracing::debug!("{} may not get children", controller.identity());
                result.send_result(None);
                return;
            }

            let future = match children_page(options.as_ref()) {
                Some(page) => context.session.get_children(
                    controller.caller(),
                    &parent_id,
                    page.page,
                    page.page_size,
                    to_library_params(options.as_ref()),
                ),
                None => context.session.get_children(
                    controller.caller(),
                    &parent_id,
                    0,
                    context.config.unbounded_page_size,
                    None,
                ),
            };
            context.send_items_when_ready(future, result);
        });
    }

    pub fn load_item(
        &self,
        identity: &RemoteIdentity,
        item_id: &str,
        result: LegacyResult<BrowserItem>,
    ) {
        let Some(controller) = self.registry.get(identity) else {
            result.send_error(None);
            return;
        };
        if item_id.is_empty() {
            tracing::warn!("load_item(): Ignoring empty item id from {}", identity);
            result.send_error(None);
            return;
        }

        result.detach();
        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let item_id = item_id.to_string();
        self.context.post_with_result("load_item", result, move |result| {
            if !registry
                .is_command_code_available(controller.identity(), COMMAND_CODE_LIBRARY_GET_ITEM)
            {
                tracing::debug!("{} may not get items", controller.identity());
                result.send_result(None);
                return;
            }
            let future = context.session.get_item(controller.caller(), &item_id);
            context.send_item_when_ready(future, result);
        });
    }

    /// Start a search; the answer is sent once results for `query` are announced
    pub fn search(
        &self,
        identity: &RemoteIdentity,
        query: &str,
        extras: Option<Extras>,
        result: LegacyResult<Vec<BrowserItem>>,
    ) {
        let Some(controller) = self.registry.get(identity) else {
            result.send_error(None);
            return;
        };
        if query.is_empty() {
            tracing::warn!("search(): Ignoring empty query from {}", identity);
            result.send_error(None);
            return;
        }
        if controller.callback().search_ledger().is_none() {
            tracing::warn!("search(): {} cannot receive legacy search results", identity);
            result.send_error(None);
            return;
        }

        result.detach();
        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let query = query.to_string();
        self.context.post_with_result("search", result, move |result| {
            if !registry
                .is_command_code_available(controller.identity(), COMMAND_CODE_LIBRARY_SEARCH)
            {
                tracing::debug!("{} may not search", controller.identity());
                result.send_result(None);
                return;
            }
            let Some(ledger) = controller.callback().search_ledger() else {
                result.send_error(None);
                return;
            };

            let params = to_library_params(extras.as_ref());
            ledger.register(PendingSearchRequest::new(
                Arc::clone(&controller),
                query.clone(),
                extras,
                result,
            ));
            // A disconnect that ran before the request was registered has
            // already pruned this ledger
            let still_connected = registry
                .get(controller.identity())
                .is_some_and(|current| Arc::ptr_eq(&current, &controller));
            if !still_connected {
                ledger.prune(controller.identity());
                tracing::debug!("{} disconnected while searching", controller.identity());
                return;
            }
            let future = context.session.search(controller.caller(), &query, params);
            context.ignore_future("search", future);
        });
    }

    /// Run the custom session command named `action`
    pub fn custom_action(
        &self,
        identity: &RemoteIdentity,
        action: &str,
        extras: Extras,
        result: LegacyResult<Extras>,
    ) {
        let Some(controller) = self.registry.get(identity) else {
            result.send_error(None);
            return;
        };

        result.detach();
        let context = Arc::clone(&self.context);
        let registry = Arc::clone(&self.registry);
        let command = SessionCommand::custom(action, Extras::new());
        self.context.post_with_result("custom_action", result, move |result| {
            if !registry.is_command_available(controller.identity(), &command) {
                tracing::debug!(
                    "{} may not run custom action {:?}",
                    controller.identity(),
                    command.custom_action
                );
                result.send_error(None);
                return;
            }
            let future = context
                .session
                .custom_command(controller.caller(), &command, extras);
            context.send_custom_action_result_when_ready(future, result);
        });
    }

    /// Announce changed children to one client, or to all when `target` is `None`
    pub fn notify_children_changed(
        &self,
        target: Option<&RemoteIdentity>,
        parent_id: &str,
        item_count: i32,
        params: Option<&LibraryParams>,
    ) {
        match target {
            Some(identity) => match self.registry.get(identity) {
                Some(controller) => {
                    controller
                        .callback()
                        .on_children_changed(parent_id, item_count, params)
                }
                None => tracing::debug!("Children change for unknown controller {}", identity),
            },
            None => self
                .broadcast
                .on_children_changed(parent_id, item_count, params),
        }
    }

    /// Announce that results for `query` are ready for `identity`
    pub fn notify_search_result_changed(
        &self,
        identity: &RemoteIdentity,
        query: &str,
        item_count: i32,
        params: Option<&LibraryParams>,
    ) {
        match self.registry.get(identity) {
            Some(controller) => {
                controller
                    .callback()
                    .on_search_result_changed(query, item_count, params)
            }
            None => tracing::debug!("Search result change for unknown controller {}", identity),
        }
    }

    /// Number of searches from `identity` still waiting for results
    pub fn pending_search_count(&self, identity: &RemoteIdentity) -> usize {
        self.registry
            .get(identity)
            .and_then(|controller| controller.callback().search_ledger().map(|l| l.len()))
            .unwrap_or(0)
    }

    fn default_root(&self) -> BrowserRoot {
        BrowserRoot::default_root(self.context.config.default_root_id.clone())
    }
}

impl Drop for LegacyBridge {
    fn drop(&mut self) {
        // Pending requests hold their controller, which holds the ledger
        for controller in self.registry.controllers() {
            if let Some(ledger) = controller.callback().search_ledger() {
                ledger.prune(controller.identity());
            }
        }
    }
}
