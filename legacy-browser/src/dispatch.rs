//! Completion of session futures into legacy responses
//!
//! Every future is driven on the session handler. When it resolves, its
//! result is converted once and written to the waiting sink: a successful
//! payload becomes a legacy value, a non-success or empty result becomes a
//! null result, and a fault becomes an error.

use std::sync::Arc;

use media_session::{
    Extras, LibraryFuture, LibrarySession, MediaItem, SessionFuture, SessionHandler,
    SessionResult,
};

use crate::browser_item::{convert_items, truncate_list_by_size, BrowserItem};
use crate::config::BridgeConfig;
use crate::host::LegacyBrowserHost;
use crate::ledger::PendingSearchRequest;
use crate::options::{search_page, to_library_params};
use crate::response::LegacyResult;

/// Holds a sink until a job takes it; answers with an error when dropped
/// before that
struct Unanswered<T>(Option<LegacyResult<T>>);

impl<T> Drop for Unanswered<T> {
    fn drop(&mut self) {
        if let Some(result) = self.0.take() {
            result.send_error(None);
        }
    }
}

/// Everything a dispatch needs to reach the session
pub(crate) struct BridgeContext {
    pub session: Arc<dyn LibrarySession>,
    pub handler: SessionHandler,
    pub host: Arc<dyn LegacyBrowserHost>,
    pub config: BridgeConfig,
}

impl BridgeContext {
    /// Run `job` on the session handler
    ///
    /// If the handler has stopped the job is dropped.
    pub fn post<F>(&self, operation: &str, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.handler.post_or_run(job) {
            tracing::warn!("Dropping {} request: {}", operation, e);
        }
    }

    /// Run `job` on the session handler, handing it the request's sink
    ///
    /// If the job never runs because the handler has stopped, the sink is
    /// answered with an error instead.
    pub fn post_with_result<T, F>(&self, operation: &str, result: LegacyResult<T>, job: F)
    where
        T: Send + 'static,
        F: FnOnce(LegacyResult<T>) + Send + 'static,
    {
        let mut unanswered = Unanswered(Some(result));
        let posted = self.handler.post_or_run(move || {
            if let Some(result) = unanswered.0.take() {
                job(result);
            }
        });
        if let Err(e) = posted {
            tracing::warn!("Failing {} request: {}", operation, e);
        }
    }

    /// Resolve `result` with a truncated item list once `future` completes
    pub fn send_items_when_ready(
        &self,
        future: LibraryFuture<Vec<MediaItem>>,
        result: LegacyResult<Vec<BrowserItem>>,
    ) {
        let limit = self.config.transaction_size_limit;
        self.handler.spawn_task(async move {
            match future.await {
                Ok(library_result) => match library_result.into_success_value() {
                    Some(items) => {
                        let converted = convert_items(&items);
                        let total = converted.len();
                        let sent = truncate_list_by_size(converted, limit);
                        if sent.len() < total {
                            tracing::debug!(
                                "Truncated item list from {} to {} items",
                                total,
                                sent.len()
                            );
                        }
                        result.send_result(Some(sent));
                    }
                    None => result.send_result(None),
                },
                Err(fault) => {
                    tracing::debug!("Item list request failed: {}", fault);
                    result.send_error(None);
                }
            }
        });
    }

    /// Resolve `result` with a single item once `future` completes
    pub fn send_item_when_ready(
        &self,
        future: LibraryFuture<MediaItem>,
        result: LegacyResult<BrowserItem>,
    ) {
        self.handler.spawn_task(async move {
            match future.await {
                Ok(library_result) => {
                    let item = library_result
                        .into_success_value()
                        .map(|item| BrowserItem::from(&item));
                    result.send_result(item);
                }
                Err(fault) => {
                    tracing::debug!("Item request failed: {}", fault);
                    result.send_error(None);
                }
            }
        });
    }

    /// Resolve `result` with the command's extras once `future` completes
    pub fn send_custom_action_result_when_ready(
        &self,
        future: SessionFuture<SessionResult>,
        result: LegacyResult<Extras>,
    ) {
        self.handler.spawn_task(async move {
            match future.await {
                Ok(session_result) => result.send_result(Some(session_result.extras)),
                Err(fault) => {
                    tracing::debug!("Custom action failed: {}", fault);
                    result.send_error(None);
                }
            }
        });
    }

    /// Drive a future whose result nobody waits for
    pub fn ignore_future<T>(&self, operation: &'static str, future: LibraryFuture<T>)
    where
        T: Send + 'static,
    {
        self.handler.spawn_task(async move {
            if let Err(fault) = future.await {
                tracing::debug!("{} failed: {}", operation, fault);
            }
        });
    }

    /// Fetch results for each claimed search request, each with its own window
    ///
    /// A request whose extras cannot be decoded gets a null result; the other
    /// requests still proceed.
    pub fn dispatch_search_results(&self, requests: Vec<PendingSearchRequest>) {
        for request in requests {
            let PendingSearchRequest {
                controller,
                query,
                extras,
                result,
            } = request;

            let page = match search_page(extras.as_ref(), self.config.unbounded_page_size) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        "Malformed search extras from {}: {}",
                        controller.identity(),
                        e
                    );
                    result.send_result(None);
                    continue;
                }
            };

            let params = to_library_params(extras.as_ref());
            let future = self.session.get_search_result(
                controller.caller(),
                &query,
                page.page,
                page.page_size,
                params,
            );
            self.send_items_when_ready(future, result);
        }
    }
}
