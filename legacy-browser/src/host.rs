//! The legacy browser service hosting the bridge

use media_session::{Extras, RemoteIdentity};

/// Outbound surface of the legacy browsing transport
pub trait LegacyBrowserHost: Send + Sync + 'static {
    /// Tell legacy clients that the children of `parent_id` changed
    ///
    /// `target` limits the notification to one client; `None` reaches every
    /// subscribed client.
    fn notify_children_changed(
        &self,
        target: Option<&RemoteIdentity>,
        parent_id: &str,
        extras: &Extras,
    );

    /// Whether the platform trusts `identity` with media control
    fn is_trusted_for_media_control(&self, _identity: &RemoteIdentity) -> bool {
        false
    }
}

/// Host that only logs outbound notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl LegacyBrowserHost for LoggingHost {
    fn notify_children_changed(
        &self,
        target: Option<&RemoteIdentity>,
        parent_id: &str,
        extras: &Extras,
    ) {
        match target {
            Some(identity) => tracing::debug!(
                "Children of {} changed for {} ({} extras)",
                parent_id,
                identity,
                extras.len()
            ),
            None => tracing::debug!(
                "Children of {} changed for all clients ({} extras)",
                parent_id,
                extras.len()
            ),
        }
    }
}
