//! MediaLibraryService - Main entry point
//!
//! Hosts library sessions for legacy browsing clients and keeps their media
//! notification and the service's foreground state in sync.

use std::sync::Arc;

use dashmap::DashMap;
use legacy_browser::{LegacyBridge, LegacyBrowserHost, LoggingHost};
use media_session::{
    Extras, LibrarySession, MediaSession, PlayerEvents, SessionHandler, SessionId,
};
use notification_manager::{
    ActionFactory, CommandButton, CoordinatorSnapshot, ForegroundService, NotificationManager,
    NotificationProvider, SessionEvent,
};

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::link::LocalLinkFactory;

/// A media library service hosting one or more sessions
///
/// Each added session gets its own handler thread and [`LegacyBridge`]; all
/// sessions share one notification coordinator. The service is fully
/// synchronous.
///
/// # Example
///
/// ```rust,ignore
/// use media_bridge::prelude::*;
///
/// let service = MediaLibraryService::builder()
///     .with_config(ServiceConfig::from_json_file("media-bridge.json")?)
///     .with_foreground_service(platform)
///     .with_host(browser_host)
///     .build()?;
///
/// let bridge = service.add_session(library)?;
/// let root = bridge.get_root(&client, None);
///
/// service.on_player_events(&SessionId::new("music"), events);
/// ```
pub struct MediaLibraryService {
    config: ServiceConfig,
    host: Arc<dyn LegacyBrowserHost>,
    links: Arc<LocalLinkFactory>,
    notifications: NotificationManager,
    bridges: Arc<DashMap<SessionId, Arc<LegacyBridge>>>,
}

impl MediaLibraryService {
    pub fn builder() -> MediaLibraryServiceBuilder {
        MediaLibraryServiceBuilder::default()
    }

    /// Add a library session
    ///
    /// Spawns the session's handler, exposes it to legacy clients and
    /// registers it for notifications. Adding a session twice returns the
    /// existing bridge.
    pub fn add_session<S: LibrarySession>(&self, session: Arc<S>) -> Result<Arc<LegacyBridge>> {
        let session_id = session.id().clone();
        if let Some(bridge) = self.bridges.get(&session_id) {
            tracing::debug!("Session {} already added", session_id);
            return Ok(Arc::clone(&bridge));
        }

        let handler = SessionHandler::spawn(session_id.as_str())?;
        let library: Arc<dyn LibrarySession> = session.clone();
        let media: Arc<dyn MediaSession> = session;

        self.links.register(Arc::clone(&library), handler.clone());
        let bridge = Arc::new(LegacyBridge::new(
            library,
            handler,
            Arc::clone(&self.host),
            self.config.bridge.clone(),
        ));
        self.bridges.insert(session_id.clone(), Arc::clone(&bridge));

        if let Err(e) = self.notifications.add_session(media) {
            self.discard(&session_id);
            return Err(e.into());
        }

        tracing::info!("Added session {}", session_id);
        Ok(bridge)
    }

    /// Remove a session; its legacy clients and pending searches are dropped
    pub fn remove_session(&self, session_id: &SessionId) -> Result<()> {
        if !self.bridges.contains_key(session_id) {
            return Err(ServiceError::SessionNotFound(session_id.to_string()));
        }

        let result = self.notifications.remove_session(session_id.clone());
        self.discard(session_id);
        tracing::info!("Removed session {}", session_id);
        result.map_err(ServiceError::from)
    }

    fn discard(&self, session_id: &SessionId) {
        self.links.unregister(session_id);
        if let Some((_, bridge)) = self.bridges.remove(session_id) {
            bridge.handler().shutdown();
        }
    }

    /// Legacy browsing surface of a session
    pub fn bridge(&self, session_id: &SessionId) -> Option<Arc<LegacyBridge>> {
        self.bridges.get(session_id).map(|b| Arc::clone(&b))
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.bridges.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Ask for the session's notification to be rebuilt
    pub fn update_notification(&self, session_id: &SessionId) -> Result<()> {
        Ok(self.notifications.update_notification(session_id.clone())?)
    }

    /// A notification action was tapped
    pub fn on_custom_action(
        &self,
        session_id: &SessionId,
        action: &str,
        extras: Extras,
    ) -> Result<()> {
        Ok(self
            .notifications
            .on_custom_action(session_id.clone(), action, extras)?)
    }

    /// The session's player reported changes
    pub fn on_player_events(&self, session_id: &SessionId, events: PlayerEvents) -> bool {
        self.links
            .send_event(session_id, SessionEvent::PlayerEvents(events))
    }

    /// The session published a new custom layout
    pub fn on_custom_layout_changed(
        &self,
        session_id: &SessionId,
        layout: Vec<CommandButton>,
    ) -> bool {
        self.links
            .send_event(session_id, SessionEvent::CustomLayoutChanged(layout))
    }

    /// The session went away on its own
    ///
    /// The coordinator forgets it, and the service then drops its bridge and
    /// handler as if [`remove_session`](Self::remove_session) had been called.
    pub fn on_session_disconnected(&self, session_id: &SessionId) -> bool {
        self.links.send_event(session_id, SessionEvent::Disconnected)
    }

    /// Wait until the notification coordinator has caught up
    pub fn flush(&self) -> Result<()> {
        Ok(self.notifications.flush()?)
    }

    pub fn notification_snapshot(&self) -> Result<CoordinatorSnapshot> {
        Ok(self.notifications.snapshot()?)
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Stop the coordinator and every session handler
    pub fn shutdown(&self) {
        self.notifications.shutdown();
        for entry in self.bridges.iter() {
            entry.value().handler().shutdown();
        }
        tracing::info!("MediaLibraryService shut down");
    }
}

/// Builder for [`MediaLibraryService`]
#[derive(Default)]
pub struct MediaLibraryServiceBuilder {
    config: ServiceConfig,
    platform: Option<Arc<dyn ForegroundService>>,
    host: Option<Arc<dyn LegacyBrowserHost>>,
    provider: Option<Arc<dyn NotificationProvider>>,
    action_factory: Option<Arc<dyn ActionFactory>>,
}

impl MediaLibraryServiceBuilder {
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Platform entry points for foreground transitions (required)
    pub fn with_foreground_service(mut self, platform: Arc<dyn ForegroundService>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Outbound legacy transport; defaults to [`LoggingHost`]
    pub fn with_host(mut self, host: Arc<dyn LegacyBrowserHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_notification_provider(mut self, provider: Arc<dyn NotificationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_action_factory(mut self, action_factory: Arc<dyn ActionFactory>) -> Self {
        self.action_factory = Some(action_factory);
        self
    }

    pub fn build(self) -> Result<MediaLibraryService> {
        self.config.validate()?;

        let platform = self
            .platform
            .ok_or_else(|| ServiceError::Config("a foreground service is required".to_string()))?;
        // Sessions the coordinator drops on its own (failed link, disconnect)
        // leave the service too
        let bridges: Arc<DashMap<SessionId, Arc<LegacyBridge>>> = Arc::new(DashMap::new());
        let dropped = Arc::clone(&bridges);
        let links = Arc::new(LocalLinkFactory::with_drop_listener(move |session_id| {
            if let Some((_, bridge)) = dropped.remove(session_id) {
                bridge.handler().shutdown();
                tracing::info!("Removed session {}", session_id);
            }
        }));

        let mut notifications = NotificationManager::builder()
            .with_config(self.config.notification.clone())
            .with_foreground_service(platform)
            .with_link_factory(links.clone());
        if let Some(provider) = self.provider {
            notifications = notifications.with_provider(provider);
        }
        if let Some(action_factory) = self.action_factory {
            notifications = notifications.with_action_factory(action_factory);
        }

        let host: Arc<dyn LegacyBrowserHost> = match self.host {
            Some(host) => host,
            None => Arc::new(LoggingHost),
        };

        Ok(MediaLibraryService {
            config: self.config,
            host,
            links,
            notifications: notifications.build()?,
            bridges,
        })
    }
}
