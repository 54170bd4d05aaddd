//! Sync-first notification manager
//!
//! Provides a synchronous handle to the notification coordinator. All state
//! transitions run on a background worker thread; the methods here only
//! enqueue commands, except [`flush`](NotificationManager::flush) and
//! [`snapshot`](NotificationManager::snapshot) which wait for the worker.

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use media_session::{Extras, MediaSession, SessionId};
use tokio::sync::mpsc;

use crate::config::NotificationConfig;
use crate::coordinator::{Collaborators, CoordinatorSnapshot, NotificationCoordinator};
use crate::error::{NotificationError, Result};
use crate::link::ControllerLinkFactory;
use crate::notification::{
    ActionFactory, DefaultActionFactory, DefaultNotificationProvider, NotificationProvider,
};
use crate::platform::ForegroundService;
use crate::policy::{ForegroundPolicy, VersionedPolicy};
use crate::worker::{spawn_notification_worker, Command, FailureSlot};

/// Barrier re-queues before a flush is acknowledged
const FLUSH_ROUNDS: u8 = 3;

/// Handle to the notification coordinator
///
/// Cheap calls enqueue work for the background worker and return at once.
/// Once the worker has stopped after a platform constraint violation, every
/// call returns [`NotificationError::WorkerStopped`] with the cause.
///
/// # Example
///
/// ```rust,ignore
/// use notification_manager::{NotificationConfig, NotificationManager};
///
/// let manager = NotificationManager::builder()
///     .with_config(NotificationConfig::for_api_level(33))
///     .with_foreground_service(platform)
///     .with_link_factory(links)
///     .build()?;
///
/// manager.add_session(session.clone())?;
/// manager.update_notification(session.id().clone())?;
/// manager.flush()?;
/// ```
pub struct NotificationManager {
    /// Send commands to background worker
    command_tx: mpsc::UnboundedSender<Command>,

    /// Error that stopped the worker, if any
    failure: FailureSlot,

    config: NotificationConfig,

    /// Background worker handle (kept alive)
    _worker: JoinHandle<()>,
}

impl NotificationManager {
    pub fn builder() -> NotificationManagerBuilder {
        NotificationManagerBuilder::default()
    }

    /// Register a session; registering twice is a no-op
    pub fn add_session(&self, session: Arc<dyn MediaSession>) -> Result<()> {
        self.send(Command::AddSession(session))
    }

    /// Unregister a session and re-evaluate the foreground state
    pub fn remove_session(&self, session_id: SessionId) -> Result<()> {
        self.send(Command::RemoveSession(session_id))
    }

    /// Request a fresh notification for a session
    pub fn update_notification(&self, session_id: SessionId) -> Result<()> {
        self.send(Command::UpdateNotification(session_id))
    }

    /// Forward a notification action to a session
    pub fn on_custom_action(
        &self,
        session_id: SessionId,
        action: impl Into<String>,
        extras: Extras,
    ) -> Result<()> {
        self.send(Command::CustomAction {
            session_id,
            action: action.into(),
            extras,
        })
    }

    /// Block until queued commands, and the work they spawned, are processed
    pub fn flush(&self) -> Result<()> {
        let (ack, done) = std_mpsc::channel();
        self.send(Command::Barrier {
            ack,
            rounds: FLUSH_ROUNDS,
        })?;
        self.wait(done)
    }

    /// Current coordinator state, taken after everything queued so far
    pub fn snapshot(&self) -> Result<CoordinatorSnapshot> {
        let (reply, answer) = std_mpsc::channel();
        self.send(Command::Snapshot(reply))?;
        self.wait(answer)
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Whether the worker stopped after a fatal error
    pub fn failure(&self) -> Option<String> {
        self.failure.lock().clone()
    }

    /// Stop the worker; links of registered sessions are released
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }

    fn send(&self, command: Command) -> Result<()> {
        if let Some(cause) = self.failure() {
            return Err(NotificationError::WorkerStopped(cause));
        }
        self.command_tx
            .send(command)
            .map_err(|_| self.stopped_error())
    }

    fn wait<T>(&self, receiver: std_mpsc::Receiver<T>) -> Result<T> {
        receiver
            .recv_timeout(self.config.flush_timeout)
            .map_err(|e| match e {
                std_mpsc::RecvTimeoutError::Timeout => {
                    NotificationError::Timeout(self.config.flush_timeout)
                }
                std_mpsc::RecvTimeoutError::Disconnected => self.stopped_error(),
            })
    }

    fn stopped_error(&self) -> NotificationError {
        match self.failure() {
            Some(cause) => NotificationError::WorkerStopped(cause),
            None => NotificationError::WorkerDisconnected,
        }
    }
}

impl Drop for NotificationManager {
    fn drop(&mut self) {
        tracing::debug!("NotificationManager dropping");

        // Send shutdown command to worker
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

/// Builder for [`NotificationManager`]
///
/// The foreground service and the link factory must be supplied; the
/// provider, action factory and policy default from the configuration.
#[derive(Default)]
pub struct NotificationManagerBuilder {
    config: NotificationConfig,
    provider: Option<Arc<dyn NotificationProvider>>,
    platform: Option<Arc<dyn ForegroundService>>,
    link_factory: Option<Arc<dyn ControllerLinkFactory>>,
    action_factory: Option<Arc<dyn ActionFactory>>,
    policy: Option<Box<dyn ForegroundPolicy>>,
}

impl NotificationManagerBuilder {
    pub fn with_config(mut self, config: NotificationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn NotificationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_foreground_service(mut self, platform: Arc<dyn ForegroundService>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_link_factory(mut self, link_factory: Arc<dyn ControllerLinkFactory>) -> Self {
        self.link_factory = Some(link_factory);
        self
    }

    pub fn with_action_factory(mut self, action_factory: Arc<dyn ActionFactory>) -> Self {
        self.action_factory = Some(action_factory);
        self
    }

    /// Override the policy derived from the configured platform
    pub fn with_policy(mut self, policy: Box<dyn ForegroundPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Start the worker and return its handle
    pub fn build(self) -> Result<NotificationManager> {
        let platform = self
            .platform
            .ok_or(NotificationError::MissingComponent("foreground service"))?;
        let link_factory = self
            .link_factory
            .ok_or(NotificationError::MissingComponent("controller link factory"))?;

        let config = self.config;
        let provider: Arc<dyn NotificationProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(DefaultNotificationProvider::new(
                config.notification_id,
                config.channel_id.clone(),
            )),
        };
        let action_factory: Arc<dyn ActionFactory> = match self.action_factory {
            Some(action_factory) => action_factory,
            None => Arc::new(DefaultActionFactory),
        };
        let policy: Box<dyn ForegroundPolicy> = match self.policy {
            Some(policy) => policy,
            None => Box::new(VersionedPolicy::from_descriptor(&config.platform)),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| NotificationError::RuntimeInit(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let coordinator = NotificationCoordinator::new(
            Collaborators {
                provider,
                platform,
                policy,
                link_factory,
                action_factory,
            },
            command_tx.clone(),
        );

        let failure = FailureSlot::default();
        let worker = spawn_notification_worker(runtime, coordinator, command_rx, failure.clone())
            .map_err(|e| NotificationError::RuntimeInit(e.to_string()))?;

        tracing::debug!(
            "NotificationManager started for api level {}",
            config.platform.api_level
        );

        Ok(NotificationManager {
            command_tx,
            failure,
            config,
            _worker: worker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_platform() {
        let result = NotificationManager::builder().build();
        assert!(matches!(
            result,
            Err(NotificationError::MissingComponent("foreground service"))
        ));
    }
}
