//! Notification lifecycle coordinator
//!
//! Owns the foreground/background decision for every registered session and
//! the single "current notification" of the process. All state lives here and
//! is only touched from the worker thread, one command at a time.
//!
//! Renders are tagged with a [`NotificationSequence`] number when requested.
//! A render is applied only if its number is still the latest and its session
//! is still registered, so a slow provider can never resurrect a notification
//! after the service has demoted.

use std::collections::HashMap;
use std::sync::Arc;

use media_session::command::COMMAND_CODE_CUSTOM;
use media_session::{Extras, MediaSession, PlayerEvent, SessionFault, SessionId};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{NotificationError, Result};
use crate::link::{
    ControllerLinkFactory, LinkState, SessionController, SessionEvent, SessionEventSender,
};
use crate::notification::{
    ActionFactory, CommandButton, MediaNotification, NotificationCallback, NotificationId,
    NotificationProvider, EXTRA_MEDIA_SESSION,
};
use crate::platform::ForegroundService;
use crate::policy::{should_show_notification, ForegroundPolicy};
use crate::sequence::NotificationSequence;
use crate::worker::{Command, PendingWork};

/// Player events that change what the notification shows
const REFRESH_EVENTS: [PlayerEvent; 4] = [
    PlayerEvent::PlaybackStateChanged,
    PlayerEvent::PlayWhenReadyChanged,
    PlayerEvent::MediaMetadataChanged,
    PlayerEvent::TimelineChanged,
];

/// Whether the host service currently runs in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ForegroundState {
    Background,
    Foreground,
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    /// Registered sessions, sorted by id
    pub sessions: Vec<SessionId>,
    /// Sessions whose control link is established, sorted by id
    pub connected: Vec<SessionId>,
    pub foreground: ForegroundState,
    pub current_notification: Option<NotificationId>,
    pub latest_sequence: u64,
}

/// Per-session bookkeeping
struct SessionState {
    session: Arc<dyn MediaSession>,
    custom_layout: Vec<CommandButton>,
    link: LinkState,
    generation: u64,
}

/// External collaborators of the coordinator
pub(crate) struct Collaborators {
    pub provider: Arc<dyn NotificationProvider>,
    pub platform: Arc<dyn ForegroundService>,
    pub policy: Box<dyn ForegroundPolicy>,
    pub link_factory: Arc<dyn ControllerLinkFactory>,
    pub action_factory: Arc<dyn ActionFactory>,
}

/// Foreground state machine over all registered sessions
pub(crate) struct NotificationCoordinator {
    provider: Arc<dyn NotificationProvider>,
    platform: Arc<dyn ForegroundService>,
    policy: Box<dyn ForegroundPolicy>,
    link_factory: Arc<dyn ControllerLinkFactory>,
    action_factory: Arc<dyn ActionFactory>,
    commands: mpsc::UnboundedSender<Command>,
    pending: PendingWork,
    sessions: HashMap<SessionId, SessionState>,
    sequence: NotificationSequence,
    current: Option<MediaNotification>,
    foreground: ForegroundState,
    next_generation: u64,
}

impl NotificationCoordinator {
    pub fn new(collaborators: Collaborators, commands: mpsc::UnboundedSender<Command>) -> Self {
        let Collaborators {
            provider,
            platform,
            policy,
            link_factory,
            action_factory,
        } = collaborators;

        Self {
            provider,
            platform,
            policy,
            link_factory,
            action_factory,
            commands,
            pending: PendingWork::new(),
            sessions: HashMap::new(),
            sequence: NotificationSequence::new(),
            current: None,
            foreground: ForegroundState::Background,
            next_generation: 0,
        }
    }

    /// Sender feeding this coordinator's worker
    pub fn commands(&self) -> &mpsc::UnboundedSender<Command> {
        &self.commands
    }

    /// Futures spawned while handling commands
    pub fn pending(&self) -> &PendingWork {
        &self.pending
    }

    /// Process one command
    ///
    /// Only a platform constraint violation is returned as an error; it
    /// means the host is misconfigured and the coordinator must stop.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::AddSession(session) => {
                self.add_session(session);
                Ok(())
            }
            Command::RemoveSession(session_id) => {
                self.remove_session(&session_id);
                Ok(())
            }
            Command::UpdateNotification(session_id) => self.update_notification(&session_id),
            Command::CustomAction {
                session_id,
                action,
                extras,
            } => {
                self.on_custom_action(&session_id, &action, &extras);
                Ok(())
            }
            Command::NotificationUpdated {
                sequence,
                session_id,
                notification,
            } => self.on_notification_updated(sequence, &session_id, notification),
            Command::LinkReady {
                session_id,
                generation,
                result,
            } => self.on_link_ready(&session_id, generation, result),
            Command::SessionEvent {
                session_id,
                generation,
                event,
            } => self.on_session_event(&session_id, generation, event),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
                Ok(())
            }
            Command::Barrier { ack, .. } => {
                let _ = ack.send(());
                Ok(())
            }
            Command::Shutdown => {
                self.release_all();
                Ok(())
            }
        }
    }

    /// Register a session and start connecting its control link
    pub fn add_session(&mut self, session: Arc<dyn MediaSession>) {
        let session_id = session.id().clone();
        if self.sessions.contains_key(&session_id) {
            tracing::debug!("Session {} already registered", session_id);
            return;
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let events = SessionEventSender::new(session_id.clone(), generation, self.commands.clone());
        let connecting = self.link_factory.connect(&session, events);
        let commands = self.commands.clone();
        let ready_id = session_id.clone();
        self.pending.spawn(async move {
            let result = connecting.await;
            let _ = commands.send(Command::LinkReady {
                session_id: ready_id,
                generation,
                result,
            });
        });

        self.sessions.insert(
            session_id.clone(),
            SessionState {
                session,
                custom_layout: Vec::new(),
                link: LinkState::Pending,
                generation,
            },
        );
        tracing::debug!("Registered session {}", session_id);
    }

    /// Forget a session, release its link and re-evaluate the foreground
    pub fn remove_session(&mut self, session_id: &SessionId) {
        let Some(state) = self.sessions.remove(session_id) else {
            return;
        };
        if let Some(controller) = state.link.controller() {
            controller.release();
        }
        tracing::debug!("Unregistered session {}", session_id);

        self.maybe_stop_foreground(true);
    }

    /// Forget a session that went away on its own and tell the link factory
    fn drop_session(&mut self, session_id: &SessionId) {
        let Some(generation) = self.sessions.get(session_id).map(|s| s.generation) else {
            return;
        };
        self.remove_session(session_id);
        self.link_factory.session_dropped(session_id, generation);
    }

    /// Request a fresh render for a session
    pub fn update_notification(&mut self, session_id: &SessionId) -> Result<()> {
        let Some(state) = self.sessions.get(session_id) else {
            tracing::debug!(
                "Notification update for unknown session {}",
                session_id
            );
            self.maybe_stop_foreground(true);
            return Ok(());
        };
        if !should_show_notification(&state.session.player_state()) {
            self.maybe_stop_foreground(true);
            return Ok(());
        }

        let session = Arc::clone(&state.session);
        let sequence = self.sequence.next();
        let callback =
            NotificationCallback::new(sequence, session_id.clone(), self.commands.clone());
        let notification = self.provider.create_notification(
            &session,
            &state.custom_layout,
            self.action_factory.as_ref(),
            callback,
        );

        self.apply_notification(&session, notification)
    }

    /// A provider delivered a render after the fact
    pub fn on_notification_updated(
        &mut self,
        sequence: u64,
        session_id: &SessionId,
        notification: MediaNotification,
    ) -> Result<()> {
        if !self.sequence.is_latest(sequence) {
            tracing::debug!(
                "Dropping stale notification for {} (seq {} < {})",
                session_id,
                sequence,
                self.sequence.latest()
            );
            return Ok(());
        }
        let Some(state) = self.sessions.get(session_id) else {
            tracing::debug!("Dropping notification for unregistered session {}", session_id);
            return Ok(());
        };

        let session = Arc::clone(&state.session);
        self.apply_notification(&session, notification)
    }

    fn apply_notification(
        &mut self,
        session: &Arc<dyn MediaSession>,
        mut media_notification: MediaNotification,
    ) -> Result<()> {
        if self.policy.attaches_session_token() {
            media_notification
                .notification
                .extras
                .put_string(EXTRA_MEDIA_SESSION, session.session_token());
        }

        let MediaNotification {
            notification_id,
            notification,
        } = &media_notification;

        if self.policy.should_run_in_foreground(&session.player_state()) {
            self.platform.start_foreground_service();
            self.platform
                .start_foreground(
                    *notification_id,
                    notification,
                    self.policy.foreground_service_type(),
                )
                .map_err(|e| NotificationError::PlatformConstraint(e.to_string()))?;
            if self.foreground == ForegroundState::Background {
                tracing::info!("Promoted to foreground for session {}", session.id());
            }
            self.foreground = ForegroundState::Foreground;
        } else {
            // Demote first; a legacy stop would take a freshly posted
            // notification with it
            self.maybe_stop_foreground(false);
            self.platform.notify(*notification_id, notification);
        }

        self.current = Some(media_notification);
        Ok(())
    }

    /// Leave the foreground unless some registered session still needs it
    fn maybe_stop_foreground(&mut self, remove_notification: bool) {
        let still_required = self
            .sessions
            .values()
            .any(|state| self.policy.should_run_in_foreground(&state.session.player_state()));
        if still_required {
            return;
        }

        if self.foreground == ForegroundState::Foreground {
            self.platform
                .stop_foreground(self.policy.stop_mode(remove_notification));
            self.foreground = ForegroundState::Background;
            tracing::info!("Left foreground (remove notification: {})", remove_notification);
        }

        if remove_notification {
            if let Some(current) = self.current.take() {
                self.platform.cancel(current.notification_id);
                self.sequence.invalidate();
            }
        }
    }

    /// Route a notification action to the session
    pub fn on_custom_action(&mut self, session_id: &SessionId, action: &str, extras: &Extras) {
        let Some(state) = self.sessions.get(session_id) else {
            return;
        };
        let Some(controller) = state.link.controller() else {
            tracing::debug!("Custom action {} before {} was connected", action, session_id);
            return;
        };

        if self
            .provider
            .handle_custom_command(&state.session, action, extras)
        {
            return;
        }

        let available = controller.available_session_commands();
        let Some(command) = available
            .iter()
            .find(|c| c.command_code == COMMAND_CODE_CUSTOM && c.custom_action == action)
        else {
            tracing::debug!("No custom command {} available on {}", action, session_id);
            return;
        };

        let pending = controller.send_custom_command(command, Extras::new());
        let session_id = session_id.clone();
        let action = action.to_string();
        self.pending.spawn(async move {
            match pending.await {
                Ok(result) if result.code.is_success() => {
                    tracing::debug!("Custom command {} handled by {}", action, session_id);
                }
                Ok(result) => {
                    tracing::warn!(
                        "Custom command {} rejected by {}: {:?}",
                        action,
                        session_id,
                        result.code
                    );
                }
                Err(e) => {
                    tracing::warn!("Custom command {} failed on {}: {}", action, session_id, e);
                }
            }
        });
    }

    fn on_link_ready(
        &mut self,
        session_id: &SessionId,
        generation: u64,
        result: std::result::Result<Arc<dyn SessionController>, SessionFault>,
    ) -> Result<()> {
        let Some(state) = self
            .sessions
            .get_mut(session_id)
            .filter(|state| state.generation == generation)
        else {
            if let Ok(controller) = result {
                controller.release();
            }
            return Ok(());
        };

        match result {
            Ok(controller) => {
                state.link = LinkState::Connected(controller);
                tracing::debug!("Control link ready for {}", session_id);
                if should_show_notification(&state.session.player_state()) {
                    return self.update_notification(session_id);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Control link for {} failed: {}", session_id, e);
                self.drop_session(session_id);
                Ok(())
            }
        }
    }

    fn on_session_event(
        &mut self,
        session_id: &SessionId,
        generation: u64,
        event: SessionEvent,
    ) -> Result<()> {
        let Some(state) = self
            .sessions
            .get_mut(session_id)
            .filter(|state| state.generation == generation)
        else {
            return Ok(());
        };

        match event {
            SessionEvent::Connected => {
                if should_show_notification(&state.session.player_state()) {
                    return self.update_notification(session_id);
                }
                Ok(())
            }
            SessionEvent::CustomLayoutChanged(layout) => {
                state.custom_layout = layout;
                self.update_notification(session_id)
            }
            SessionEvent::PlayerEvents(events) => {
                if !state.link.is_connected() {
                    return Ok(());
                }
                if events.contains_any(&REFRESH_EVENTS) {
                    return self.update_notification(session_id);
                }
                Ok(())
            }
            SessionEvent::Disconnected => {
                self.drop_session(session_id);
                Ok(())
            }
        }
    }

    /// Release every link; used when the worker stops
    pub fn release_all(&mut self) {
        for (_, state) in self.sessions.drain() {
            if let Some(controller) = state.link.controller() {
                controller.release();
            }
        }
    }

    pub fn is_registered(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn foreground_state(&self) -> ForegroundState {
        self.foreground
    }

    pub fn current_notification(&self) -> Option<&MediaNotification> {
        self.current.as_ref()
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let mut sessions: Vec<SessionId> = self.sessions.keys().cloned().collect();
        sessions.sort();
        let connected = sessions
            .iter()
            .filter(|id| self.sessions.get(*id).is_some_and(|s| s.link.is_connected()))
            .cloned()
            .collect();
        CoordinatorSnapshot {
            sessions,
            connected,
            foreground: self.foreground,
            current_notification: self.current.as_ref().map(|n| n.notification_id),
            latest_sequence: self.sequence.latest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{DefaultActionFactory, DefaultNotificationProvider, Notification};
    use crate::platform::{
        ForegroundServiceType, PlatformDescriptor, PlatformError, StopForegroundMode,
    };
    use crate::policy::VersionedPolicy;
    use futures::FutureExt;
    use media_session::{
        PlayerEvents, PlayerState, ResultCode, SessionCommand, SessionCommands, SessionFuture,
        SessionResult,
    };
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSession {
        id: SessionId,
        player: Mutex<PlayerState>,
    }

    impl FakeSession {
        fn new(id: &str, player: PlayerState) -> Arc<Self> {
            Arc::new(Self {
                id: SessionId::new(id),
                player: Mutex::new(player),
            })
        }
    }

    impl MediaSession for FakeSession {
        fn id(&self) -> &SessionId {
            &self.id
        }

        fn player_state(&self) -> PlayerState {
            *self.player.lock()
        }

        fn session_token(&self) -> String {
            format!("token-{}", self.id)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum PlatformCall {
        StartService,
        StartForeground(NotificationId, Option<ForegroundServiceType>),
        StopForeground(StopForegroundMode),
        Notify(NotificationId),
        Cancel(NotificationId),
    }

    #[derive(Default)]
    struct FakePlatform {
        calls: Mutex<Vec<PlatformCall>>,
        reject: bool,
    }

    impl FakePlatform {
        fn take(&self) -> Vec<PlatformCall> {
            std::mem::take(&mut *self.calls.lock())
        }
    }

    impl ForegroundService for FakePlatform {
        fn start_foreground_service(&self) {
            self.calls.lock().push(PlatformCall::StartService);
        }

        fn start_foreground(
            &self,
            notification_id: NotificationId,
            _notification: &Notification,
            service_type: Option<ForegroundServiceType>,
        ) -> std::result::Result<(), PlatformError> {
            if self.reject {
                return Err(PlatformError("missing mediaPlayback type".to_string()));
            }
            self.calls
                .lock()
                .push(PlatformCall::StartForeground(notification_id, service_type));
            Ok(())
        }

        fn stop_foreground(&self, mode: StopForegroundMode) {
            self.calls.lock().push(PlatformCall::StopForeground(mode));
        }

        fn notify(&self, notification_id: NotificationId, _notification: &Notification) {
            self.calls.lock().push(PlatformCall::Notify(notification_id));
        }

        fn cancel(&self, notification_id: NotificationId) {
            self.calls.lock().push(PlatformCall::Cancel(notification_id));
        }
    }

    struct FakeController {
        commands: SessionCommands,
        sent: AtomicUsize,
        released: AtomicUsize,
    }

    impl SessionController for FakeController {
        fn available_session_commands(&self) -> SessionCommands {
            self.commands.clone()
        }

        fn send_custom_command(
            &self,
            _command: &SessionCommand,
            _extras: Extras,
        ) -> SessionFuture<SessionResult> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(SessionResult::new(ResultCode::Success))).boxed()
        }

        fn release(&self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeLinks {
        controller: Arc<FakeController>,
        connects: AtomicUsize,
        fail: bool,
    }

    impl ControllerLinkFactory for FakeLinks {
        fn connect(
            &self,
            _session: &Arc<dyn MediaSession>,
            _events: SessionEventSender,
        ) -> SessionFuture<Arc<dyn SessionController>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return futures::future::ready(Err(SessionFault::Cancelled)).boxed();
            }
            let controller: Arc<dyn SessionController> = self.controller.clone();
            futures::future::ready(Ok(controller)).boxed()
        }
    }

    struct Harness {
        coordinator: NotificationCoordinator,
        rx: mpsc::UnboundedReceiver<Command>,
        platform: Arc<FakePlatform>,
        links: Arc<FakeLinks>,
    }

    impl Harness {
        fn new(api_level: u32) -> Self {
            Self::build(api_level, FakePlatform::default(), false)
        }

        fn build(api_level: u32, platform: FakePlatform, fail_links: bool) -> Self {
            let platform = Arc::new(platform);
            let links = Arc::new(FakeLinks {
                controller: Arc::new(FakeController {
                    commands: SessionCommands::new()
                        .with(SessionCommand::custom("like", Extras::new())),
                    sent: AtomicUsize::new(0),
                    released: AtomicUsize::new(0),
                }),
                connects: AtomicUsize::new(0),
                fail: fail_links,
            });
            let (tx, rx) = mpsc::unbounded_channel();
            let coordinator = NotificationCoordinator::new(
                Collaborators {
                    provider: Arc::new(DefaultNotificationProvider::default()),
                    platform: platform.clone(),
                    policy: Box::new(VersionedPolicy::from_descriptor(&PlatformDescriptor::new(
                        api_level,
                    ))),
                    link_factory: links.clone(),
                    action_factory: Arc::new(DefaultActionFactory),
                },
                tx,
            );
            Self {
                coordinator,
                rx,
                platform,
                links,
            }
        }

        /// Run spawned tasks and feed what they sent back into the coordinator
        async fn settle(&mut self) -> Result<()> {
            for _ in 0..4 {
                tokio::task::yield_now().await;
                while let Ok(cmd) = self.rx.try_recv() {
                    self.coordinator.handle(cmd)?;
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let mut h = Harness::new(33);
        let session: Arc<dyn MediaSession> = FakeSession::new("music", PlayerState::idle());

        h.coordinator.add_session(session.clone());
        h.coordinator.add_session(session);
        h.settle().await.unwrap();

        assert_eq!(h.links.connects.load(Ordering::SeqCst), 1);
        assert_eq!(h.coordinator.snapshot().sessions, vec![SessionId::new("music")]);
    }

    #[tokio::test]
    async fn test_link_ready_refreshes_showable_session() {
        let mut h = Harness::new(33);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::playing()));
        h.settle().await.unwrap();

        assert_eq!(h.coordinator.foreground_state(), ForegroundState::Foreground);
        assert_eq!(h.coordinator.snapshot().connected, vec![SessionId::new("music")]);
        let current = h.coordinator.current_notification().unwrap();
        assert_eq!(
            current.notification.extras.get_string(EXTRA_MEDIA_SESSION).unwrap(),
            Some("token-music")
        );
        assert_eq!(
            h.platform.take(),
            vec![
                PlatformCall::StartService,
                PlatformCall::StartForeground(
                    NotificationId(1001),
                    Some(ForegroundServiceType::MediaPlayback)
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_serializes() {
        let mut h = Harness::new(33);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::playing()));
        h.settle().await.unwrap();

        let json = serde_json::to_value(h.coordinator.snapshot()).unwrap();
        assert_eq!(json["current_notification"], 1001);
        assert_eq!(json["foreground"], "Foreground");
        assert_eq!(json["connected"][0], "music");
    }

    #[tokio::test]
    async fn test_hidden_session_stops_foreground_and_cancels() {
        let mut h = Harness::new(33);
        let session = FakeSession::new("music", PlayerState::playing());
        h.coordinator.add_session(session.clone());
        h.settle().await.unwrap();
        h.platform.take();
        let before = h.coordinator.snapshot().latest_sequence;

        *session.player.lock() = PlayerState::idle();
        h.coordinator
            .update_notification(&SessionId::new("music"))
            .unwrap();

        assert_eq!(
            h.platform.take(),
            vec![
                PlatformCall::StopForeground(StopForegroundMode::Remove),
                PlatformCall::Cancel(NotificationId(1001)),
            ]
        );
        assert!(h.coordinator.current_notification().is_none());
        assert!(h.coordinator.snapshot().latest_sequence > before);
    }

    #[tokio::test]
    async fn test_paused_session_on_older_platform_posts_without_foreground() {
        let mut h = Harness::new(29);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::paused()));
        h.settle().await.unwrap();

        assert_eq!(h.coordinator.foreground_state(), ForegroundState::Background);
        assert_eq!(h.platform.take(), vec![PlatformCall::Notify(NotificationId(1001))]);
    }

    #[tokio::test]
    async fn test_stale_render_is_dropped() {
        let mut h = Harness::new(33);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::playing()));
        h.settle().await.unwrap();

        let stale = h.coordinator.snapshot().latest_sequence;
        h.coordinator
            .update_notification(&SessionId::new("music"))
            .unwrap();
        h.platform.take();

        let late = MediaNotification::new(NotificationId(7), Notification::new("late"));
        h.coordinator
            .on_notification_updated(stale, &SessionId::new("music"), late)
            .unwrap();

        assert!(h.platform.take().is_empty());
        assert_eq!(
            h.coordinator.current_notification().unwrap().notification_id,
            NotificationId(1001)
        );
    }

    #[tokio::test]
    async fn test_platform_rejection_is_fatal() {
        let platform = FakePlatform {
            reject: true,
            ..Default::default()
        };
        let mut h = Harness::build(33, platform, false);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::playing()));

        let error = h.settle().await.unwrap_err();
        assert!(matches!(error, NotificationError::PlatformConstraint(_)));
    }

    #[tokio::test]
    async fn test_link_failure_deregisters() {
        let mut h = Harness::build(33, FakePlatform::default(), true);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::playing()));
        h.settle().await.unwrap();

        assert!(!h.coordinator.is_registered(&SessionId::new("music")));
        assert!(h.platform.take().is_empty());
    }

    #[tokio::test]
    async fn test_custom_action_dispatch() {
        let mut h = Harness::new(33);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::idle()));
        let id = SessionId::new("music");

        // Not connected yet: ignored
        h.coordinator.on_custom_action(&id, "like", &Extras::new());
        h.settle().await.unwrap();
        assert_eq!(h.links.controller.sent.load(Ordering::SeqCst), 0);

        h.coordinator.on_custom_action(&id, "like", &Extras::new());
        h.coordinator.on_custom_action(&id, "unknown", &Extras::new());
        h.settle().await.unwrap();
        assert_eq!(h.links.controller.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_player_events_trigger_refresh() {
        let mut h = Harness::new(33);
        let session = FakeSession::new("music", PlayerState::idle());
        h.coordinator.add_session(session.clone());
        h.settle().await.unwrap();
        assert!(h.platform.take().is_empty());

        *session.player.lock() = PlayerState::playing();
        let events =
            SessionEventSender::new(SessionId::new("music"), 0, h.coordinator.commands().clone());

        events.send(SessionEvent::PlayerEvents(PlayerEvents::from([
            PlayerEvent::RepeatModeChanged,
        ])));
        h.settle().await.unwrap();
        assert!(h.platform.take().is_empty());

        events.send(SessionEvent::PlayerEvents(PlayerEvents::from([
            PlayerEvent::PlayWhenReadyChanged,
        ])));
        h.settle().await.unwrap();
        assert_eq!(h.coordinator.foreground_state(), ForegroundState::Foreground);
    }

    #[tokio::test]
    async fn test_disconnect_event_releases_link() {
        let mut h = Harness::new(33);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::idle()));
        h.settle().await.unwrap();

        let events =
            SessionEventSender::new(SessionId::new("music"), 0, h.coordinator.commands().clone());
        events.send(SessionEvent::Disconnected);
        h.settle().await.unwrap();

        assert!(!h.coordinator.is_registered(&SessionId::new("music")));
        assert_eq!(h.links.controller.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_events_from_previous_registration_are_ignored() {
        let mut h = Harness::new(33);
        let id = SessionId::new("music");
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::idle()));
        h.settle().await.unwrap();
        h.coordinator.remove_session(&id);
        h.coordinator
            .add_session(FakeSession::new("music", PlayerState::idle()));
        h.settle().await.unwrap();

        let old = SessionEventSender::new(id.clone(), 0, h.coordinator.commands().clone());
        old.send(SessionEvent::Disconnected);
        h.settle().await.unwrap();

        assert!(h.coordinator.is_registered(&id));
    }
}
