//! In-process control links for library sessions
//!
//! Connects the notification coordinator to sessions living in the same
//! process. Connecting asks the session to accept a notification controller
//! on its handler; custom commands run through
//! [`LibrarySession::custom_command`], also on the handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use media_session::{
    CallerInfo, Extras, LibrarySession, MediaSession, RemoteIdentity, SessionCommand,
    SessionCommands, SessionFault, SessionFuture, SessionHandler, SessionId, SessionResult,
};
use notification_manager::{
    ControllerLinkFactory, SessionController, SessionEvent, SessionEventSender,
};
use tokio::sync::oneshot;

/// Connection hint marking the notification controller
pub const KEY_MEDIA_NOTIFICATION_CONTROLLER_FLAG: &str =
    "androidx.media3.session.MediaNotificationManager";

/// Package name the notification controller connects as
pub const NOTIFICATION_CONTROLLER_PACKAGE: &str = "media_bridge.notification";

struct LinkedSession {
    session: Arc<dyn LibrarySession>,
    handler: SessionHandler,
    events: Option<SessionEventSender>,
}

/// Called with the id of a session the coordinator dropped on its own
pub type DropListener = Box<dyn Fn(&SessionId) + Send + Sync>;

/// Link factory for sessions registered in this process
#[derive(Default)]
pub struct LocalLinkFactory {
    sessions: DashMap<SessionId, LinkedSession>,
    on_dropped: Option<DropListener>,
}

impl LocalLinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory that reports sessions whose link failed or which disconnected
    pub fn with_drop_listener(listener: impl Fn(&SessionId) + Send + Sync + 'static) -> Self {
        Self {
            sessions: DashMap::new(),
            on_dropped: Some(Box::new(listener)),
        }
    }

    /// Make a session reachable; must happen before the coordinator sees it
    pub fn register(&self, session: Arc<dyn LibrarySession>, handler: SessionHandler) {
        self.sessions.insert(
            session.id().clone(),
            LinkedSession {
                session,
                handler,
                events: None,
            },
        );
    }

    pub fn unregister(&self, session_id: &SessionId) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Forward a session event to the coordinator
    ///
    /// Returns `false` when the session has no established link.
    pub fn send_event(&self, session_id: &SessionId, event: SessionEvent) -> bool {
        let Some(sender) = self
            .sessions
            .get(session_id)
            .and_then(|linked| linked.events.clone())
        else {
            tracing::debug!("No control link for {}, dropping {:?}", session_id, event);
            return false;
        };
        sender.send(event)
    }

    fn notification_caller() -> CallerInfo {
        let mut caller = CallerInfo::new(RemoteIdentity::new(
            NOTIFICATION_CONTROLLER_PACKAGE,
            std::process::id(),
        ));
        caller.trusted = true;
        caller
            .connection_hints
            .put_bool(KEY_MEDIA_NOTIFICATION_CONTROLLER_FLAG, true);
        caller
    }
}

impl ControllerLinkFactory for LocalLinkFactory {
    fn connect(
        &self,
        session: &Arc<dyn MediaSession>,
        events: SessionEventSender,
    ) -> SessionFuture<Arc<dyn SessionController>> {
        let Some(mut linked) = self.sessions.get_mut(session.id()) else {
            return futures::future::ready(Err(SessionFault::Execution(format!(
                "session {} is not registered",
                session.id()
            ))))
            .boxed();
        };
        linked.events = Some(events);

        let library = Arc::clone(&linked.session);
        let handler = linked.handler.clone();
        drop(linked);

        let caller = Self::notification_caller();
        let (tx, rx) = oneshot::channel();
        let connecting = Arc::clone(&library);
        let connecting_caller = caller.clone();
        let posted = handler.post(move || {
            let _ = tx.send(connecting.on_connect(&connecting_caller));
        });
        if posted.is_err() {
            return futures::future::ready(Err(SessionFault::Cancelled)).boxed();
        }

        let session_id = session.id().clone();
        async move {
            match rx.await {
                Ok(Some(commands)) => {
                    tracing::debug!("Notification controller connected to {}", session_id);
                    let controller: Arc<dyn SessionController> = Arc::new(LocalController {
                        session: library,
                        handler,
                        caller,
                        commands,
                        released: AtomicBool::new(false),
                    });
                    Ok(controller)
                }
                Ok(None) => Err(SessionFault::Execution(format!(
                    "session {} rejected the notification controller",
                    session_id
                ))),
                Err(_) => Err(SessionFault::Cancelled),
            }
        }
        .boxed()
    }

    fn session_dropped(&self, session_id: &SessionId, generation: u64) {
        // A newer registration of the same id keeps its entry
        let removed = self.sessions.remove_if(session_id, |_, linked| {
            linked
                .events
                .as_ref()
                .is_some_and(|events| events.generation() == generation)
        });
        if removed.is_none() {
            return;
        }

        tracing::info!("Session {} dropped by the notification coordinator", session_id);
        if let Some(listener) = &self.on_dropped {
            listener(session_id);
        }
    }
}

/// Controller talking to a session through its handler
struct LocalController {
    session: Arc<dyn LibrarySession>,
    handler: SessionHandler,
    caller: CallerInfo,
    commands: SessionCommands,
    released: AtomicBool,
}

impl SessionController for LocalController {
    fn available_session_commands(&self) -> SessionCommands {
        self.commands.clone()
    }

    fn send_custom_command(
        &self,
        command: &SessionCommand,
        extras: Extras,
    ) -> SessionFuture<SessionResult> {
        if self.released.load(Ordering::SeqCst) {
            return futures::future::ready(Err(SessionFault::Cancelled)).boxed();
        }

        let (tx, rx) = oneshot::channel();
        let session = Arc::clone(&self.session);
        let handler = self.handler.clone();
        let caller = self.caller.clone();
        let command = command.clone();
        let posted = self.handler.post(move || {
            let pending = session.custom_command(&caller, &command, extras);
            handler.spawn_task(async move {
                let _ = tx.send(pending.await);
            });
        });
        if posted.is_err() {
            return futures::future::ready(Err(SessionFault::Cancelled)).boxed();
        }

        async move { rx.await.unwrap_or(Err(SessionFault::Cancelled)) }.boxed()
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            tracing::debug!("Released notification controller for {}", self.session.id());
        }
    }
}
