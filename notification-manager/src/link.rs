//! Per-session control links
//!
//! The coordinator observes each session through a controller connected to
//! it. Connecting is asynchronous; once connected, the link reports session
//! events through a [`SessionEventSender`] and lets the coordinator run the
//! session's custom commands.

use std::sync::Arc;

use media_session::{
    Extras, MediaSession, PlayerEvents, SessionCommand, SessionCommands, SessionFuture, SessionId,
    SessionResult,
};
use tokio::sync::mpsc;

use crate::notification::CommandButton;
use crate::worker::Command;

/// Something that happened to a linked session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    CustomLayoutChanged(Vec<CommandButton>),
    PlayerEvents(PlayerEvents),
}

/// A connected controller of one session
pub trait SessionController: Send + Sync + 'static {
    /// Commands the session currently allows this controller
    fn available_session_commands(&self) -> SessionCommands;

    fn send_custom_command(
        &self,
        command: &SessionCommand,
        extras: Extras,
    ) -> SessionFuture<SessionResult>;

    /// Disconnect and free the controller
    fn release(&self);
}

/// Establishes control links to sessions
pub trait ControllerLinkFactory: Send + Sync + 'static {
    /// Connect to `session`, reporting its events through `events`
    ///
    /// A fault means the session went away before the link was ready.
    fn connect(
        &self,
        session: &Arc<dyn MediaSession>,
        events: SessionEventSender,
    ) -> SessionFuture<Arc<dyn SessionController>>;

    /// The coordinator dropped a session whose link failed or which
    /// disconnected; `generation` matches [`SessionEventSender::generation`]
    fn session_dropped(&self, _session_id: &SessionId, _generation: u64) {}
}

/// Ordered event channel from one linked session to the coordinator
#[derive(Clone)]
pub struct SessionEventSender {
    session_id: SessionId,
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionEventSender {
    pub(crate) fn new(
        session_id: SessionId,
        generation: u64,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            session_id,
            generation,
            commands,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Registration this sender belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report an event; returns `false` once the coordinator has stopped
    pub fn send(&self, event: SessionEvent) -> bool {
        self.commands
            .send(Command::SessionEvent {
                session_id: self.session_id.clone(),
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

impl std::fmt::Debug for SessionEventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEventSender")
            .field("session_id", &self.session_id)
            .field("generation", &self.generation)
            .finish()
    }
}

/// State of a session's link as tracked by the coordinator
pub(crate) enum LinkState {
    Pending,
    Connected(Arc<dyn SessionController>),
}

impl LinkState {
    pub fn controller(&self) -> Option<&Arc<dyn SessionController>> {
        match self {
            LinkState::Pending => None,
            LinkState::Connected(controller) => Some(controller),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected(_))
    }
}
