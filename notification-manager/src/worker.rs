//! Background worker thread for the notification coordinator
//!
//! The coordinator runs on a dedicated thread with its own single-threaded
//! tokio runtime. Every state transition arrives as a [`Command`] on one
//! ordered channel, so register, unregister, render and foreground changes
//! never race each other.

use std::future::Future;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use media_session::{Extras, MediaSession, SessionFault, SessionId};
use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

use crate::coordinator::{CoordinatorSnapshot, NotificationCoordinator};
use crate::link::{SessionController, SessionEvent};
use crate::notification::MediaNotification;

/// Commands processed by the coordinator worker
pub(crate) enum Command {
    AddSession(Arc<dyn MediaSession>),
    RemoveSession(SessionId),
    UpdateNotification(SessionId),
    CustomAction {
        session_id: SessionId,
        action: String,
        extras: Extras,
    },
    /// A provider delivered a render after `create_notification` returned
    NotificationUpdated {
        sequence: u64,
        session_id: SessionId,
        notification: MediaNotification,
    },
    /// A control link finished connecting
    LinkReady {
        session_id: SessionId,
        generation: u64,
        result: Result<Arc<dyn SessionController>, SessionFault>,
    },
    SessionEvent {
        session_id: SessionId,
        generation: u64,
        event: SessionEvent,
    },
    Snapshot(std_mpsc::Sender<CoordinatorSnapshot>),
    /// Acknowledged once everything queued before it has been handled and
    /// no spawned work is left to report back
    Barrier {
        ack: std_mpsc::Sender<()>,
        rounds: u8,
    },
    Shutdown,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddSession(session) => write!(f, "AddSession({})", session.id()),
            Command::RemoveSession(id) => write!(f, "RemoveSession({id})"),
            Command::UpdateNotification(id) => write!(f, "UpdateNotification({id})"),
            Command::CustomAction {
                session_id, action, ..
            } => write!(f, "CustomAction({session_id}, {action})"),
            Command::NotificationUpdated {
                sequence,
                session_id,
                ..
            } => write!(f, "NotificationUpdated({session_id}, seq={sequence})"),
            Command::LinkReady {
                session_id, result, ..
            } => write!(f, "LinkReady({session_id}, ok={})", result.is_ok()),
            Command::SessionEvent {
                session_id, event, ..
            } => write!(f, "SessionEvent({session_id}, {event:?})"),
            Command::Snapshot(_) => f.write_str("Snapshot"),
            Command::Barrier { rounds, .. } => write!(f, "Barrier(rounds={rounds})"),
            Command::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Slot holding the error that stopped the worker, if any
pub(crate) type FailureSlot = Arc<Mutex<Option<String>>>;

/// Futures spawned by the coordinator that have not finished yet
///
/// Tracked futures report back with a command before they count as done, so
/// a barrier that waits for zero also waits for those commands.
#[derive(Clone)]
pub(crate) struct PendingWork {
    count: Arc<watch::Sender<usize>>,
}

impl PendingWork {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Spawn `future` on the current runtime and track it until it ends
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.count.send_modify(|n| *n += 1);
        let guard = PendingGuard {
            count: Arc::clone(&self.count),
        };
        tokio::spawn(async move {
            let _guard = guard;
            future.await;
        });
    }

    pub fn in_flight(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolves once no tracked future is running
    pub async fn idle(&self) {
        let mut count = self.count.subscribe();
        let _ = count.wait_for(|n| *n == 0).await;
    }
}

/// Decrements the in-flight count even if the future panics
struct PendingGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Spawns the coordinator worker thread
///
/// The runtime is created by the caller so that a failure to build it is
/// reported before any thread exists.
pub(crate) fn spawn_notification_worker(
    runtime: Runtime,
    coordinator: NotificationCoordinator,
    command_rx: mpsc::UnboundedReceiver<Command>,
    failure: FailureSlot,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("notification-worker".to_string())
        .spawn(move || {
            runtime.block_on(run_command_loop(coordinator, command_rx, failure));
        })
}

/// Main loop running inside the worker runtime
async fn run_command_loop(
    mut coordinator: NotificationCoordinator,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    failure: FailureSlot,
) {
    tracing::info!("Notification worker started");

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            Command::Shutdown => {
                tracing::info!("Notification worker received shutdown command");
                break;
            }
            Command::Barrier { ack, rounds } => {
                // Let spawned link and command futures run before answering
                tokio::task::yield_now().await;
                let pending = coordinator.pending().clone();
                if pending.in_flight() > 0 {
                    // Some of them wait on other threads; check again after
                    // they have reported back
                    let commands = coordinator.commands().clone();
                    tokio::spawn(async move {
                        pending.idle().await;
                        let _ = commands.send(Command::Barrier { ack, rounds });
                    });
                } else if rounds == 0 {
                    let _ = ack.send(());
                } else if coordinator
                    .commands()
                    .send(Command::Barrier {
                        ack,
                        rounds: rounds - 1,
                    })
                    .is_err()
                {
                    break;
                }
            }
            cmd => {
                tracing::trace!("Worker: {:?}", cmd);
                if let Err(e) = coordinator.handle(cmd) {
                    tracing::error!("Notification coordinator stopped: {}", e);
                    *failure.lock() = Some(e.to_string());
                    break;
                }
            }
        }
    }

    coordinator.release_all();
    tracing::info!("Notification worker shut down");
}
