//! Serialized execution context for a session
//!
//! Spawns a thread with its own single-threaded tokio runtime. Jobs posted to
//! the handler run one at a time in posting order, and futures spawned on it
//! are driven by that same thread, so anything touched only from the handler
//! never races with itself.

use std::future::Future;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::{HandlerError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Messages sent from handles to the handler thread
enum Message {
    /// Run a job on the handler thread
    Run(Job),
    /// Stop the handler loop
    Shutdown,
}

/// Cloneable handle to a session's serialized execution context
#[derive(Clone)]
pub struct SessionHandler {
    inner: Arc<HandlerInner>,
}

struct HandlerInner {
    name: String,
    tx: mpsc::UnboundedSender<Message>,
    thread_id: ThreadId,
    runtime: tokio::runtime::Handle,
    _worker: JoinHandle<()>,
}

impl SessionHandler {
    /// Spawn a new handler thread
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let loop_name = name.clone();

        let worker = thread::Builder::new()
            .name(format!("session-handler-{}", name))
            .spawn(move || {
                // Each handler owns a single-threaded runtime
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!("Failed to create runtime for session handler: {}", e);
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(rt.handle().clone()));

                rt.block_on(run_jobs(loop_name, rx));
            })
            .map_err(|e| HandlerError::RuntimeInit(e.to_string()))?;

        let runtime = match ready_rx.recv() {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(HandlerError::RuntimeInit(e)),
            Err(_) => {
                return Err(HandlerError::RuntimeInit(
                    "handler thread exited during startup".to_string(),
                ))
            }
        };

        Ok(Self {
            inner: Arc::new(HandlerInner {
                name,
                tx,
                thread_id: worker.thread().id(),
                runtime,
                _worker: worker,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the calling thread is this handler's thread
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }

    /// Queue a job to run on the handler thread
    pub fn post<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner
            .tx
            .send(Message::Run(Box::new(job)))
            .map_err(|_| HandlerError::Stopped(self.inner.name.clone()))
    }

    /// Run `job` inline when already on the handler thread, otherwise queue it
    pub fn post_or_run<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_current() {
            job();
            Ok(())
        } else {
            self.post(job)
        }
    }

    /// Drive `future` to completion on the handler's runtime
    pub fn spawn_task<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.runtime.spawn(future);
    }

    /// Run `job` on the handler and block the calling thread for its return value
    ///
    /// Runs inline when called from the handler thread itself.
    pub fn run_blocking<F, R>(&self, job: F) -> Result<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Ok(job());
        }

        let (tx, rx) = std_mpsc::sync_channel(1);
        self.post(move || {
            let _ = tx.send(job());
        })?;

        rx.recv()
            .map_err(|_| HandlerError::Stopped(self.inner.name.clone()))
    }

    /// Block the calling thread until `future` completes on the handler
    ///
    /// There is no deadline: the wait ends only when the future resolves or
    /// the handler stops. Calling this from the handler thread would deadlock
    /// and is refused.
    pub fn await_blocking<T>(&self, future: BoxFuture<'static, T>) -> Result<T>
    where
        T: Send + 'static,
    {
        if self.is_current() {
            return Err(HandlerError::BlockingOnHandler(self.inner.name.clone()));
        }

        let (tx, rx) = std_mpsc::sync_channel(1);
        self.spawn_task(async move {
            let _ = tx.send(future.await);
        });

        rx.recv()
            .map_err(|_| HandlerError::Stopped(self.inner.name.clone()))
    }

    /// Stop the handler loop; pending spawned futures are dropped
    pub fn shutdown(&self) {
        let _ = self.inner.tx.send(Message::Shutdown);
    }
}

impl std::fmt::Debug for SessionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandler")
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Main job loop running inside the handler runtime
async fn run_jobs(name: String, mut rx: mpsc::UnboundedReceiver<Message>) {
    tracing::debug!("Session handler {} started", name);

    while let Some(message) = rx.recv().await {
        match message {
            Message::Run(job) => job(),
            Message::Shutdown => {
                tracing::debug!("Session handler {} received shutdown", name);
                break;
            }
        }
    }

    tracing::debug!("Session handler {} stopped", name);
}
