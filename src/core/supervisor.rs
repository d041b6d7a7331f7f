//! The watch loop: events in, reload calls out.

use crate::core::WatchTarget;
use crate::error::{Result, WatcherError};
use crate::sink::{NotificationOutcome, NotificationSink};
use crate::watch::{ChangeEvent, EventSource, WatchError, relevant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, trace};

/// Why the watch loop stopped.
#[derive(Debug)]
pub enum Termination {
    /// The event stream closed.
    EventsClosed,
    /// The error stream closed.
    ErrorsClosed,
    /// The facility reported an error.
    WatchFailed(WatchError),
    /// Shutdown was requested.
    Shutdown,
}

impl Termination {
    /// Whether the loop stopped because it was asked to.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    /// Convert an unrequested stop into a runtime error.
    pub fn into_error(self) -> Option<WatcherError> {
        match self {
            Self::EventsClosed => Some(WatcherError::WatcherRuntime(
                "event stream closed".to_string(),
            )),
            Self::ErrorsClosed => Some(WatcherError::WatcherRuntime(
                "error stream closed".to_string(),
            )),
            Self::WatchFailed(e) => Some(WatcherError::WatcherRuntime(e.to_string())),
            Self::Shutdown => None,
        }
    }
}

enum Next {
    Event(Option<ChangeEvent>),
    Error(Option<WatchError>),
    Shutdown,
}

/// Owns an event source and calls the endpoint for every atomic refresh.
///
/// Events are handled one at a time in delivery order. The next event is not
/// read until the current notification returns, so a slow endpoint delays
/// detection of later refreshes. Nothing is coalesced: two refreshes mean two
/// calls.
///
/// # Examples
///
/// ```rust,no_run
/// use volume_watcher::core::{Supervisor, WatchTarget};
/// use volume_watcher::sink::HttpSink;
/// use volume_watcher::watch::NotifyEventSource;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> volume_watcher::error::Result<()> {
/// let target = WatchTarget::new("/etc/config", "http://localhost:9999/reload")?;
/// let supervisor = Supervisor::start(target, NotifyEventSource::open()?, HttpSink::new()?)?;
///
/// let termination = supervisor.spawn(CancellationToken::new()).await;
/// println!("watcher stopped: {:?}", termination);
/// # Ok(())
/// # }
/// ```
pub struct Supervisor<S, N> {
    target: WatchTarget,
    source: S,
    sink: N,
}

impl<S, N> Supervisor<S, N>
where
    S: EventSource,
    N: NotificationSink,
{
    /// Register the target directory and enter the watching state.
    ///
    /// # Errors
    ///
    /// Returns the source's registration error; the loop is never started in
    /// that case.
    pub fn start(target: WatchTarget, mut source: S, sink: N) -> Result<Self> {
        info!(dir = %target.directory().display(), "adding watcher");
        source.add(target.directory())?;

        Ok(Self {
            target,
            source,
            sink,
        })
    }

    /// Run until a stream closes, the facility reports an error, or
    /// `shutdown` is cancelled. The source is closed before returning.
    pub async fn run(mut self, shutdown: CancellationToken) -> Termination {
        let dir = self.target.directory().display().to_string();
        info!(dir = %dir, "watching directory");

        let termination = loop {
            let next = {
                let (events, errors) = self.source.streams();
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => Next::Shutdown,
                    event = events.recv() => Next::Event(event),
                    err = errors.recv() => Next::Error(err),
                }
            };

            match next {
                Next::Event(Some(event)) => {
                    if !Self::handle(&self.target, &self.sink, event, &shutdown).await {
                        info!(dir = %dir, "shutting down during endpoint call");
                        break Termination::Shutdown;
                    }
                }
                Next::Event(None) => {
                    error!(dir = %dir, "failed to get watcher events");
                    break Termination::EventsClosed;
                }
                Next::Error(Some(err)) => {
                    error!(dir = %dir, err = %err, "watcher error");
                    break Termination::WatchFailed(err);
                }
                Next::Error(None) => {
                    error!(dir = %dir, "failed to get watcher errors");
                    break Termination::ErrorsClosed;
                }
                Next::Shutdown => {
                    info!(dir = %dir, "shutting down");
                    break Termination::Shutdown;
                }
            }
        };

        self.source.close();
        termination
    }

    /// Run on a background task inside the caller's span.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Termination>
    where
        S: 'static,
        N: 'static,
    {
        tokio::spawn(self.run(shutdown).in_current_span())
    }

    /// Returns `false` if shutdown was requested while the endpoint call was
    /// in flight; the call is abandoned in that case.
    async fn handle(
        target: &WatchTarget,
        sink: &N,
        event: ChangeEvent,
        shutdown: &CancellationToken,
    ) -> bool {
        if !relevant(&event) {
            trace!(path = %event.path.display(), op = ?event.operation, "ignoring event");
            return true;
        }

        let endpoint = target.endpoint();
        info!(endpoint, "calling endpoint");

        let outcome = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return false,
            outcome = sink.notify(endpoint) => outcome,
        };

        match outcome {
            NotificationOutcome::Delivered { status } => {
                info!(endpoint, statuscode = status, "endpoint notified");
            }
            NotificationOutcome::Rejected { status } => {
                error!(endpoint, statuscode = status, "wrong response status code");
            }
            NotificationOutcome::Failed { error } => {
                error!(endpoint, err = %error, "failed to call endpoint");
            }
        }
        true
    }
}
