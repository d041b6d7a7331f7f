//! Filesystem event sources.

use super::event::ChangeEvent;
use crate::error::{Result, WatcherError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;

/// Error reported by the notification facility itself.
pub type WatchError = notify::Error;

/// Source of change events and watcher errors for one directory.
///
/// The supervisor waits on both receivers at once, so implementations hand
/// them out together through [`EventSource::streams`]. A stream yielding
/// `None` means the source closed it.
pub trait EventSource: Send {
    /// Register a directory. Only the first registration is expected to be used.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::WatcherAdd`] if the directory cannot be watched.
    fn add(&mut self, dir: &Path) -> Result<()>;

    /// Borrow the event and error receivers.
    fn streams(
        &mut self,
    ) -> (
        &mut mpsc::UnboundedReceiver<ChangeEvent>,
        &mut mpsc::UnboundedReceiver<WatchError>,
    );

    /// Release OS resources. Safe to call more than once.
    fn close(&mut self);
}

/// Event source backed by the platform's recommended `notify` watcher.
///
/// Dropping it releases the OS watch, so the descriptor is freed on every
/// exit path of the owning scope.
///
/// # Examples
///
/// ```rust,no_run
/// use volume_watcher::watch::{EventSource, NotifyEventSource};
/// use std::path::Path;
///
/// # async fn example() -> volume_watcher::error::Result<()> {
/// let mut source = NotifyEventSource::open()?;
/// source.add(Path::new("/etc/config"))?;
///
/// let (events, _errors) = source.streams();
/// while let Some(event) = events.recv().await {
///     println!("{:?} {}", event.operation, event.path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub struct NotifyEventSource {
    watcher: Option<RecommendedWatcher>,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    errors: mpsc::UnboundedReceiver<WatchError>,
}

impl NotifyEventSource {
    /// Create the underlying OS watcher.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::WatcherCreate`] if the facility cannot be
    /// initialised (for example when the inotify instance limit is reached).
    pub fn open() -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (error_tx, errors) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in ChangeEvent::from_notify(event) {
                        // Receiver gone means the source was dropped
                        let _ = event_tx.send(change);
                    }
                }
                Err(e) => {
                    let _ = error_tx.send(e);
                }
            }
        })
        .map_err(WatcherError::WatcherCreate)?;

        Ok(Self {
            watcher: Some(watcher),
            events,
            errors,
        })
    }
}

impl EventSource for NotifyEventSource {
    fn add(&mut self, dir: &Path) -> Result<()> {
        let watcher = self.watcher.as_mut().ok_or_else(|| WatcherError::WatcherAdd {
            dir: dir.to_path_buf(),
            source: notify::Error::generic("watcher already closed"),
        })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatcherError::WatcherAdd {
                dir: dir.to_path_buf(),
                source,
            })
    }

    fn streams(
        &mut self,
    ) -> (
        &mut mpsc::UnboundedReceiver<ChangeEvent>,
        &mut mpsc::UnboundedReceiver<WatchError>,
    ) {
        (&mut self.events, &mut self.errors)
    }

    fn close(&mut self) {
        if self.watcher.take().is_some() {
            debug!("watcher closed");
        }
    }
}

impl Drop for NotifyEventSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::Operation;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_open() {
        let source = NotifyEventSource::open();
        assert!(source.is_ok());
        assert!(source.unwrap().watcher.is_some());
    }

    #[tokio::test]
    async fn test_add_nonexistent_dir() {
        let mut source = NotifyEventSource::open().unwrap();
        let err = source.add(Path::new("/nonexistent/volume")).unwrap_err();
        assert!(matches!(err, WatcherError::WatcherAdd { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut source = NotifyEventSource::open().unwrap();
        source.close();
        source.close();
        assert!(source.watcher.is_none());
    }

    #[tokio::test]
    async fn test_add_after_close_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut source = NotifyEventSource::open().unwrap();
        source.close();
        assert!(source.add(temp_dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_close_ends_event_stream() {
        let temp_dir = TempDir::new().unwrap();
        let mut source = NotifyEventSource::open().unwrap();
        source.add(temp_dir.path()).unwrap();
        source.close();

        let (events, _errors) = source.streams();
        let result = timeout(Duration::from_secs(2), events.recv()).await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let mut source = NotifyEventSource::open().unwrap();
        source.add(temp_dir.path()).unwrap();

        let file = temp_dir.path().join("settings.yaml");
        fs::write(&file, "port: 8080").unwrap();

        let (events, _errors) = source.streams();
        let found = timeout(Duration::from_secs(5), async {
            while let Some(event) = events.recv().await {
                if event.operation == Operation::Create && event.path.ends_with("settings.yaml") {
                    return true;
                }
            }
            false
        })
        .await;

        assert!(found.unwrap());
    }
}
