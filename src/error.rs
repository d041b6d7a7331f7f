//! Error types for volume-watcher.

use std::path::PathBuf;

/// Result type alias for volume-watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur while setting up or running the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// A required setting was not provided.
    #[error("no {0} defined")]
    MissingSetting(&'static str),

    /// Settings could not be read from the environment.
    #[error("failed to load settings: {0}")]
    Configuration(String),

    /// The OS notification facility could not be created.
    #[error("failed to create new watcher: {0}")]
    WatcherCreate(#[source] notify::Error),

    /// The target directory could not be registered with the watcher.
    #[error("failed to add watcher for {}: {source}", .dir.display())]
    WatcherAdd {
        /// Directory that was being registered
        dir: PathBuf,
        /// Underlying notify error
        #[source]
        source: notify::Error,
    },

    /// The watch loop stopped because the facility failed or closed its streams.
    #[error("watcher stopped: {0}")]
    WatcherRuntime(String),

    /// The reload endpoint could not be reached.
    #[error("failed to call endpoint: {0}")]
    EndpointCall(String),
}

impl WatcherError {
    /// Whether this error must end the process.
    ///
    /// Only configuration and watcher setup errors are fatal; everything that
    /// happens once the watch loop runs is logged and contained.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingSetting(_)
                | Self::Configuration(_)
                | Self::WatcherCreate(_)
                | Self::WatcherAdd { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_setting_message() {
        let err = WatcherError::MissingSetting("VOLUMEWATCHER_DIR");
        assert_eq!(err.to_string(), "no VOLUMEWATCHER_DIR defined");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(WatcherError::MissingSetting("VOLUMEWATCHER_ENDPOINT").is_fatal());
        assert!(WatcherError::WatcherCreate(notify::Error::generic("no inotify")).is_fatal());
        assert!(
            WatcherError::WatcherAdd {
                dir: PathBuf::from("/etc/config"),
                source: notify::Error::path_not_found(),
            }
            .is_fatal()
        );
        assert!(!WatcherError::WatcherRuntime("events closed".to_string()).is_fatal());
        assert!(!WatcherError::EndpointCall("connection refused".to_string()).is_fatal());
    }

    #[test]
    fn test_watcher_add_mentions_dir() {
        let err = WatcherError::WatcherAdd {
            dir: PathBuf::from("/etc/config"),
            source: notify::Error::path_not_found(),
        };
        assert!(err.to_string().contains("/etc/config"));
    }
}
