//! The directory/endpoint pair a watcher instance is bound to.

use std::path::{Path, PathBuf};

/// What to watch and whom to tell.
///
/// Built once at startup and never mutated afterwards. Both fields are
/// guaranteed non-empty by [`WatchTarget::new`].
///
/// # Examples
///
/// ```rust
/// use volume_watcher::core::WatchTarget;
///
/// let target = WatchTarget::new("/etc/config", "http://localhost:9999/reload").unwrap();
/// assert_eq!(target.endpoint(), "http://localhost:9999/reload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    directory: PathBuf,
    endpoint: String,
}

impl WatchTarget {
    /// Create a target, rejecting empty values.
    ///
    /// The endpoint is kept verbatim. A malformed URI is not rejected here;
    /// it shows up as a transport failure when the endpoint is called.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::MissingSetting`](crate::error::WatcherError::MissingSetting)
    /// naming the empty field.
    pub fn new(
        directory: impl Into<PathBuf>,
        endpoint: impl Into<String>,
    ) -> crate::error::Result<Self> {
        let directory = directory.into();
        let endpoint = endpoint.into();

        if directory.as_os_str().is_empty() {
            return Err(crate::error::WatcherError::MissingSetting("directory"));
        }
        if endpoint.is_empty() {
            return Err(crate::error::WatcherError::MissingSetting("endpoint"));
        }

        Ok(Self {
            directory,
            endpoint,
        })
    }

    /// Directory registered with the event source.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Endpoint receiving the reload GET.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
