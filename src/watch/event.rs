//! Change events and the predicate deciding which ones trigger a reload.

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};
use std::path::{Path, PathBuf};

/// Path suffix left by an atomic volume refresh.
///
/// Mounted config and secret volumes are refreshed by writing a new hidden
/// data directory and swapping the `..data` symlink onto it, which shows up
/// as a create on a path ending in this marker.
pub const ATOMIC_SWAP_MARKER: &str = "..data";

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// An entry appeared
    Create,
    /// File contents changed
    Write,
    /// An entry was removed
    Remove,
    /// An entry was renamed away
    Rename,
    /// Metadata or permissions changed
    Chmod,
}

impl Operation {
    /// Map a notify event kind onto an operation.
    ///
    /// The destination side of a rename is reported as [`Operation::Create`]:
    /// that is how a symlink swapped into place is observed. Access events and
    /// unclassified kinds return `None`.
    pub fn from_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::Chmod),
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }
}

/// A single change observed in the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path the change applies to
    pub path: PathBuf,
    /// What happened to it
    pub operation: Operation,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(path: impl Into<PathBuf>, operation: Operation) -> Self {
        Self {
            path: path.into(),
            operation,
        }
    }

    /// Split a notify event into one change event per path.
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let Some(operation) = Operation::from_kind(&event.kind) else {
            return Vec::new();
        };

        event
            .paths
            .into_iter()
            .map(|path| Self::new(path, operation))
            .collect()
    }
}

/// Decide whether an event is an atomic volume refresh.
///
/// True only for a create whose path ends with [`ATOMIC_SWAP_MARKER`]. The
/// comparison is a plain suffix match on the path bytes, not on components.
///
/// # Examples
///
/// ```rust
/// use volume_watcher::watch::{ChangeEvent, Operation, relevant};
///
/// assert!(relevant(&ChangeEvent::new("/etc/config/..data", Operation::Create)));
/// assert!(!relevant(&ChangeEvent::new("/etc/config/..data", Operation::Remove)));
/// assert!(!relevant(&ChangeEvent::new("/etc/config/foo.txt", Operation::Create)));
/// ```
pub fn relevant(event: &ChangeEvent) -> bool {
    event.operation == Operation::Create && ends_with_marker(&event.path)
}

fn ends_with_marker(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(ATOMIC_SWAP_MARKER.as_bytes())
}
