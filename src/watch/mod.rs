//! Directory watching.
//!
//! Turns OS filesystem notifications into [`ChangeEvent`]s and decides which of
//! them mean a mounted volume was atomically refreshed.

pub mod event;
pub mod watcher;

pub use event::{ATOMIC_SWAP_MARKER, ChangeEvent, Operation, relevant};
pub use watcher::{EventSource, NotifyEventSource, WatchError};
