//! Core watcher types.

mod supervisor;
mod target;

pub use supervisor::{Supervisor, Termination};
pub use target::WatchTarget;
