//! # volume-watcher
//!
//! Sidecar that tells an application to reload when its mounted configuration
//! volume is refreshed.
//!
//! ## Overview
//!
//! Orchestrators refresh config and secret volumes atomically: a new hidden data
//! directory is written and the `..data` symlink is swapped onto it. The watcher
//! registers the volume directory with the OS notification facility, picks out
//! that swap, and sends a plain `GET` to a reload endpoint for every one it sees.
//!
//! - [`watch`]: OS events, the [`watch::EventSource`] seam and the swap predicate
//! - [`sink`]: the outbound reload call and its outcome
//! - [`core`]: the [`core::Supervisor`] loop tying the two together
//! - [`sources`]: settings from `VOLUMEWATCHER_*` environment variables
//! - [`app`], [`logging`]: process wiring and structured log output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volume_watcher::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<()> {
//! let target = EnvSource::new().load()?;
//! let supervisor = Supervisor::start(target, NotifyEventSource::open()?, HttpSink::new()?)?;
//!
//! let termination = supervisor.spawn(CancellationToken::new()).await;
//! println!("stopped: {:?}", termination);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod app;
pub mod core;
pub mod error;
pub mod logging;
pub mod sink;
pub mod sources;
pub mod watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{Supervisor, Termination, WatchTarget};
    pub use crate::error::{Result, WatcherError};
    pub use crate::sink::{HttpSink, NotificationOutcome, NotificationSink};
    pub use crate::sources::EnvSource;
    pub use crate::watch::{ChangeEvent, EventSource, NotifyEventSource, Operation};
}
