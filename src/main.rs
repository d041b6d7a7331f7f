//! volume-watcher binary.
//!
//! Watches `VOLUMEWATCHER_DIR` and sends `GET VOLUMEWATCHER_ENDPOINT` whenever
//! the mounted volume is atomically refreshed.

use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info};
use volume_watcher::app;
use volume_watcher::logging;
use volume_watcher::sink::HttpSink;
use volume_watcher::sources::EnvSource;
use volume_watcher::watch::NotifyEventSource;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("failed to initialise logging: {e}");
    }

    let span = logging::root_span();
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()).instrument(span.clone()));

    let settings = EnvSource::new();
    let result = app::run(&settings, NotifyEventSource::open, HttpSink::new, shutdown)
        .instrument(span.clone())
        .await;

    let code = span.in_scope(|| app::exit_code(result));
    ExitCode::from(code)
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    info!("received shutdown signal");
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
