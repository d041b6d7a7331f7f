//! Process wiring: settings, watcher setup, the watch task and exit codes.

use crate::core::{Supervisor, Termination};
use crate::error::{Result, WatcherError};
use crate::sink::NotificationSink;
use crate::sources::EnvSource;
use crate::watch::EventSource;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Exit status for a clean stop.
pub const EXIT_OK: u8 = 0;

/// Exit status for configuration and watcher setup failures.
pub const EXIT_FATAL: u8 = 1;

/// Load settings, set up the watcher and run it to completion.
///
/// Settings are validated before either factory is called, so a missing
/// variable never touches the OS watcher. Setup failures are logged and
/// returned; once the loop runs, its end is reported as a [`Termination`].
///
/// # Errors
///
/// Returns a fatal [`WatcherError`] for missing settings or a failed watcher
/// setup, and a non-fatal one if the watch task itself panicked.
pub async fn run<S, N>(
    settings: &EnvSource,
    open_source: impl FnOnce() -> Result<S>,
    make_sink: impl FnOnce() -> Result<N>,
    shutdown: CancellationToken,
) -> Result<Termination>
where
    S: EventSource + 'static,
    N: NotificationSink + 'static,
{
    let target = settings.load().inspect_err(|e| error!("{e}"))?;
    let dir = target.directory().display().to_string();

    let sink = make_sink().inspect_err(|e| error!(err = %e, "failed to create http client"))?;
    let source =
        open_source().inspect_err(|e| error!(dir = %dir, err = %e, "failed to create new watcher"))?;
    let supervisor = Supervisor::start(target, source, sink)
        .inspect_err(|e| error!(dir = %dir, err = %e, "failed to add watcher"))?;

    supervisor
        .spawn(shutdown)
        .await
        .map_err(|e| WatcherError::WatcherRuntime(format!("watch task failed: {e}")))
}

/// Map the result of [`run`] onto a process exit status.
///
/// Only fatal setup errors produce a non-zero status. A watch loop that stops
/// on its own is logged and the process exits cleanly rather than lingering
/// with nothing left to watch.
pub fn exit_code(result: Result<Termination>) -> u8 {
    match result {
        Ok(termination) => {
            match termination.into_error() {
                Some(e) => error!(err = %e, "watcher terminated"),
                None => info!("watcher stopped"),
            }
            EXIT_OK
        }
        Err(e) if e.is_fatal() => EXIT_FATAL,
        Err(e) => {
            error!(err = %e, "watcher terminated");
            EXIT_OK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::HttpSink;
    use crate::sources::{DIR_VAR, ENDPOINT_VAR};
    use crate::watch::NotifyEventSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn settings(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::from_vars(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    async fn run_counting(settings: &EnvSource, opens: &AtomicUsize) -> Result<Termination> {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run(
            settings,
            || {
                opens.fetch_add(1, Ordering::SeqCst);
                NotifyEventSource::open()
            },
            HttpSink::new,
            shutdown,
        )
        .await
    }

    #[tokio::test]
    async fn test_missing_dir_skips_watcher_setup() {
        let opens = AtomicUsize::new(0);
        let result = run_counting(
            &settings(&[(ENDPOINT_VAR, "http://localhost:9999/reload")]),
            &opens,
        )
        .await;

        assert!(matches!(result, Err(WatcherError::MissingSetting(DIR_VAR))));
        assert_eq!(exit_code(result), EXIT_FATAL);
        assert_eq!(opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_endpoint_skips_watcher_setup() {
        let opens = AtomicUsize::new(0);
        let result = run_counting(&settings(&[(DIR_VAR, "/etc/config")]), &opens).await;

        assert!(matches!(result, Err(WatcherError::MissingSetting(ENDPOINT_VAR))));
        assert_eq!(exit_code(result), EXIT_FATAL);
        assert_eq!(opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unwatchable_dir_is_fatal() {
        let opens = AtomicUsize::new(0);
        let result = run_counting(
            &settings(&[
                (DIR_VAR, "/nonexistent/volume"),
                (ENDPOINT_VAR, "http://localhost:9999/reload"),
            ]),
            &opens,
        )
        .await;

        assert!(matches!(result, Err(WatcherError::WatcherAdd { .. })));
        assert_eq!(exit_code(result), EXIT_FATAL);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_fatal() {
        let result = run(
            &settings(&[
                (DIR_VAR, "/etc/config"),
                (ENDPOINT_VAR, "http://localhost:9999/reload"),
            ]),
            || -> Result<NotifyEventSource> {
                Err(WatcherError::WatcherCreate(notify::Error::generic(
                    "too many open files",
                )))
            },
            HttpSink::new,
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(WatcherError::WatcherCreate(_))));
        assert_eq!(exit_code(result), EXIT_FATAL);
    }

    #[tokio::test]
    async fn test_shutdown_exits_cleanly() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().display().to_string();
        let opens = AtomicUsize::new(0);

        let result = run_counting(
            &settings(&[(DIR_VAR, dir.as_str()), (ENDPOINT_VAR, "http://localhost:9999/reload")]),
            &opens,
        )
        .await;

        assert!(matches!(result, Ok(Termination::Shutdown)));
        assert_eq!(exit_code(result), EXIT_OK);
    }

    #[test]
    fn test_runtime_termination_exits_cleanly() {
        assert_eq!(exit_code(Ok(Termination::EventsClosed)), EXIT_OK);
        assert_eq!(
            exit_code(Err(WatcherError::WatcherRuntime("panicked".to_string()))),
            EXIT_OK
        );
    }
}
