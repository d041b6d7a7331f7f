//! Structured log output.
//!
//! Records are written line by line to stderr with a UTC timestamp, level,
//! message and key-value fields. Everything the watcher logs happens inside
//! [`root_span`], so each line also carries the `app` and `build` identifiers.

use tracing::{Span, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Application identifier attached to every record.
pub const APP_NAME: &str = "volume-watcher";

/// Build identifier, taken from `VOLUMEWATCHER_BUILD` at compile time.
pub const BUILD: &str = match option_env!("VOLUMEWATCHER_BUILD") {
    Some(build) => build,
    None => env!("CARGO_PKG_VERSION"),
};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default `info` filter.
///
/// # Errors
///
/// Returns an error if a global subscriber was already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing::subscriber::set_global_default(subscriber(filter, std::io::stderr))?;
    Ok(())
}

/// Build the line-oriented subscriber writing to `writer`.
pub fn subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Span carrying the static identifiers for the lifetime of the process.
pub fn root_span() -> Span {
    tracing::info_span!("volume_watcher", app = APP_NAME, build = BUILD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_identifier_not_empty() {
        assert!(!BUILD.is_empty());
    }

    #[test]
    fn test_root_span_without_subscriber() {
        // No subscriber installed: the span is disabled but still usable.
        let span = root_span();
        let _guard = span.enter();
    }
}
