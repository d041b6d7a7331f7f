//! Reload notifications over HTTP.

use crate::error::{Result, WatcherError};
use async_trait::async_trait;
use reqwest::Client;

/// Result of a single notification attempt.
///
/// A status code only exists when the request reached the endpoint, so
/// transport failures carry the error and nothing else.
#[derive(Debug)]
pub enum NotificationOutcome {
    /// Endpoint answered with a 2xx status.
    Delivered {
        /// HTTP status code returned
        status: u16,
    },
    /// Endpoint answered with a status outside 200..=299.
    Rejected {
        /// HTTP status code returned
        status: u16,
    },
    /// The request never got a response.
    Failed {
        /// Transport error
        error: WatcherError,
    },
}

impl NotificationOutcome {
    /// Classify a received status code.
    pub fn from_status(status: u16) -> Self {
        if (200..=299).contains(&status) {
            Self::Delivered { status }
        } else {
            Self::Rejected { status }
        }
    }

    /// Whether the endpoint acknowledged the reload.
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Status code, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Delivered { status } | Self::Rejected { status } => Some(*status),
            Self::Failed { .. } => None,
        }
    }

    /// Transport error, if the request failed before a response.
    pub fn error(&self) -> Option<&WatcherError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Something that can be told a reload is due.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Perform exactly one notification attempt against `endpoint`.
    ///
    /// Never retries; failures are reported in the returned outcome.
    async fn notify(&self, endpoint: &str) -> NotificationOutcome;
}

/// Sends a bare `GET` to the endpoint.
///
/// No body, no authentication, no extra headers. The client is built without
/// a request timeout, so a hung endpoint blocks until the transport gives up.
///
/// # Examples
///
/// ```rust,no_run
/// use volume_watcher::sink::{HttpSink, NotificationSink};
///
/// # async fn example() -> volume_watcher::error::Result<()> {
/// let sink = HttpSink::new()?;
/// let outcome = sink.notify("http://localhost:9999/reload").await;
/// println!("succeeded: {}", outcome.succeeded());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
}

impl HttpSink {
    /// Create a sink with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (for example
    /// when the TLS backend fails to initialise).
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WatcherError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationSink for HttpSink {
    async fn notify(&self, endpoint: &str) -> NotificationOutcome {
        match self.client.get(endpoint).send().await {
            Ok(response) => NotificationOutcome::from_status(response.status().as_u16()),
            Err(e) => NotificationOutcome::Failed {
                error: WatcherError::EndpointCall(e.to_string()),
            },
        }
    }
}
