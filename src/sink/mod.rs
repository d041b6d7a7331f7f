//! Outbound reload notifications.

pub mod http;

pub use http::{HttpSink, NotificationOutcome, NotificationSink};
