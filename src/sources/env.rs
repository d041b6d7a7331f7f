//! Environment variable settings source.

use crate::core::WatchTarget;
use crate::error::{Result, WatcherError};
use config::Environment;
use serde::Deserialize;

/// Prefix shared by every setting the watcher reads.
pub const ENV_PREFIX: &str = "VOLUMEWATCHER";

/// Variable holding the directory to watch.
pub const DIR_VAR: &str = "VOLUMEWATCHER_DIR";

/// Variable holding the endpoint to call.
pub const ENDPOINT_VAR: &str = "VOLUMEWATCHER_ENDPOINT";

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    dir: Option<String>,
    endpoint: Option<String>,
}

/// Environment variable settings source.
///
/// Reads `VOLUMEWATCHER_DIR` and `VOLUMEWATCHER_ENDPOINT` and turns them into
/// a [`WatchTarget`]. Empty values are treated the same as unset ones.
///
/// # Examples
///
/// ```rust
/// use volume_watcher::sources::EnvSource;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([
///     ("VOLUMEWATCHER_DIR".to_string(), "/etc/config".to_string()),
///     ("VOLUMEWATCHER_ENDPOINT".to_string(), "http://localhost:9999/reload".to_string()),
/// ]);
///
/// let target = EnvSource::from_vars(vars).load().unwrap();
/// assert_eq!(target.endpoint(), "http://localhost:9999/reload");
/// ```
pub struct EnvSource {
    prefix: String,
    vars: Option<config::Map<String, String>>,
}

impl EnvSource {
    /// Read from the process environment.
    pub fn new() -> Self {
        Self {
            prefix: ENV_PREFIX.to_string(),
            vars: None,
        }
    }

    /// Read from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            prefix: ENV_PREFIX.to_string(),
            vars: Some(vars.into_iter().collect()),
        }
    }

    /// Load and validate the watch target.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::MissingSetting`] for the first absent variable,
    /// directory before endpoint, or [`WatcherError::Configuration`] if the
    /// environment cannot be read at all.
    pub fn load(&self) -> Result<WatchTarget> {
        let env_source = Environment::with_prefix(&self.prefix).source(self.vars.clone());

        let raw = config::Config::builder()
            .add_source(env_source)
            .build()
            .and_then(|cfg| cfg.try_deserialize::<RawSettings>())
            .map_err(|e| WatcherError::Configuration(e.to_string()))?;

        let dir = raw
            .dir
            .filter(|v| !v.is_empty())
            .ok_or(WatcherError::MissingSetting(DIR_VAR))?;
        let endpoint = raw
            .endpoint
            .filter(|v| !v.is_empty())
            .ok_or(WatcherError::MissingSetting(ENDPOINT_VAR))?;

        WatchTarget::new(dir, endpoint)
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}
