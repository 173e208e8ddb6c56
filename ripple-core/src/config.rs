//! Runtime Configuration
//!
//! Process-wide switches read by the observer. Hosts either call
//! [`configure`] directly or deserialize a [`Config`] from their own
//! settings file and install it.
//!
//! Changing the configuration only affects operations that start after the
//! change. Already-observed containers keep their instrumentation.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report usage diagnostics through `tracing` and run `on_write` hooks.
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub diagnostics: bool,

    /// Server-only execution: `observe` never creates new observers.
    pub server_rendering: bool,

    /// Time root observations and emit the measurement as a debug event.
    pub performance: bool,
}

impl Config {
    const DEFAULT: Config = Config {
        diagnostics: cfg!(debug_assertions),
        server_rendering: false,
        performance: false,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static CONFIG: RwLock<Config> = RwLock::new(Config::DEFAULT);

/// Install a new process-wide configuration, returning the previous one.
pub fn configure(config: Config) -> Config {
    let previous = std::mem::replace(&mut *CONFIG.write(), config);
    tracing::debug!(?config, "observer configuration changed");
    previous
}

/// Get a copy of the current configuration.
pub fn config() -> Config {
    *CONFIG.read()
}

pub(crate) fn diagnostics_enabled() -> bool {
    CONFIG.read().diagnostics
}

pub(crate) fn is_server_rendering() -> bool {
    CONFIG.read().server_rendering
}

pub(crate) fn performance_enabled() -> bool {
    CONFIG.read().performance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_follows_build_profile() {
        let config = Config::default();
        assert_eq!(config.diagnostics, cfg!(debug_assertions));
        assert!(!config.server_rendering);
        assert!(!config.performance);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: Config = serde_json::from_str(r#"{ "performance": true }"#).unwrap();
        assert!(config.performance);
        assert!(!config.server_rendering);
        assert_eq!(config.diagnostics, cfg!(debug_assertions));
    }
}
