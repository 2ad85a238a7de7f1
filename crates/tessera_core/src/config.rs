//! Store configuration.

use std::time::Duration;
use tessera_storage::ConnectionOptions;

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// How long to wait on a lock held by another process before failing.
    pub busy_timeout: Duration,

    /// Whether every executed statement is emitted as a `debug` event.
    pub log_statements: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
            log_statements: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets the lock wait timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, value: Duration) -> Self {
        self.busy_timeout = value;
        self
    }

    /// Sets whether executed statements are logged.
    #[must_use]
    pub const fn log_statements(mut self, value: bool) -> Self {
        self.log_statements = value;
        self
    }

    pub(crate) fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            create_if_missing: self.create_if_missing,
            busy_timeout: self.busy_timeout,
            log_statements: self.log_statements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.log_statements);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .log_statements(false)
            .busy_timeout(Duration::from_millis(250));

        assert!(!config.create_if_missing);
        assert!(!config.log_statements);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));

        let options = config.connection_options();
        assert!(!options.create_if_missing);
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
    }
}
