//! Service configuration
//!
//! Configuration is layered with the `config` crate: built-in defaults,
//! then an optional `users.toml` next to the process, then environment
//! variables prefixed with `USERS_` (nested keys joined by `__`, e.g.
//! `USERS_SERVER__PORT=8080`).

use crate::error::{ConfigError, ConfigResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

/// Base name of the optional configuration file
pub const CONFIG_FILE: &str = "users";

/// Prefix of the environment variables read by the service
pub const ENV_PREFIX: &str = "USERS";

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub pagination: PaginationSettings,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Page size bounds for list endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            pagination: PaginationSettings::default(),
            log_filter: "users=info,tower_http=info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 20,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `users.toml` (if present) and the environment
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(Some(CONFIG_FILE))
    }

    /// Load configuration from an optional file base name and the environment
    pub fn load_from(file: Option<&str>) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: ServiceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        let pagination = &self.pagination;

        if pagination.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination.max_page_size must be at least 1".to_string(),
            ));
        }

        if pagination.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination.default_page_size must be at least 1".to_string(),
            ));
        }

        if pagination.default_page_size > pagination.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_page_size ({}) exceeds pagination.max_page_size ({})",
                pagination.default_page_size, pagination.max_page_size
            )));
        }

        Ok(())
    }

    /// Socket address string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "USERS_SERVER__PORT",
            "USERS_PAGINATION__MAX_PAGE_SIZE",
            "USERS_PAGINATION__DEFAULT_PAGE_SIZE",
        ] {
            // SAFETY: serialized by `#[serial]`, no other thread reads the environment.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        let config = ServiceConfig::load_from(None).expect("Failed to load config");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(config.pagination.max_page_size, 20);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        // SAFETY: serialized by `#[serial]`, no other thread reads the environment.
        unsafe {
            std::env::set_var("USERS_SERVER__PORT", "8088");
            std::env::set_var("USERS_PAGINATION__MAX_PAGE_SIZE", "50");
        }

        let config = ServiceConfig::load_from(None).expect("Failed to load config");
        clear_env();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.pagination.max_page_size, 50);
        assert_eq!(config.pagination.default_page_size, 10);
    }

    #[test]
    #[serial]
    fn test_config_rejects_default_above_max() {
        clear_env();
        // SAFETY: serialized by `#[serial]`, no other thread reads the environment.
        unsafe {
            std::env::set_var("USERS_PAGINATION__DEFAULT_PAGE_SIZE", "30");
        }

        let result = ServiceConfig::load_from(None);
        clear_env();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
