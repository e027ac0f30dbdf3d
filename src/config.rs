//! Backend configuration loaded from the environment.
//!
//! The only required setting is the PocketBase base URL. Startup fails fast
//! when it is absent so no partial state is ever built.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Primary variable holding the backend base URL.
pub const URL_VAR: &str = "POCKETBASE_URL";

/// Fallback variable name used by the web front-end build.
pub const LEGACY_URL_VAR: &str = "VITE_POCKETBASE_URL";

/// Page size override for full-list requests.
pub const PAGE_SIZE_VAR: &str = "POCKETBASE_PAGE_SIZE";

/// Request timeout override, in seconds.
pub const TIMEOUT_VAR: &str = "POCKETBASE_TIMEOUT_SECS";

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the content gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL of the PocketBase server.
    pub base_url: Url,
    /// Records requested per page when listing a collection.
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Creates a config for `base_url` with default paging and timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Loads the config from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup(URL_VAR)
            .or_else(|| lookup(LEGACY_URL_VAR))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(URL_VAR))?;
        let base_url = Url::parse(raw_url.trim())?;

        let page_size = match lookup(PAGE_SIZE_VAR) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: PAGE_SIZE_VAR.to_string(),
                message: format!("`{}` is not a positive integer", raw),
            })?,
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    field: TIMEOUT_VAR.to_string(),
                    message: format!("`{}` is not a number of seconds", raw),
                }
            })?),
            None => DEFAULT_TIMEOUT,
        };

        let config = Self {
            base_url,
            page_size,
            timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                message: format!("unsupported scheme `{}`", self.base_url.scheme()),
            });
        }

        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                message: "Page size must be greater than 0".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
