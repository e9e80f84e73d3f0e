//! # ezo-config
//!
//! Layered configuration loading for the EZO inventory client using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`EZO_*` prefix)
//! 2. Project-level `.ezo/config.toml`
//! 3. User-level `~/.config/ezo/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `EZO_BASE_URL` -> `base_url`, `EZO_TOKEN` -> `token`,
//! `EZO_TIMEOUT_SECS` -> `timeout_secs`.
//!
//! # Usage
//!
//! ```no_run
//! use ezo_config::EzoConfig;
//!
//! let config = EzoConfig::load_with_dotenv().expect("config");
//! config.validate().expect("base_url and token must be set");
//! println!("EZO endpoint: {}", config.base_url);
//! ```

mod error;

pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Env variables overlaid as raw text instead of through figment's value parser.
const VERBATIM_ENV: [(&str, &str); 2] = [("base_url", "EZO_BASE_URL"), ("token", "EZO_TOKEN")];

/// Default per-request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    String::from("ezo/0.1")
}

#[derive(Clone, Deserialize, Serialize)]
pub struct EzoConfig {
    /// API root, e.g. `https://acme.ezofficeinventory.com/`.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token sent on every request.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout enforced by the HTTP transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for EzoConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// The token never shows up in logs.
impl fmt::Debug for EzoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EzoConfig")
            .field("base_url", &self.base_url)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl EzoConfig {
    /// Build a config directly from a base URL and token, keeping defaults
    /// for everything else.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading a `.env` file from the current
    /// directory or one of its parents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".ezo/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment = figment.merge(Env::prefixed("EZO_").ignore(&["base_url", "token"]));

        // Credentials are opaque strings; figment's env parsing would turn
        // `0123` into an integer.
        for (field, var) in VERBATIM_ENV {
            if let Ok(raw) = std::env::var(var) {
                figment = figment.merge(Serialized::default(field, raw));
            }
        }
        figment
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ezo").join("config.toml"))
    }

    /// Check if the minimum fields for talking to the API are present.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.token.is_empty()
    }

    /// Validate the config before a client is built from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `base_url` or `token` is
    /// empty, and [`ConfigError::InvalidValue`] for a non-HTTP base URL or a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::NotConfigured {
                field: "base_url".into(),
                env: "BASE_URL".into(),
            });
        }
        if self.token.is_empty() {
            return Err(ConfigError::NotConfigured {
                field: "token".into(),
                env: "TOKEN".into(),
            });
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url".into(),
                reason: format!("expected an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Join an endpoint path (e.g. `assets.api`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
