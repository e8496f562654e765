// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Configuration loading.
//!
//! A single YAML file carries the provider connection settings and the declared
//! record sets:
//!
//! ```yaml
//! provider:
//!   username: dns-admin
//!   host_url: https://api.example.net/v3
//! records:
//!   web:
//!     zone_name: example.com.
//!     owner_name: www
//!     record_type: A
//!     ttl: 300
//!     record_data: [192.0.2.10, 192.0.2.11]
//! ```
//!
//! Provider settings can be overridden from the environment (`RRSTATE_USERNAME`,
//! `RRSTATE_PASSWORD`, `RRSTATE_HOST_URL`, `RRSTATE_USER_AGENT`), which is the
//! expected way to supply the password.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_MAX_RETRY_ELAPSED_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    ENV_HOST_URL, ENV_PASSWORD, ENV_USERNAME, ENV_USER_AGENT,
};
use crate::errors::{ConfigError, LifecycleError};
use crate::record::DeclaredRecord;

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_retry_elapsed() -> u64 {
    DEFAULT_MAX_RETRY_ELAPSED_SECS
}

/// Connection settings for the provider API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API username
    #[serde(default)]
    pub username: String,
    /// API password
    #[serde(default)]
    pub password: String,
    /// Base URL of the API, e.g. `https://api.example.net/v3`
    #[serde(default)]
    pub host_url: String,
    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum time spent retrying one call, in seconds
    #[serde(default = "default_max_retry_elapsed")]
    pub max_retry_elapsed_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            host_url: String::new(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            max_retry_elapsed_secs: default_max_retry_elapsed(),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host_url", &self.host_url)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retry_elapsed_secs", &self.max_retry_elapsed_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields = [
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
            (ENV_HOST_URL, &mut self.host_url),
            (ENV_USER_AGENT, &mut self.user_agent),
        ];
        for (name, field) in fields {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    /// Check that every setting needed to talk to the provider is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for empty credentials or host, and
    /// [`ConfigError::InvalidValue`] for a host URL that is not http(s) or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password"));
        }
        if self.host_url.is_empty() {
            return Err(ConfigError::MissingField("host_url"));
        }
        self.base_url()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the URL does not parse, is not
    /// http(s), or cannot carry path segments.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.host_url).map_err(|e| ConfigError::InvalidValue {
            field: "host_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "host_url",
                reason: format!("'{}' is not an http(s) URL", self.host_url),
            });
        }
        Ok(url)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Maximum time spent retrying one call.
    #[must_use]
    pub fn max_retry_elapsed(&self) -> Duration {
        Duration::from_secs(self.max_retry_elapsed_secs)
    }
}

/// Contents of the records file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsFile {
    /// Provider connection settings
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Declared record sets by resource name
    #[serde(default)]
    pub records: BTreeMap<String, DeclaredRecord>,
}

impl RecordsFile {
    /// Load and validate a records file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not valid YAML, or [`ConfigError::InvalidRecord`] if a declared record
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// Parse and validate records file content.
    ///
    /// # Errors
    ///
    /// Same as [`RecordsFile::from_file`], minus read errors.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, path: &str) -> Result<Self, ConfigError> {
        let file: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        file.validate_records()?;
        Ok(file)
    }

    fn validate_records(&self) -> Result<(), ConfigError> {
        for (name, record) in &self.records {
            record.validate().map_err(|e| ConfigError::InvalidRecord {
                name: name.clone(),
                reason: match e {
                    LifecycleError::InvalidRecord { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
