// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Provider REST API client.
//!
//! [`ApiClient`] is the concrete [`RecordService`] used by the CLI. It handles:
//!
//! - Password-grant authentication with a cached bearer token
//! - Record set create, read, update and delete calls
//! - Retries with exponential backoff for transient failures
//! - Mapping of provider error bodies onto [`ApiError`]
//!
//! # Example
//!
//! ```rust,no_run
//! use rrstate::api::ApiClient;
//! use rrstate::config::ProviderConfig;
//! use rrstate::lifecycle::RecordLifecycle;
//!
//! # fn example(config: &ProviderConfig) -> Result<(), rrstate::errors::ApiError> {
//! let client = ApiClient::new(config)?;
//! let lifecycle = RecordLifecycle::new(client);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod rrset_ops;
pub mod types;

pub use types::{ApiErrorBody, ApiResponse, TokenResponse};

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use crate::config::ProviderConfig;
use crate::errors::ApiError;
use crate::lifecycle::RecordService;
use crate::record::{RRSet, RRSetList};
use crate::record_key::RecordKey;

use auth::CachedToken;

/// Client for the provider REST API.
pub struct ApiClient {
    /// HTTP client for API requests
    http: HttpClient,
    /// API base URL; endpoint paths are appended to it
    base_url: Url,
    username: String,
    password: String,
    /// Bearer token from the last successful password grant
    token: RwLock<Option<CachedToken>>,
    request_timeout: Duration,
    max_retry_elapsed: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("request_timeout", &self.request_timeout)
            .field("max_retry_elapsed", &self.max_retry_elapsed)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from provider settings.
    ///
    /// No request is made until the first call; the token is fetched lazily.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the settings are incomplete or the HTTP
    /// client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        config
            .validate()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;
        let base_url = config
            .base_url()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        let http = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            token: RwLock::new(None),
            request_timeout: config.request_timeout(),
            max_retry_elapsed: config.max_retry_elapsed(),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments below the base URL.
    ///
    /// Each segment is percent-encoded, so owner names and zones with reserved
    /// characters stay in their own path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::Configuration(format!("'{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl RecordService for ApiClient {
    async fn create_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        rrset_ops::create_rrset(self, key, rrset).await
    }

    async fn read_record(&self, key: &RecordKey) -> Result<RRSetList, ApiError> {
        rrset_ops::read_rrset(self, key).await
    }

    async fn update_record(
        &self,
        key: &RecordKey,
        rrset: &RRSet,
    ) -> Result<ApiResponse, ApiError> {
        rrset_ops::update_rrset(self, key, rrset).await
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<ApiResponse, ApiError> {
        rrset_ops::delete_rrset(self, key).await
    }
}
