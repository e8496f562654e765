// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Password-grant authentication and bearer token caching.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use super::types::{ApiErrorBody, TokenResponse};
use super::ApiClient;
use crate::constants::{TOKEN_EXPIRY_MARGIN_SECS, TOKEN_PATH};
use crate::errors::ApiError;
use crate::metrics::record_api_request;
use crate::retry::retry_provider_call;

/// A bearer token and the instant after which it must not be used.
#[derive(Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    /// Build a cache entry from a token response.
    ///
    /// The expiry is brought forward by a safety margin. A response without a
    /// lifetime yields a token that is only replaced after a 401.
    #[must_use]
    pub fn from_response(response: TokenResponse, now: Instant) -> Self {
        // A lifetime past what Instant can represent never expires
        let expires_at = response.expires_in.and_then(|secs| {
            let usable = secs.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS).max(0);
            now.checked_add(Duration::from_secs(usable.unsigned_abs()))
        });
        Self {
            access_token: response.access_token,
            expires_at,
        }
    }

    /// True while the token can still be sent.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expiry| now < expiry)
    }
}

impl ApiClient {
    /// Return a usable bearer token, fetching a new one when needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] if the provider rejects the credentials.
    pub async fn bearer_token(&self) -> Result<String, ApiError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(Instant::now())) {
                return Ok(token.access_token.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(Instant::now())) {
            return Ok(token.access_token.clone());
        }

        let token = retry_provider_call(
            move || self.request_token(),
            "password grant",
            self.max_retry_elapsed,
        )
        .await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call performs a new password grant.
    pub async fn invalidate_token(&self) {
        debug!("Discarding cached bearer token");
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, ApiError> {
        let url = self.endpoint(&TOKEN_PATH.split('/').collect::<Vec<_>>())?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .finish();

        info!(url = %url, username = %self.username, "Requesting bearer token");

        let start = Instant::now();
        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| {
                record_api_request("POST", "error", start.elapsed());
                super::rrset_ops::transport_error(&url, &e, self.request_timeout)
            })?;

        let status = response.status();
        record_api_request("POST", status.as_str(), start.elapsed());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() || status.as_u16() == 429 {
                return Err(super::rrset_ops::status_error("POST", &url, status, &body));
            }
            let reason = ApiErrorBody::parse(&body)
                .and_then(|e| e.error_message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            warn!(url = %url, status = %status, reason = %reason, "Password grant rejected");
            return Err(ApiError::Authentication {
                url: url.to_string(),
                reason,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| ApiError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(expires_in = ?token.expires_in, "Obtained bearer token");
        Ok(CachedToken::from_response(token, Instant::now()))
    }
}
