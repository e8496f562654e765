// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record set HTTP API operations.
//!
//! Every call goes through [`provider_request`], which adds the bearer token, retries
//! transient failures and maps error responses onto [`ApiError`].

use reqwest::{Method, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;

use super::types::{ApiErrorBody, ApiResponse};
use super::ApiClient;
use crate::constants::{NOT_FOUND_ERROR_CODES, RRSETS_SEGMENT, ZONES_SEGMENT};
use crate::errors::ApiError;
use crate::http_errors::{map_connection_error, map_http_error_to_reason};
use crate::metrics::record_api_request;
use crate::normalize::short_type;
use crate::record::{RRSet, RRSetList};
use crate::record_key::RecordKey;
use crate::retry::retry_provider_call;

/// Build the URL of one record set: `{host}/zones/{zone}/rrsets/{type}/{owner}`.
///
/// The type is sent in its short form.
///
/// # Errors
///
/// Returns [`ApiError::Configuration`] if the base URL cannot carry a path.
pub fn rrset_url(client: &ApiClient, key: &RecordKey) -> Result<Url, ApiError> {
    client.endpoint(&[
        ZONES_SEGMENT,
        &key.zone,
        RRSETS_SEGMENT,
        &short_type(&key.record_type),
        &key.owner,
    ])
}

/// Create a record set.
///
/// # Errors
///
/// Returns an error if the request fails after retries or the provider rejects it.
pub async fn create_rrset(
    client: &ApiClient,
    key: &RecordKey,
    rrset: &RRSet,
) -> Result<ApiResponse, ApiError> {
    let url = rrset_url(client, key)?;
    let (status, body) = provider_request(client, Method::POST, &url, Some(rrset)).await?;
    parse_api_response(&url, status, &body)
}

/// Read the record sets matching a key.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the provider reports the record set as missing,
/// or another error if the request fails.
pub async fn read_rrset(client: &ApiClient, key: &RecordKey) -> Result<RRSetList, ApiError> {
    let url = rrset_url(client, key)?;
    let (_, body) = provider_request(client, Method::GET, &url, None).await?;
    if body.trim().is_empty() {
        return Ok(RRSetList::default());
    }
    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Replace a record set.
///
/// # Errors
///
/// Returns an error if the request fails after retries or the provider rejects it.
pub async fn update_rrset(
    client: &ApiClient,
    key: &RecordKey,
    rrset: &RRSet,
) -> Result<ApiResponse, ApiError> {
    let url = rrset_url(client, key)?;
    let (status, body) = provider_request(client, Method::PUT, &url, Some(rrset)).await?;
    parse_api_response(&url, status, &body)
}

/// Delete a record set.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when the record set is already gone, or another
/// error if the request fails.
pub async fn delete_rrset(client: &ApiClient, key: &RecordKey) -> Result<ApiResponse, ApiError> {
    let url = rrset_url(client, key)?;
    let (status, body) = provider_request(client, Method::DELETE, &url, None).await?;
    parse_api_response(&url, status, &body)
}

/// Execute a request to the provider API with automatic retry.
///
/// # Retry Behavior
/// - Retries on HTTP 429, 500, 502, 503, 504 and connection failures
/// - Fails immediately on other 4xx errors
/// - Initial retry after 50ms, growing to at most 10 seconds between attempts
///
/// # Errors
///
/// Returns an error if the request fails after all retries or hits a non-retryable error.
pub async fn provider_request(
    client: &ApiClient,
    method: Method,
    url: &Url,
    body: Option<&RRSet>,
) -> Result<(StatusCode, String), ApiError> {
    let method = &method;
    let operation = format!("{method} {url}");
    retry_provider_call(
        move || authorized_request(client, method, url, body),
        &operation,
        client.max_retry_elapsed,
    )
    .await
}

/// One attempt, with a single re-authentication when the token is rejected.
async fn authorized_request(
    client: &ApiClient,
    method: &Method,
    url: &Url,
    body: Option<&RRSet>,
) -> Result<(StatusCode, String), ApiError> {
    let mut reauthenticated = false;
    loop {
        let token = client.bearer_token().await?;
        let (status, text) = send_once(client, method, url, body, &token).await?;

        if status == StatusCode::UNAUTHORIZED && !reauthenticated {
            info!(method = %method, url = %url, "Bearer token rejected, re-authenticating");
            client.invalidate_token().await;
            reauthenticated = true;
            continue;
        }

        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "HTTP API request failed"
            );
            return Err(status_error(method.as_str(), url, status, &text));
        }

        return Ok((status, text));
    }
}

async fn send_once(
    client: &ApiClient,
    method: &Method,
    url: &Url,
    body: Option<&RRSet>,
    token: &str,
) -> Result<(StatusCode, String), ApiError> {
    info!(method = %method, url = %url, "HTTP API request to provider");
    debug!(body = ?body, "Request body");

    let mut request = client
        .http
        .request(method.clone(), url.clone())
        .bearer_auth(token);
    if let Some(rrset) = body {
        request = request.json(rrset);
    }

    let start = Instant::now();
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            record_api_request(method.as_str(), "error", start.elapsed());
            return Err(transport_error(url, &e, client.request_timeout));
        }
    };

    let status = response.status();
    let text = response.text().await.map_err(|e| ApiError::InvalidResponse {
        url: url.to_string(),
        reason: format!("Failed to read response body: {e}"),
    })?;
    record_api_request(method.as_str(), status.as_str(), start.elapsed());

    debug!(
        method = %method,
        url = %url,
        status = %status,
        response_len = text.len(),
        "HTTP API response"
    );

    Ok((status, text))
}

/// Map a transport-level `reqwest` failure.
pub(crate) fn transport_error(url: &Url, err: &reqwest::Error, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
    }
    let (reason, _) = map_connection_error();
    ApiError::Connection {
        url: url.to_string(),
        reason: format!("{reason}: {err}"),
    }
}

/// Map a non-success response onto an error.
///
/// HTTP 404 and the provider's not-found error codes become [`ApiError::NotFound`];
/// a 401 or 403 that survives re-authentication becomes [`ApiError::Authentication`].
pub(crate) fn status_error(method: &str, url: &Url, status: StatusCode, body: &str) -> ApiError {
    let parsed = ApiErrorBody::parse(body);
    let code = parsed.as_ref().and_then(|e| e.error_code);
    let message = parsed
        .and_then(|e| e.error_message)
        .unwrap_or_else(|| body.trim().to_string());

    if status == StatusCode::NOT_FOUND || code.is_some_and(|c| NOT_FOUND_ERROR_CODES.contains(&c))
    {
        return ApiError::NotFound {
            resource: url.path().to_string(),
            code,
            message,
        };
    }

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return ApiError::Authentication {
            url: url.to_string(),
            reason: message,
        };
    }

    let (reason, default_message) = map_http_error_to_reason(status.as_u16());
    ApiError::Http {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        reason: reason.to_string(),
        code,
        message: if message.is_empty() {
            default_message
        } else {
            message
        },
    }
}

fn parse_api_response(url: &Url, status: StatusCode, body: &str) -> Result<ApiResponse, ApiError> {
    let mut response = if body.trim().is_empty() {
        ApiResponse::default()
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })?
    };
    response.status = status.as_u16();
    Ok(response)
}
