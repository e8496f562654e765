// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to status reasons.
//!
//! Provider API responses are converted into stable reason codes that show up in
//! [`crate::errors::ApiError`], in logs and in the `status` label of API metrics.
//!
//! # Usage
//!
//! ```rust
//! use rrstate::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "RecordNotFound");
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "ProviderInternalError");
//! ```

/// The request was rejected as invalid (400)
pub const REASON_PROVIDER_BAD_REQUEST: &str = "ProviderBadRequest";

/// Authentication or authorization failed (401, 403)
pub const REASON_AUTHENTICATION_FAILED: &str = "AuthenticationFailed";

/// The zone or record set does not exist (404)
pub const REASON_RECORD_NOT_FOUND: &str = "RecordNotFound";

/// The record set already exists or conflicts with another one (409)
pub const REASON_RECORD_CONFLICT: &str = "RecordConflict";

/// The provider is rate limiting requests (429)
pub const REASON_RATE_LIMITED: &str = "RateLimited";

/// The provider failed internally (500)
pub const REASON_PROVIDER_INTERNAL_ERROR: &str = "ProviderInternalError";

/// A gateway in front of the provider failed (502, 503, 504)
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Any other unexpected status, or no response at all
pub const REASON_PROVIDER_UNREACHABLE: &str = "ProviderUnreachable";

/// Map HTTP status code to reason and message.
///
/// | HTTP Code | Reason |
/// |-----------|--------|
/// | 400 | `ProviderBadRequest` |
/// | 401, 403 | `AuthenticationFailed` |
/// | 404 | `RecordNotFound` |
/// | 409 | `RecordConflict` |
/// | 429 | `RateLimited` |
/// | 500 | `ProviderInternalError` |
/// | 502, 503, 504 | `GatewayError` |
/// | Other | `ProviderUnreachable` |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_PROVIDER_BAD_REQUEST,
            "Invalid request to provider API (400)".into(),
        ),
        401 => (
            REASON_AUTHENTICATION_FAILED,
            "Provider authentication required (401)".into(),
        ),
        403 => (
            REASON_AUTHENTICATION_FAILED,
            "Provider authorization failed (403)".into(),
        ),
        404 => (
            REASON_RECORD_NOT_FOUND,
            "Zone or record set not found (404)".into(),
        ),
        409 => (
            REASON_RECORD_CONFLICT,
            "Record set conflicts with existing data (409)".into(),
        ),
        429 => (
            REASON_RATE_LIMITED,
            "Provider rate limit exceeded (429)".into(),
        ),
        500 => (
            REASON_PROVIDER_INTERNAL_ERROR,
            "Provider API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching provider (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Provider service unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching provider (504)".into(),
        ),
        _ => (
            REASON_PROVIDER_UNREACHABLE,
            format!("Unexpected HTTP error from provider ({status_code})"),
        ),
    }
}

/// Map a transport failure (no HTTP status received) to reason and message.
#[must_use]
pub fn map_connection_error() -> (&'static str, String) {
    (
        REASON_PROVIDER_UNREACHABLE,
        "Cannot connect to provider API".into(),
    )
}
