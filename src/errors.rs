// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for record identity, remote API calls and record lifecycle operations.
//!
//! This module provides specialized error types for:
//! - Record identifiers that cannot be decoded back into a record key
//! - Provider REST API failures (transport, authentication, HTTP errors)
//! - Lifecycle operations (create, read, update, delete) on a record set
//!
//! Remote "not found" conditions are modelled explicitly so the lifecycle layer can
//! tell a deleted record set apart from a real failure.

use thiserror::Error;

use crate::constants::NOT_FOUND_ERROR_CODES;

/// A record identifier that does not decode to exactly one `(owner, zone, type)` triple.
///
/// Read and delete recover from this by treating the record as absent. Update cannot
/// route the request and surfaces it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed record identifier '{identifier}': {reason}")]
pub struct MalformedIdentifier {
    /// The identifier as stored in local state
    pub identifier: String,
    /// What is wrong with it
    pub reason: String,
}

/// Errors returned by the provider API client.
///
/// Every variant is a remote call failure from the point of view of the lifecycle
/// layer. `NotFound` is the one variant the lifecycle layer interprets rather than
/// surfaces.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The requested record set (or its zone) does not exist at the provider
    ///
    /// Produced for HTTP 404 and for the provider's "data not found" error codes.
    #[error("Resource '{resource}' not found at provider: {message}")]
    NotFound {
        /// Path of the resource that was requested
        resource: String,
        /// Provider error code, when the response carried one
        code: Option<i64>,
        /// Provider error message
        message: String,
    },

    /// Authentication with the provider failed or the token was rejected
    #[error("Authentication with {url} failed: {reason}")]
    Authentication {
        /// Token endpoint or resource URL
        url: String,
        /// Reason reported by the provider
        reason: String,
    },

    /// The provider answered with a non-success HTTP status
    #[error("{method} {url} failed with HTTP {status} ({reason}): {message}")]
    Http {
        /// HTTP method of the request
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Status condition reason derived from the HTTP code
        reason: String,
        /// Provider error code, when the response carried one
        code: Option<i64>,
        /// Provider error message or raw body
        message: String,
    },

    /// The HTTP request could not be sent (connection refused, DNS failure, TLS error)
    #[error("HTTP connection to {url} failed: {reason}")]
    Connection {
        /// Request URL
        url: String,
        /// Underlying transport error
        reason: String,
    },

    /// The HTTP request exceeded its timeout
    #[error("HTTP request to {url} timed out after {timeout_ms}ms")]
    Timeout {
        /// Request URL
        url: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The provider answered with a body that could not be decoded
    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse {
        /// Request URL
        url: String,
        /// Decoding error
        reason: String,
    },

    /// The client was misconfigured (bad host URL, unusable credentials)
    #[error("API client configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Build a not-found error for a resource path.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            code: None,
            message: message.into(),
        }
    }

    /// Returns true if this error is the provider's "not found" signature.
    ///
    /// That is an explicit `NotFound`, or an HTTP failure carrying one of the
    /// provider's not-found error codes.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Http { status, code, .. } => {
                *status == 404 || code.is_some_and(|c| NOT_FOUND_ERROR_CODES.contains(&c))
            }
            _ => false,
        }
    }

    /// Returns true if this error is transient and the request may be retried.
    ///
    /// Transient errors include connection failures, timeouts, rate limiting and
    /// gateway errors. Not found, authentication and client errors are permanent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::NotFound { .. }
            | Self::Authentication { .. }
            | Self::InvalidResponse { .. }
            | Self::Configuration(_) => false,
        }
    }

    /// Returns the status reason code for this error, for logs and metrics labels.
    #[must_use]
    pub fn status_reason(&self) -> &str {
        match self {
            Self::NotFound { .. } => "RecordNotFound",
            Self::Authentication { .. } => "AuthenticationFailed",
            Self::Http { reason, .. } => reason,
            Self::Connection { .. } => "ProviderUnreachable",
            Self::Timeout { .. } => "RequestTimeout",
            Self::InvalidResponse { .. } => "InvalidResponse",
            Self::Configuration(_) => "ConfigurationInvalid",
        }
    }
}

/// Errors surfaced by record lifecycle operations.
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    /// The identifier could not be decoded and the operation needs a routable key
    #[error(transparent)]
    MalformedIdentifier(#[from] MalformedIdentifier),

    /// The declared record failed boundary validation before any remote call
    #[error("Invalid record '{owner}' in zone '{zone}': {reason}")]
    InvalidRecord {
        /// Declared owner name
        owner: String,
        /// Declared zone name
        zone: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// The provider call failed; surfaced verbatim
    #[error(transparent)]
    RemoteCallFailure(#[from] ApiError),
}

impl LifecycleError {
    /// Returns the status reason code for this error.
    #[must_use]
    pub fn status_reason(&self) -> &str {
        match self {
            Self::MalformedIdentifier(_) => "MalformedIdentifier",
            Self::InvalidRecord { .. } => "InvalidRecord",
            Self::RemoteCallFailure(e) => e.status_reason(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected layout
    #[error("Failed to parse config file {path}: {reason}")]
    Parse {
        /// Path of the file, or `<inline>` for in-memory content
        path: String,
        /// Parser error
        reason: String,
    },

    /// A required provider setting is empty
    #[error("Missing provider setting '{0}' (set it in the config file or the environment)")]
    MissingField(&'static str),

    /// A provider setting has an unusable value
    #[error("Invalid provider setting '{field}': {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A declared record failed validation
    #[error("Invalid record '{name}': {reason}")]
    InvalidRecord {
        /// Resource name in the records map
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

/// Errors raised while loading or saving the state file.
#[derive(Error, Debug)]
pub enum StateError {
    /// The state file exists but could not be read
    #[error("Failed to read state file {path}: {source}")]
    Read {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON for the expected layout
    #[error("Failed to parse state file {path}: {reason}")]
    Parse {
        /// Path of the file
        path: String,
        /// Parser error
        reason: String,
    },

    /// The state file was written by an incompatible version
    #[error("State file {path} has unsupported format version {version}")]
    UnsupportedVersion {
        /// Path of the file
        path: String,
        /// Version found in the file
        version: u32,
    },

    /// The state file could not be written
    #[error("Failed to write state file {path}: {source}")]
    Write {
        /// Path of the file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
