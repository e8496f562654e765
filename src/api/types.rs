// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types for the provider API that are not record sets.

use serde::{Deserialize, Serialize};

/// Outcome of a create, update or delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code of the response
    #[serde(skip)]
    pub status: u16,
    /// Message returned by the provider, e.g. "Successful"
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the password-grant token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Bearer token for subsequent requests
    pub access_token: String,
    /// Refresh token (unused; a new password grant is issued on expiry)
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds; the provider sends it as a string
    #[serde(default, deserialize_with = "de_lifetime")]
    pub expires_in: Option<i64>,
}

/// One entry of a provider error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Provider error code
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Human-readable message
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ApiErrorBody {
    /// Parse an error body, which is either an array of entries or a single entry.
    ///
    /// Returns the first entry, or `None` when the body is not a provider error.
    #[must_use]
    pub fn parse(body: &str) -> Option<Self> {
        if let Ok(mut entries) = serde_json::from_str::<Vec<Self>>(body) {
            if entries.is_empty() {
                return None;
            }
            return Some(entries.swap_remove(0));
        }
        serde_json::from_str::<Self>(body)
            .ok()
            .filter(|e| e.error_code.is_some() || e.error_message.is_some())
    }
}

fn de_lifetime<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lifetime {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Lifetime>::deserialize(deserializer)? {
        Some(Lifetime::Number(n)) => Some(n),
        Some(Lifetime::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
