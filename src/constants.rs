// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for rrstate.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Record Identifier Constants
// ============================================================================

/// Delimiter joining `owner`, `zone` and `type` in a record identifier
pub const IDENTIFIER_DELIMITER: char = ':';

/// Number of components in a well-formed record identifier
pub const IDENTIFIER_PART_COUNT: usize = 3;

/// Escape sequence for a literal `%` inside an identifier component
pub const ESCAPED_PERCENT: &str = "%25";

/// Escape sequence for a literal `:` inside an identifier component
pub const ESCAPED_DELIMITER: &str = "%3A";

// ============================================================================
// DNS Record Constants
// ============================================================================

/// Separator between DNS labels
pub const LABEL_SEPARATOR: char = '.';

/// Default TTL for record sets declared without one (1 day)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 86400;

// ============================================================================
// Provider API Constants
// ============================================================================

/// Path of the password-grant token endpoint, relative to the host URL
pub const TOKEN_PATH: &str = "authorization/token";

/// Collection segment for zones
pub const ZONES_SEGMENT: &str = "zones";

/// Collection segment for record sets below a zone
pub const RRSETS_SEGMENT: &str = "rrsets";

/// Provider error code for "Data not found"
pub const ERROR_CODE_DATA_NOT_FOUND: i64 = 70002;

/// Provider error code for "Cannot find resource record data for the input zone, record type and owner combination"
pub const ERROR_CODE_RRSET_NOT_FOUND: i64 = 56001;

/// Provider error codes that mean the requested record set does not exist
pub const NOT_FOUND_ERROR_CODES: [i64; 2] = [ERROR_CODE_DATA_NOT_FOUND, ERROR_CODE_RRSET_NOT_FOUND];

/// Seconds subtracted from a token's lifetime so it is refreshed before it expires
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 30;

/// Default per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum time spent retrying a single HTTP call
pub const DEFAULT_MAX_RETRY_ELAPSED_SECS: u64 = 120;

/// Default `User-Agent` header sent to the provider API
pub const DEFAULT_USER_AGENT: &str = concat!("rrstate/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable overriding the API username
pub const ENV_USERNAME: &str = "RRSTATE_USERNAME";

/// Environment variable overriding the API password
pub const ENV_PASSWORD: &str = "RRSTATE_PASSWORD";

/// Environment variable overriding the API host URL
pub const ENV_HOST_URL: &str = "RRSTATE_HOST_URL";

/// Environment variable overriding the `User-Agent` header
pub const ENV_USER_AGENT: &str = "RRSTATE_USER_AGENT";

/// Default path of the declared records file
pub const DEFAULT_CONFIG_PATH: &str = "rrstate.yaml";

/// Default path of the state file
pub const DEFAULT_STATE_PATH: &str = "rrstate.state.json";

/// Current state file format version
pub const STATE_FORMAT_VERSION: u32 = 1;
