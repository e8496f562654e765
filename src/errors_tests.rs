// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;

    fn http_error(status: u16, code: Option<i64>) -> ApiError {
        ApiError::Http {
            method: "GET".to_string(),
            url: "https://api.example.net/zones/example.com./rrsets/A/www".to_string(),
            status,
            reason: "ProviderBadRequest".to_string(),
            code,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_malformed_identifier_display() {
        let error = MalformedIdentifier {
            identifier: "www:example.com.".to_string(),
            reason: "expected 3 parts, found 2".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Malformed record identifier 'www:example.com.': expected 3 parts, found 2"
        );
    }

    #[test]
    fn test_not_found_display() {
        let error = ApiError::not_found("zones/example.com./rrsets/A/www", "Data not found.");

        assert_eq!(
            error.to_string(),
            "Resource 'zones/example.com./rrsets/A/www' not found at provider: Data not found."
        );
    }

    #[test]
    fn test_http_error_display() {
        let error = http_error(400, Some(1000));

        assert_eq!(
            error.to_string(),
            "GET https://api.example.net/zones/example.com./rrsets/A/www failed with HTTP 400 (ProviderBadRequest): boom"
        );
    }

    #[test]
    fn test_timeout_display() {
        let error = ApiError::Timeout {
            url: "https://api.example.net/zones".to_string(),
            timeout_ms: 5000,
        };

        assert_eq!(
            error.to_string(),
            "HTTP request to https://api.example.net/zones timed out after 5000ms"
        );
    }

    #[test]
    fn test_is_not_found_variants() {
        assert!(ApiError::not_found("x", "y").is_not_found());
        assert!(http_error(404, None).is_not_found());
        assert!(http_error(400, Some(70002)).is_not_found());
        assert!(http_error(400, Some(56001)).is_not_found());
        assert!(!http_error(400, Some(1000)).is_not_found());
        assert!(!http_error(500, None).is_not_found());
        assert!(!ApiError::Connection {
            url: "u".to_string(),
            reason: "refused".to_string(),
        }
        .is_not_found());
    }

    #[test]
    fn test_is_transient() {
        assert!(http_error(429, None).is_transient());
        assert!(http_error(503, None).is_transient());
        assert!(ApiError::Timeout {
            url: "u".to_string(),
            timeout_ms: 1,
        }
        .is_transient());

        assert!(!http_error(400, None).is_transient());
        assert!(!http_error(404, None).is_transient());
        assert!(!ApiError::not_found("x", "y").is_transient());
        assert!(!ApiError::Authentication {
            url: "u".to_string(),
            reason: "bad password".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_status_reason() {
        assert_eq!(ApiError::not_found("x", "y").status_reason(), "RecordNotFound");
        assert_eq!(http_error(400, None).status_reason(), "ProviderBadRequest");
        assert_eq!(
            ApiError::Configuration("no host".to_string()).status_reason(),
            "ConfigurationInvalid"
        );
    }

    #[test]
    fn test_lifecycle_error_is_transparent_for_remote_failures() {
        let api = http_error(500, None);
        let lifecycle: LifecycleError = api.clone().into();

        assert_eq!(lifecycle.to_string(), api.to_string());
        assert_eq!(lifecycle.status_reason(), "ProviderBadRequest");
    }

    #[test]
    fn test_lifecycle_error_invalid_record_display() {
        let error = LifecycleError::InvalidRecord {
            owner: "www".to_string(),
            zone: "example.com".to_string(),
            reason: "zone name must be fully qualified".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid record 'www' in zone 'example.com': zone name must be fully qualified"
        );
        assert_eq!(error.status_reason(), "InvalidRecord");
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::MissingField("username");
        assert!(error.to_string().contains("'username'"));

        let error = ConfigError::InvalidRecord {
            name: "web".to_string(),
            reason: "record data must contain at least one value".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid record 'web': record data must contain at least one value"
        );
    }
}
