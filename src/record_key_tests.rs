// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `record_key.rs`

#[cfg(test)]
mod tests {
    use super::super::{decode, encode, RecordIdentifier, RecordKey};
    use std::collections::HashSet;

    // =====================================================
    // Encoding
    // =====================================================

    #[test]
    fn test_encode_plain_key() {
        let key = RecordKey::new("www", "example.com.", "A");
        assert_eq!(encode(&key).as_str(), "www:example.com.:A");
    }

    #[test]
    fn test_encode_escapes_delimiter_and_percent() {
        let key = RecordKey::new("a:b", "100%.example.com.", "TXT");
        assert_eq!(encode(&key).as_str(), "a%3Ab:100%25.example.com.:TXT");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let key = RecordKey::new("mail", "example.org.", "MX");
        assert_eq!(encode(&key), encode(&key.clone()));
    }

    #[test]
    fn test_encode_is_injective_for_colliding_inputs() {
        // Without escaping, all three would encode to "a:b:c:A"
        let keys = [
            RecordKey::new("a:b", "c", "A"),
            RecordKey::new("a", "b:c", "A"),
            RecordKey::new("a", "b", "c:A"),
        ];

        let ids: HashSet<String> = keys
            .iter()
            .map(|k| encode(k).as_str().to_string())
            .collect();
        assert_eq!(ids.len(), keys.len());
    }

    // =====================================================
    // Decoding
    // =====================================================

    #[test]
    fn test_decode_round_trip() {
        let keys = [
            RecordKey::new("www", "example.com.", "A"),
            RecordKey::new("www.example.com.", "example.com.", "CNAME"),
            RecordKey::new("a:b%c", "zone:with:colons.", "TXT"),
            RecordKey::new("_sip._tcp", "example.com.", "SRV (33)"),
            RecordKey::new("0/25", "2.0.192.in-addr.arpa.", "PTR"),
        ];

        for key in keys {
            let decoded = decode(encode(&key).as_str()).expect("valid identifier");
            assert_eq!(decoded, key, "round trip failed for {key}");
            assert_eq!(decoded.owner, key.owner);
            assert_eq!(decoded.zone, key.zone);
        }
    }

    #[test]
    fn test_decode_legacy_identifier() {
        let key = decode("www:example.com.:A").unwrap();
        assert_eq!(key.owner, "www");
        assert_eq!(key.zone, "example.com.");
        assert_eq!(key.record_type, "A");
    }

    #[test]
    fn test_decode_normalizes_canonical_type_to_short_form() {
        let key = decode("www:example.com.:A (1)").unwrap();
        assert_eq!(key.record_type, "A");
        assert_eq!(key, decode("www:example.com.:A").unwrap());
    }

    #[test]
    fn test_decode_accepts_lowercase_escapes() {
        let key = decode("a%3ab:example.com.:A").unwrap();
        assert_eq!(key.owner, "a:b");
    }

    #[test]
    fn test_decode_wrong_part_counts() {
        for identifier in [
            "",
            "www",
            "www:example.com.",
            "www:example.com.:A:extra",
            "a:b:c:d:e",
        ] {
            let err = decode(identifier).expect_err("should be malformed");
            assert_eq!(err.identifier, identifier);
            assert!(err.reason.contains("parts"), "reason: {}", err.reason);
        }
    }

    #[test]
    fn test_decode_empty_part() {
        let err = decode("www::A").unwrap_err();
        assert!(err.reason.contains("part 2 is empty"));

        assert!(decode("::").is_err());
    }

    #[test]
    fn test_decode_invalid_escape() {
        for identifier in ["a%:b:c", "a%2:b:c", "a%41:b:c", "a:b:c%", "a%é1:b:c"] {
            let err = decode(identifier).expect_err("should be malformed");
            assert!(
                err.reason.contains("invalid escape"),
                "{identifier}: {}",
                err.reason
            );
        }
    }

    // =====================================================
    // RecordKey equality and RecordIdentifier
    // =====================================================

    #[test]
    fn test_key_equality_uses_canonical_type() {
        let short = RecordKey::new("www", "example.com.", "A");
        let canonical = RecordKey::new("www", "example.com.", "A (1)");
        assert_eq!(short, canonical);

        let mut set = HashSet::new();
        set.insert(short);
        assert!(set.contains(&canonical));
    }

    #[test]
    fn test_unlisted_type_round_trips_and_hashes_by_mnemonic() {
        let key = RecordKey::new("www", "example.com.", "HTTPS (65)");
        let decoded = decode(key.identifier().as_str()).unwrap();

        assert_eq!(decoded.record_type, "HTTPS");
        assert_eq!(decoded, key);

        let mut set = HashSet::new();
        set.insert(key);
        assert!(set.contains(&RecordKey::new("www", "example.com.", "https")));
        assert!(!set.contains(&RecordKey::new("www", "example.com.", "SVCB (64)")));
    }

    #[test]
    fn test_key_inequality() {
        let a = RecordKey::new("www", "example.com.", "A");
        assert_ne!(a, RecordKey::new("www", "example.com.", "AAAA"));
        assert_ne!(a, RecordKey::new("www.example.com.", "example.com.", "A"));
        assert_ne!(a, RecordKey::new("www", "example.org.", "A"));
    }

    #[test]
    fn test_key_type_forms() {
        let key = RecordKey::new("www", "example.com.", "cname");
        assert_eq!(key.canonical_type(), "CNAME (5)");
        assert_eq!(key.short_type(), "CNAME");
    }

    #[test]
    fn test_identifier_from_raw_and_decode() {
        let id = RecordIdentifier::from_raw("www:example.com.:A");
        assert_eq!(id.to_string(), "www:example.com.:A");
        assert_eq!(
            id.decode().unwrap(),
            RecordKey::new("www", "example.com.", "A")
        );

        assert!(RecordIdentifier::from_raw("garbage").decode().is_err());
    }

    #[test]
    fn test_identifier_serializes_as_plain_string() {
        let id = RecordKey::new("www", "example.com.", "A").identifier();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"www:example.com.:A\"");

        let back: RecordIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
