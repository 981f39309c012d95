//! Validator, resolver, size guard and encoder stages

#![allow(clippy::expect_used)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use proptest::prelude::*;
use routable_token::encoder::{self, encode_with_random, TokenEncoder};
use routable_token::guard::{self, PayloadSizeGuard};
use routable_token::integrity;
use routable_token::validator::{invalid_keys, missing_required_keys, validate_routing_keys};
use routable_token::{
    FixedEntropy, RoutingKey, RoutingPayload, RoutingPayloadResolver, RoutingValueSource,
    TokenError,
};
use std::collections::BTreeSet;

fn required(keys: &[RoutingKey]) -> BTreeSet<RoutingKey> {
    keys.iter().copied().collect()
}

#[test]
fn test_routing_key_names() {
    let names: String = RoutingKey::ALL.iter().map(|key| key.as_char()).collect();
    assert_eq!(names, "cgopu");
    assert_eq!("o".parse::<RoutingKey>(), Ok(RoutingKey::Organization));
    assert!("org".parse::<RoutingKey>().is_err());
    assert!("O".parse::<RoutingKey>().is_err());
    assert!("".parse::<RoutingKey>().is_err());
}

#[test]
fn test_validation_accepts_known_keys() {
    let keys = validate_routing_keys(["u", "o"], &required(&[RoutingKey::Organization]))
        .expect("keys should validate");

    assert_eq!(keys, required(&[RoutingKey::Organization, RoutingKey::User]));
}

#[test]
fn test_validation_reports_both_failures_independently() {
    let required = required(&[RoutingKey::Organization, RoutingKey::User]);
    let names = ["u", "z", "zone"];

    assert_eq!(missing_required_keys(names, &required), vec![RoutingKey::Organization]);
    assert_eq!(invalid_keys(names), vec!["z".to_string(), "zone".to_string()]);

    assert!(matches!(
        validate_routing_keys(names, &required),
        Err(TokenError::MissingRequiredRoutingKeys { .. })
    ));
    assert!(matches!(
        validate_routing_keys(["o", "u", "z"], &required),
        Err(TokenError::InvalidRoutingKeys { .. })
    ));
}

#[test]
fn test_resolver_orders_by_key_name() {
    let resolver = RoutingPayloadResolver::for_cell(Some(35));
    let payload = RoutingPayload::new()
        .with_static(RoutingKey::User, 1)
        .with_static(RoutingKey::Project, "p")
        .with_static(RoutingKey::Group, 36)
        .with_static(RoutingKey::Organization, 0);

    let pairs = resolver.resolve(&(), &payload);

    assert_eq!(
        pairs.keys().collect::<Vec<_>>(),
        vec![
            RoutingKey::Cell,
            RoutingKey::Group,
            RoutingKey::Organization,
            RoutingKey::Project,
            RoutingKey::User,
        ]
    );
    assert_eq!(guard::serialize(&pairs), "c:z\ng:10\no:0\np:p\nu:1");
}

#[test]
fn test_resolver_evaluates_derived_sources_per_owner() {
    let resolver = RoutingPayloadResolver::for_cell(None);
    let payload = RoutingPayload::new().with("o", RoutingValueSource::derived(|id: &i64| *id));

    assert_eq!(resolver.resolve(&7, &payload).get(RoutingKey::Organization), Some("7"));
    assert_eq!(resolver.resolve(&72, &payload).get(RoutingKey::Organization), Some("20"));
    assert_eq!(resolver.resolve(&72, &payload).get(RoutingKey::Cell), None);
}

#[test]
fn test_serialize_empty_pairs() {
    let pairs = RoutingPayloadResolver::for_cell(None).resolve(&(), &RoutingPayload::new());
    assert!(pairs.is_empty());
    assert_eq!(guard::serialize(&pairs), "");
}

#[test]
fn test_size_guard_boundary() {
    let guard = PayloadSizeGuard::new(4);

    assert_eq!(guard.check("abcd".to_string()), Ok("abcd".to_string()));
    assert_eq!(
        guard.check("abcde".to_string()),
        Err(TokenError::PayloadTooLarge { size: 5, max: 4 })
    );
}

#[test]
fn test_size_guard_counts_bytes() {
    let guard = PayloadSizeGuard::new(4);
    // Four characters, eight bytes.
    assert_eq!(
        guard.check("éééé".to_string()),
        Err(TokenError::PayloadTooLarge { size: 8, max: 4 })
    );
}

#[test]
fn test_encoder_layout() {
    let random = [7u8; 16];
    let body = encode_with_random("tok_", "c:1", &random).expect("encoding should succeed");

    let (rest, marker) = body.split_at(body.len() - 2);
    let encoded = rest
        .strip_prefix("tok_")
        .and_then(|rest| rest.strip_suffix('.'))
        .expect("body should be prefix, payload, separator");

    assert!(!encoded.contains('='));
    assert_eq!(marker, format!("{:0>2}", routable_common::base36::encode_u64(encoded.len() as u64)));

    let raw = URL_SAFE_NO_PAD.decode(encoded).expect("payload should be base64url");
    assert_eq!(&raw[..3], b"c:1");
    assert_eq!(&raw[3..19], &random);
    assert_eq!(raw[19], 16);
}

#[test]
fn test_encoder_draws_from_entropy() {
    let entropy = FixedEntropy::new(vec![1, 2, 3]);
    let body = TokenEncoder::new(&entropy, 4)
        .encode("", "")
        .expect("encoding should succeed");

    let (encoded, _) = body.split_once('.').expect("body has a marker");
    let raw = URL_SAFE_NO_PAD.decode(encoded).expect("payload should be base64url");
    assert_eq!(raw, vec![1, 2, 3, 1, 4]);
}

#[test]
fn test_length_marker_overflow_is_rejected() {
    // 971 bytes encode to 1295 characters, the last length "zz" can hold.
    let fits = "x".repeat(971 - 17);
    let body = encode_with_random("", &fits, &[0u8; 16]).expect("fits the marker");
    assert!(body.ends_with(".zz"));

    let overflow = "x".repeat(972 - 17);
    assert_eq!(
        encode_with_random("", &overflow, &[0u8; 16]),
        Err(TokenError::LengthMarkerOverflow {
            length: 1296,
            max: 1295,
        })
    );
}

#[test]
fn test_encoded_length_matches_base64() {
    for len in 0..64 {
        let raw = vec![0u8; len];
        assert_eq!(encoder::encoded_length(len), URL_SAFE_NO_PAD.encode(&raw).len());
    }
}

#[test]
fn test_checksum_width() {
    assert_eq!(integrity::checksum(""), "0000000");
    assert_eq!(integrity::checksum("123456789"), "1kl8mjq");
    assert_eq!(integrity::append_checksum("abc".to_string()).len(), 10);
}

fn arb_payload() -> impl Strategy<Value = Vec<(RoutingKey, String)>> {
    prop::collection::vec(
        (
            prop::sample::select(RoutingKey::ALL.to_vec()),
            "[a-z0-9-]{1,12}",
        ),
        0..8,
    )
}

proptest! {
    #[test]
    fn prop_serialization_sorted_regardless_of_insertion_order(entries in arb_payload()) {
        let mut forward = RoutingPayload::new();
        let mut backward = RoutingPayload::new();
        for (key, value) in &entries {
            forward.insert(key.to_string(), RoutingValueSource::fixed(value.as_str()));
        }
        // Later inserts win, so reverse after de-duplicating.
        let mut unique = std::collections::BTreeMap::new();
        for (key, value) in &entries {
            unique.insert(*key, value.clone());
        }
        for (key, value) in unique.iter().rev() {
            backward.insert(key.to_string(), RoutingValueSource::fixed(value.as_str()));
        }

        let resolver = RoutingPayloadResolver::for_cell(None);
        let forward = guard::serialize(&resolver.resolve(&(), &forward));
        let backward = guard::serialize(&resolver.resolve(&(), &backward));
        prop_assert_eq!(&forward, &backward);

        let keys: Vec<&str> = forward
            .lines()
            .filter_map(|line| line.split(':').next())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn prop_missing_required_always_rejected(
        required_keys in prop::collection::btree_set(prop::sample::select(RoutingKey::ALL.to_vec()), 1..5),
        present in prop::collection::btree_set(prop::sample::select(RoutingKey::ALL.to_vec()), 0..5),
    ) {
        let names: Vec<String> = present.iter().map(ToString::to_string).collect();
        let result = validate_routing_keys(names.iter().map(String::as_str), &required_keys);

        if required_keys.is_subset(&present) {
            prop_assert_eq!(result, Ok(present));
        } else {
            let is_missing = matches!(result, Err(TokenError::MissingRequiredRoutingKeys { .. }));
            prop_assert!(is_missing);
        }
    }

    #[test]
    fn prop_unknown_names_always_rejected(name in "[a-z]{1,3}") {
        prop_assume!(name.parse::<RoutingKey>().is_err());
        let result = validate_routing_keys(["o", name.as_str()], &required(&[RoutingKey::Organization]));
        prop_assert_eq!(
            result,
            Err(TokenError::InvalidRoutingKeys {
                invalid: vec![name.clone()],
                valid: RoutingKey::ALL.to_vec(),
            })
        );
    }
}
