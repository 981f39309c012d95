//! Routing key validation
//!
//! Checks caller-supplied key names against the fixed valid set and the
//! configured required set before anything is resolved.

use crate::error::{Result, TokenError};
use crate::key::RoutingKey;
use std::collections::BTreeSet;

/// Required keys absent from `names`, in key order.
pub fn missing_required_keys<'a>(
    names: impl IntoIterator<Item = &'a str>,
    required: &BTreeSet<RoutingKey>,
) -> Vec<RoutingKey> {
    let present: BTreeSet<RoutingKey> = names
        .into_iter()
        .filter_map(|name| name.parse().ok())
        .collect();

    required.difference(&present).copied().collect()
}

/// Names in `names` that are not routing keys, in input order.
pub fn invalid_keys<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| name.parse::<RoutingKey>().is_err())
        .map(str::to_string)
        .collect()
}

/// Validate caller key names and return them as typed keys.
///
/// Both checks always run; when both fail the missing-required error is
/// the one returned.
///
/// # Errors
///
/// - [`TokenError::MissingRequiredRoutingKeys`] if a required key is absent
/// - [`TokenError::InvalidRoutingKeys`] if a name is not a routing key
pub fn validate_routing_keys<'a, I>(
    names: I,
    required: &BTreeSet<RoutingKey>,
) -> Result<BTreeSet<RoutingKey>>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let names = names.into_iter();
    let missing = missing_required_keys(names.clone(), required);
    let invalid = invalid_keys(names.clone());

    if !missing.is_empty() {
        return Err(TokenError::MissingRequiredRoutingKeys {
            missing,
            required: required.iter().copied().collect(),
        });
    }

    if !invalid.is_empty() {
        return Err(TokenError::InvalidRoutingKeys {
            invalid,
            valid: RoutingKey::ALL.to_vec(),
        });
    }

    Ok(names.filter_map(|name| name.parse().ok()).collect())
}
