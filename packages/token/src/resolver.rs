//! Routing payload resolution
//!
//! Merges the codec defaults with the caller payload, evaluates every source
//! against the owner and yields formatted pairs in key order.

use crate::key::RoutingKey;
use crate::value::{RoutingPayload, RoutingValue, RoutingValueSource};
use std::collections::BTreeMap;

/// Formatted routing pairs, sorted by key with blanks removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRoutingPairs(Vec<(RoutingKey, String)>);

impl ResolvedRoutingPairs {
    /// Pairs in serialization order
    #[must_use]
    pub fn pairs(&self) -> &[(RoutingKey, String)] {
        &self.0
    }

    /// Keys in serialization order
    pub fn keys(&self) -> impl Iterator<Item = RoutingKey> + '_ {
        self.0.iter().map(|(key, _)| *key)
    }

    /// Formatted value for `key`
    #[must_use]
    pub fn get(&self, key: RoutingKey) -> Option<&str> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no pair survived resolution
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ResolvedRoutingPairs {
    type Item = (RoutingKey, String);
    type IntoIter = std::vec::IntoIter<(RoutingKey, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolves caller payloads on top of a fixed set of defaults
pub struct RoutingPayloadResolver<O: ?Sized> {
    defaults: BTreeMap<RoutingKey, RoutingValueSource<O>>,
}

impl<O: ?Sized> RoutingPayloadResolver<O> {
    /// Resolver with explicit defaults
    #[must_use]
    pub fn new(defaults: BTreeMap<RoutingKey, RoutingValueSource<O>>) -> Self {
        Self { defaults }
    }

    /// Resolver whose only default is the deployment cell
    ///
    /// `None` means the process has no cell, so no `c` pair is emitted
    /// unless the caller supplies one.
    #[must_use]
    pub fn for_cell(cell_id: Option<i64>) -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert(
            RoutingKey::Cell,
            RoutingValueSource::Static(RoutingValue::from(cell_id)),
        );
        Self::new(defaults)
    }

    /// Default sources
    #[must_use]
    pub fn defaults(&self) -> &BTreeMap<RoutingKey, RoutingValueSource<O>> {
        &self.defaults
    }

    /// Resolve `payload` for `owner`.
    ///
    /// Caller entries replace defaults for the same key. Names that are not
    /// routing keys are skipped, so payloads must be validated first.
    pub fn resolve(&self, owner: &O, payload: &RoutingPayload<O>) -> ResolvedRoutingPairs {
        let mut merged: BTreeMap<RoutingKey, &RoutingValueSource<O>> = self
            .defaults
            .iter()
            .map(|(key, source)| (*key, source))
            .collect();

        for (name, source) in payload.iter() {
            if let Ok(key) = name.parse::<RoutingKey>() {
                merged.insert(key, source);
            }
        }

        // BTreeMap iteration follows RoutingKey's wire-name ordering.
        let pairs = merged
            .into_iter()
            .filter_map(|(key, source)| source.evaluate(owner).format().map(|value| (key, value)))
            .collect();

        ResolvedRoutingPairs(pairs)
    }
}

impl<O: ?Sized> Clone for RoutingPayloadResolver<O> {
    fn clone(&self) -> Self {
        Self {
            defaults: self.defaults.clone(),
        }
    }
}

impl<O: ?Sized> std::fmt::Debug for RoutingPayloadResolver<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingPayloadResolver")
            .field("defaults", &self.defaults)
            .finish()
    }
}
