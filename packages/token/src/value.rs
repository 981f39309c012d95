//! Routing values and the caller-supplied payload

use crate::key::RoutingKey;
use routable_common::base36;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Value produced for a routing key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingValue {
    /// Numeric id, written in base36
    Integer(i64),
    /// Written verbatim
    Text(String),
    /// No value; the entry is dropped
    Empty,
}

impl RoutingValue {
    /// Wire form of the value, or `None` when it is blank.
    ///
    /// Whitespace-only text counts as blank.
    #[must_use]
    pub fn format(&self) -> Option<String> {
        match self {
            RoutingValue::Integer(id) => Some(base36::encode_i64(*id)),
            RoutingValue::Text(text) if text.trim().is_empty() => None,
            RoutingValue::Text(text) => Some(text.clone()),
            RoutingValue::Empty => None,
        }
    }
}

impl From<i64> for RoutingValue {
    fn from(id: i64) -> Self {
        RoutingValue::Integer(id)
    }
}

impl From<i32> for RoutingValue {
    fn from(id: i32) -> Self {
        RoutingValue::Integer(i64::from(id))
    }
}

impl From<u32> for RoutingValue {
    fn from(id: u32) -> Self {
        RoutingValue::Integer(i64::from(id))
    }
}

impl From<String> for RoutingValue {
    fn from(text: String) -> Self {
        RoutingValue::Text(text)
    }
}

impl From<&str> for RoutingValue {
    fn from(text: &str) -> Self {
        RoutingValue::Text(text.to_string())
    }
}

impl<T: Into<RoutingValue>> From<Option<T>> for RoutingValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RoutingValue::Empty, Into::into)
    }
}

type Generator<O> = Arc<dyn Fn(&O) -> RoutingValue + Send + Sync>;

/// Where a routing value comes from
pub enum RoutingValueSource<O: ?Sized> {
    /// Fixed value
    Static(RoutingValue),
    /// Computed from the token owner at mint time
    Derived(Generator<O>),
}

impl<O: ?Sized> RoutingValueSource<O> {
    /// Fixed value source
    pub fn fixed(value: impl Into<RoutingValue>) -> Self {
        RoutingValueSource::Static(value.into())
    }

    /// Source evaluated against the owner
    pub fn derived<F, V>(generator: F) -> Self
    where
        F: Fn(&O) -> V + Send + Sync + 'static,
        V: Into<RoutingValue>,
    {
        RoutingValueSource::Derived(Arc::new(move |owner: &O| generator(owner).into()))
    }

    /// Evaluate the source for `owner`
    pub fn evaluate(&self, owner: &O) -> RoutingValue {
        match self {
            RoutingValueSource::Static(value) => value.clone(),
            RoutingValueSource::Derived(generator) => generator(owner),
        }
    }
}

impl<O: ?Sized> Clone for RoutingValueSource<O> {
    fn clone(&self) -> Self {
        match self {
            RoutingValueSource::Static(value) => RoutingValueSource::Static(value.clone()),
            RoutingValueSource::Derived(generator) => {
                RoutingValueSource::Derived(Arc::clone(generator))
            }
        }
    }
}

impl<O: ?Sized> fmt::Debug for RoutingValueSource<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingValueSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            RoutingValueSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Caller-supplied routing entries, keyed by raw key name
///
/// Names are checked against [`RoutingKey`] when a token is minted, so a
/// payload may hold names the codec will reject.
pub struct RoutingPayload<O: ?Sized> {
    entries: BTreeMap<String, RoutingValueSource<O>>,
}

impl<O: ?Sized> RoutingPayload<O> {
    /// Empty payload; codec defaults still apply
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add an entry by raw key name, replacing any previous one
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, source: RoutingValueSource<O>) -> Self {
        self.insert(name, source);
        self
    }

    /// Add a fixed value for a known key
    #[must_use]
    pub fn with_static(self, key: RoutingKey, value: impl Into<RoutingValue>) -> Self {
        self.with(key.to_string(), RoutingValueSource::fixed(value))
    }

    /// Add an owner-derived value for a known key
    #[must_use]
    pub fn with_derived<F, V>(self, key: RoutingKey, generator: F) -> Self
    where
        F: Fn(&O) -> V + Send + Sync + 'static,
        V: Into<RoutingValue>,
    {
        self.with(key.to_string(), RoutingValueSource::derived(generator))
    }

    /// Insert an entry by raw key name
    pub fn insert(&mut self, name: impl Into<String>, source: RoutingValueSource<O>) {
        self.entries.insert(name.into(), source);
    }

    /// Raw key names in the payload
    pub fn names(&self) -> impl Iterator<Item = &str> + Clone {
        self.entries.keys().map(String::as_str)
    }

    /// Entries by raw key name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoutingValueSource<O>)> {
        self.entries.iter().map(|(name, source)| (name.as_str(), source))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<O: ?Sized> Default for RoutingPayload<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized> Clone for RoutingPayload<O> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<O: ?Sized> fmt::Debug for RoutingPayload<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
