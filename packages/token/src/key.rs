//! Routing keys
//!
//! Each key is a single lowercase letter on the wire. The set is closed:
//! adding a key changes the token format.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Partitioning dimension a routing value applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoutingKey {
    /// Deployment cell (`c`)
    Cell,
    /// Group (`g`)
    Group,
    /// Organization (`o`)
    Organization,
    /// Project (`p`)
    Project,
    /// User (`u`)
    User,
}

impl RoutingKey {
    /// Every valid key, in wire order
    pub const ALL: [RoutingKey; 5] = [
        RoutingKey::Cell,
        RoutingKey::Group,
        RoutingKey::Organization,
        RoutingKey::Project,
        RoutingKey::User,
    ];

    /// Single-character wire name
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            RoutingKey::Cell => 'c',
            RoutingKey::Group => 'g',
            RoutingKey::Organization => 'o',
            RoutingKey::Project => 'p',
            RoutingKey::User => 'u',
        }
    }

    /// Look up a key by its wire character
    #[must_use]
    pub const fn from_char(name: char) -> Option<Self> {
        match name {
            'c' => Some(RoutingKey::Cell),
            'g' => Some(RoutingKey::Group),
            'o' => Some(RoutingKey::Organization),
            'p' => Some(RoutingKey::Project),
            'u' => Some(RoutingKey::User),
            _ => None,
        }
    }
}

// Serialized pairs are sorted by wire name, so ordering follows it too.
impl Ord for RoutingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_char().cmp(&other.as_char())
    }
}

impl PartialOrd for RoutingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Rejected routing key name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoutingKey(pub String);

impl fmt::Display for UnknownRoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown routing key {:?}", self.0)
    }
}

impl std::error::Error for UnknownRoutingKey {}

impl FromStr for RoutingKey {
    type Err = UnknownRoutingKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(first), None) => {
                RoutingKey::from_char(first).ok_or_else(|| UnknownRoutingKey(name.to_string()))
            }
            _ => Err(UnknownRoutingKey(name.to_string())),
        }
    }
}

impl TryFrom<String> for RoutingKey {
    type Error = UnknownRoutingKey;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<RoutingKey> for String {
    fn from(key: RoutingKey) -> Self {
        key.to_string()
    }
}
