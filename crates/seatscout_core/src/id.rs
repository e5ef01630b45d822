//! Type-safe CRM identifiers
//!
//! The CRM reports activity under two identifier spaces: the owner id that
//! tags records and engagements, and the login user id used by the
//! authentication subsystem. Both are opaque strings on the wire, so they are
//! wrapped in a marker-typed newtype to keep them from being mixed up.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Trait for types that can be used as ID markers
pub trait IdType: Send + Sync + 'static {
    /// Short label used in debug output (e.g. "owner", "login")
    const PREFIX: &'static str;
}

/// An opaque identifier tagged with the identifier space it belongs to
pub struct ExternalId<T> {
    value: String,
    _phantom: PhantomData<T>,
}

impl<T: IdType> ExternalId<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _phantom: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Manual impls so the marker type does not need to implement anything.
impl<T> Clone for ExternalId<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> PartialEq for ExternalId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for ExternalId<T> {}

impl<T> PartialOrd for ExternalId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ExternalId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for ExternalId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Borrow<str> for ExternalId<T> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl<T: IdType> fmt::Debug for ExternalId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", T::PREFIX, self.value)
    }
}

impl<T> Display for ExternalId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdType> From<&str> for ExternalId<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdType> From<String> for ExternalId<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for ExternalId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdType> Deserialize<'de> for ExternalId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Marker for the CRM owner identifier space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerIdType;

impl IdType for OwnerIdType {
    const PREFIX: &'static str = "owner";
}

/// Marker for the login-history identifier space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoginIdType;

impl IdType for LoginIdType {
    const PREFIX: &'static str = "login";
}

/// Stable CRM identity used to tag records and engagements
pub type OwnerId = ExternalId<OwnerIdType>;

/// Identity used by the login-history subsystem
pub type LoginId = ExternalId<LoginIdType>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_debug_carries_prefix() {
        let owner = OwnerId::new("42");
        let login = LoginId::new("42");
        assert_eq!(format!("{:?}", owner), "owner:42");
        assert_eq!(format!("{:?}", login), "login:42");
        assert_eq!(owner.to_string(), "42");
    }

    #[test]
    fn test_map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(OwnerId::new("7"), 1);
        assert_eq!(map.get("7"), Some(&1));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = OwnerId::new("1001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1001\"");
        let back: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
