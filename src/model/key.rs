//! Object keys and composite item keys

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{PARTITION_PREFIX, SK_INDEX, SK_TOMBSTONE};

/// Opaque identifier of an object in the backing store.
///
/// The sole join key between notifications, requests and index state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Wrap a raw key. Returns `None` for the empty key.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Partition component shared by every item of this key
    pub fn partition(&self) -> String {
        format!("{}{}", PARTITION_PREFIX, self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of an item within a key's partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminator {
    /// The object is indexed
    Index,
    /// The object has been deleted; never re-index it
    Tombstone,
}

impl Discriminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discriminator::Index => SK_INDEX,
            Discriminator::Tombstone => SK_TOMBSTONE,
        }
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite (partition, discriminator) key of a physical item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Key of the index entry for `key`
    pub fn index_entry(key: &ObjectKey) -> Self {
        Self::new(key.partition(), Discriminator::Index.as_str())
    }

    /// Key of the tombstone for `key`
    pub fn tombstone(key: &ObjectKey) -> Self {
        Self::new(key.partition(), Discriminator::Tombstone.as_str())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(ObjectKey::new("").is_none());
        assert!(ObjectKey::new("a").is_some());
    }

    #[test]
    fn test_entry_and_tombstone_share_partition() {
        let key = ObjectKey::new("reports/2024.csv").unwrap();
        let entry = ItemKey::index_entry(&key);
        let tombstone = ItemKey::tombstone(&key);

        assert_eq!(entry.pk, "OBJECT#reports/2024.csv");
        assert_eq!(entry.pk, tombstone.pk);
        assert_eq!(entry.sk, "INDEX");
        assert_eq!(tombstone.sk, "TOMBSTONE");
        assert_ne!(entry, tombstone);
    }
}
