//! Persisted index records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::events::CreationNotification;
use super::key::{Discriminator, ObjectKey};

/// The store's item representation: attribute name -> value
pub type Item = Map<String, Value>;

/// "Object k is indexed/present."
///
/// Carries the notification's metadata as opaque payload. There are no
/// wall-clock fields, so identical notifications produce identical entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub object_key: String,
    pub size: u64,
    pub content_hash: String,
    pub version_id: String,
    pub sequence_token: String,
    pub request_id: String,
    pub requester_id: String,
    pub source_address: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,
}

impl IndexEntry {
    /// Build the entry for `key` from a creation notification
    pub fn from_notification(key: &ObjectKey, notification: &CreationNotification) -> Self {
        Self {
            pk: key.partition(),
            sk: Discriminator::Index.as_str().to_string(),
            object_key: key.as_str().to_string(),
            size: notification.size,
            content_hash: notification.content_hash.clone(),
            version_id: notification.version_id.clone(),
            sequence_token: notification.sequence_token.clone(),
            request_id: notification.request_id.clone(),
            requester_id: notification.requester_id.clone(),
            source_address: notification.source_address.clone(),
            reason: notification.reason.clone(),
            bucket: notification.bucket.clone(),
            event_time: notification.event_time,
        }
    }
}

/// "Object k has been deleted; never re-index it."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub object_key: String,
}

impl Tombstone {
    pub fn for_key(key: &ObjectKey) -> Self {
        Self {
            pk: key.partition(),
            sk: Discriminator::Tombstone.as_str().to_string(),
            object_key: key.as_str().to_string(),
        }
    }
}
