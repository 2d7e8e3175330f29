//! # Inbound Notifications
//!
//! Creation notifications derived from object-store activity and deletion
//! requests derived from direct API calls. Both may arrive duplicated and in
//! any order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An object was created in the backing store.
///
/// Only `object_key` participates in index decisions; the rest is persisted
/// onto the index entry as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationNotification {
    pub object_key: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_hash: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub sequence_token: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub requester_id: String,
    #[serde(default)]
    pub source_address: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,
}

impl CreationNotification {
    /// Notification carrying only a key, all metadata defaulted
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            object_key: key.into(),
            ..Default::default()
        }
    }
}

/// Request to delete an object from the index.
///
/// `key` is accepted as the wire name used by older callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    #[serde(alias = "key")]
    pub object_key: String,
}

impl DeletionRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            object_key: key.into(),
        }
    }
}

/// Event-bus envelope for an "Object Created" event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    #[serde(default)]
    pub source: String,
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub detail: ObjectCreatedDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectCreatedDetail {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub bucket: BucketRef,
    pub object: ObjectRef,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub requester: String,
    #[serde(default)]
    pub source_ip_address: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObjectRef {
    pub key: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub sequencer: String,
}

impl From<ObjectCreatedEvent> for CreationNotification {
    fn from(event: ObjectCreatedEvent) -> Self {
        let detail = event.detail;
        let bucket = Some(detail.bucket.name).filter(|name| !name.is_empty());
        Self {
            object_key: detail.object.key,
            size: detail.object.size,
            content_hash: detail.object.etag,
            version_id: detail.object.version_id,
            sequence_token: detail.object.sequencer,
            request_id: detail.request_id,
            requester_id: detail.requester,
            source_address: detail.source_ip_address,
            reason: detail.reason,
            bucket,
            event_time: event.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_defaults_metadata() {
        let n: CreationNotification =
            serde_json::from_value(json!({ "objectKey": "a.txt" })).unwrap();
        assert_eq!(n, CreationNotification::for_key("a.txt"));
    }

    #[test]
    fn test_notification_wire_names() {
        let n: CreationNotification = serde_json::from_value(json!({
            "objectKey": "a.txt",
            "size": 11,
            "contentHash": "5eb63bbbe01eeed093cb22bb8f5acdc3",
            "versionId": "v1",
            "sequenceToken": "0062E99A88DC407460",
            "requestId": "req-1",
            "requesterId": "123456789012",
            "sourceAddress": "10.0.0.1",
            "reason": "PutObject"
        }))
        .unwrap();
        assert_eq!(n.size, 11);
        assert_eq!(n.sequence_token, "0062E99A88DC407460");
        assert_eq!(n.reason, "PutObject");
    }

    #[test]
    fn test_deletion_request_accepts_legacy_key() {
        let a: DeletionRequest = serde_json::from_value(json!({ "objectKey": "x" })).unwrap();
        let b: DeletionRequest = serde_json::from_value(json!({ "key": "x" })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_envelope_conversion() {
        let event: ObjectCreatedEvent = serde_json::from_value(json!({
            "version": "0",
            "detail-type": "Object Created",
            "source": "aws.s3",
            "time": "2024-03-01T12:00:00Z",
            "detail": {
                "version": "0",
                "bucket": { "name": "files" },
                "object": {
                    "key": "reports/2024.csv",
                    "size": 42,
                    "etag": "abc",
                    "version-id": "v7",
                    "sequencer": "00AA"
                },
                "request-id": "r-1",
                "requester": "123456789012",
                "source-ip-address": "10.0.0.9",
                "reason": "PutObject"
            }
        }))
        .unwrap();
        assert_eq!(event.detail_type, "Object Created");

        let n = CreationNotification::from(event);
        assert_eq!(n.object_key, "reports/2024.csv");
        assert_eq!(n.content_hash, "abc");
        assert_eq!(n.version_id, "v7");
        assert_eq!(n.sequence_token, "00AA");
        assert_eq!(n.source_address, "10.0.0.9");
        assert_eq!(n.bucket.as_deref(), Some("files"));
        assert!(n.event_time.is_some());
    }
}
