//! Request decoding
//!
//! A creation request body is either a flat `CreationNotification` or the
//! event-bus envelope (`ObjectCreatedEvent`), recognized by its `detail`
//! member. Undecodable bodies are encoding errors.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::index::{IndexError, IndexResult};
use crate::model::{CreationNotification, DeletionRequest, ObjectCreatedEvent};

/// Decode a creation request body
pub fn decode_notification(body: &[u8]) -> IndexResult<CreationNotification> {
    let value: Value = parse(body)?;

    if value.get("detail").is_some() {
        let event: ObjectCreatedEvent = from_value(value, "object-created event")?;
        Ok(event.into())
    } else {
        from_value(value, "creation notification")
    }
}

/// Decode a deletion request body
pub fn decode_deletion(body: &[u8]) -> IndexResult<DeletionRequest> {
    from_value(parse(body)?, "deletion request")
}

fn parse(body: &[u8]) -> IndexResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| IndexError::encoding(format!("Request body is not valid JSON: {}", e)))
}

fn from_value<T: DeserializeOwned>(value: Value, what: &str) -> IndexResult<T> {
    serde_json::from_value(value).map_err(|e| IndexError::encoding(format!("Invalid {}: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;

    #[test]
    fn test_flat_notification() {
        let n = decode_notification(br#"{ "objectKey": "a.txt", "size": 12 }"#).unwrap();
        assert_eq!(n.object_key, "a.txt");
        assert_eq!(n.size, 12);
        assert!(n.content_hash.is_empty());
    }

    #[test]
    fn test_envelope_notification() {
        let body = br#"{
            "source": "aws.s3",
            "detail-type": "Object Created",
            "time": "2024-05-01T12:00:00Z",
            "detail": {
                "bucket": { "name": "uploads" },
                "object": { "key": "img/cat.png", "size": 512, "etag": "e1", "sequencer": "0A1" },
                "request-id": "r-1",
                "requester": "123456789012",
                "source-ip-address": "10.0.0.1",
                "reason": "PutObject"
            }
        }"#;

        let n = decode_notification(body).unwrap();
        assert_eq!(n.object_key, "img/cat.png");
        assert_eq!(n.size, 512);
        assert_eq!(n.content_hash, "e1");
        assert_eq!(n.sequence_token, "0A1");
        assert_eq!(n.bucket.as_deref(), Some("uploads"));
        assert!(n.event_time.is_some());
    }

    #[test]
    fn test_deletion_accepts_legacy_key() {
        assert_eq!(decode_deletion(br#"{ "objectKey": "x" }"#).unwrap().object_key, "x");
        assert_eq!(decode_deletion(br#"{ "key": "y" }"#).unwrap().object_key, "y");
    }

    #[test]
    fn test_malformed_body_is_encoding_error() {
        let err = decode_notification(b"{ not json").unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::EncodingFailed);

        let err = decode_deletion(br#"{ "objectKey": 7 }"#).unwrap_err();
        assert_eq!(err.code(), IndexErrorCode::EncodingFailed);
    }
}
