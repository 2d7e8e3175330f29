//! Index table schema constants
//!
//! ## Table Schema
//!
//! ```text
//! Table: configured via FILES_TABLE_NAME
//!
//! Primary Key:
//!   - PK (String, Partition Key): "OBJECT#<objectKey>"
//!   - SK (String, Sort Key): "INDEX" | "TOMBSTONE"
//!
//! Index entry attributes:
//!   - object_key, size, content_hash, version_id, sequence_token,
//!     request_id, requester_id, source_address, reason
//!   - bucket (optional), event_time (optional, RFC 3339)
//!
//! Tombstone attributes:
//!   - object_key
//! ```

/// Partition key attribute
pub const ATTR_PK: &str = "PK";

/// Sort key attribute (the discriminator)
pub const ATTR_SK: &str = "SK";

/// Prefix of every partition component
pub const PARTITION_PREFIX: &str = "OBJECT#";

/// Discriminator value for index entries
pub const SK_INDEX: &str = "INDEX";

/// Discriminator value for tombstones
pub const SK_TOMBSTONE: &str = "TOMBSTONE";

/// Environment binding naming the target table
pub const ENV_TABLE_NAME: &str = "FILES_TABLE_NAME";
