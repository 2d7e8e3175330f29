//! Data model for the object index
//!
//! Every logical object key maps to at most two physical items that share a
//! partition component:
//!
//! ```text
//! PK = OBJECT#<objectKey>   SK = INDEX       index entry (object is present)
//! PK = OBJECT#<objectKey>   SK = TOMBSTONE   tombstone (object was deleted)
//! ```
//!
//! A tombstone is a one-way latch: once written, no later transaction may
//! (re)introduce the index entry for the same key.

mod events;
mod key;
mod records;
pub mod schema;

pub use events::{
    BucketRef, CreationNotification, DeletionRequest, ObjectCreatedDetail, ObjectCreatedEvent,
    ObjectRef,
};
pub use key::{Discriminator, ItemKey, ObjectKey};
pub use records::{IndexEntry, Item, Tombstone};
