//! Wire data model for the SCS object storage client.
//!
//! Listing, metadata and multipart-session endpoints answer with JSON (the
//! client always asks for `formatter=json`); these records mirror those
//! bodies. Object metadata travels in response headers and is collected into
//! [`ObjectMeta`]. Non-success responses are described by [`ServiceError`].

pub mod acl;
pub mod error;
pub mod headers;
pub mod multipart;
pub mod types;

pub use acl::{Acl, AclInfo, CannedAcl, ParseCannedAclError};
pub use error::ServiceError;
pub use multipart::{ListParts, MultipartUpload, Part};
pub use types::{
    BucketInfo, BucketList, BucketMeta, CommonPrefix, ListObjects, ObjectInfo, ObjectMeta, Owner,
};
