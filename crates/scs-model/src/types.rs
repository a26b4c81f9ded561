//! Bucket and object records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::acl::Acl;

/// Account owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// User id.
    #[serde(rename = "ID", default)]
    pub id: String,
}

/// One entry of the bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// Bytes stored in the bucket.
    #[serde(default)]
    pub consumed_bytes: u64,
    /// Creation date as reported by the service.
    #[serde(default)]
    pub creation_date: String,
}

/// Response to `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketList {
    /// Account owner.
    #[serde(default)]
    pub owner: Owner,
    /// Buckets owned by the account.
    #[serde(default)]
    pub buckets: Vec<BucketInfo>,
}

/// Response to `GET /bucket/?meta`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(missing_docs)]
pub struct BucketMeta {
    pub project: String,
    #[serde(rename = "ProjectID")]
    pub project_id: i64,
    pub owner: String,
    pub last_modified: String,
    #[serde(rename = "ACL")]
    pub acl: Acl,
    pub capacity: i64,
    pub capacity_c: i64,
    pub quantity: i64,
    pub quantity_c: i64,
    pub size_c: i64,
    pub upload_capacity: i64,
    pub upload_quantity: i64,
    pub download_capacity: i64,
    pub download_quantity: i64,
    pub delete_capacity: i64,
    pub delete_quantity: i64,
}

/// A key prefix grouped under a delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonPrefix {
    /// The grouped prefix, delimiter included.
    #[serde(rename = "Prefix")]
    pub prefix: String,
}

/// One object in a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ObjectInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Size", default)]
    pub size: u64,
    #[serde(rename = "MD5", default)]
    pub md5: Option<String>,
    #[serde(rename = "SHA1", default)]
    pub sha1: Option<String>,
    #[serde(rename = "Content-Type", default)]
    pub content_type: Option<String>,
    #[serde(rename = "Last-Modified", default)]
    pub last_modified: Option<String>,
    #[serde(rename = "Expiration-Time", default)]
    pub expiration_time: Option<String>,
    #[serde(rename = "Owner", default)]
    pub owner: Option<String>,
}

/// Response to `GET /bucket/` (object listing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjects {
    /// Delimiter echoed back.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Prefix echoed back.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Marker echoed back.
    #[serde(default)]
    pub marker: Option<String>,
    /// Marker for the next page when truncated.
    #[serde(default)]
    pub next_marker: Option<String>,
    /// Whether more keys follow.
    #[serde(default)]
    pub is_truncated: bool,
    /// Number of entries in `contents`.
    #[serde(default)]
    pub contents_quantity: u64,
    /// Number of entries in `common_prefixes`.
    #[serde(default)]
    pub common_prefixes_quantity: u64,
    /// Objects.
    #[serde(default)]
    pub contents: Vec<ObjectInfo>,
    /// Grouped prefixes.
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
}

/// Object metadata collected from `HEAD` response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectMeta {
    /// `Content-Type`.
    pub content_type: String,
    /// `Content-Length`, or `X-Filesize` when the former is missing.
    pub content_length: u64,
    /// `ETag`.
    pub etag: String,
    /// `Last-Modified`.
    pub last_modified: String,
    /// Custom `x-amz-meta-*` headers keyed by lowercase header name.
    pub metadata: BTreeMap<String, String>,
}
