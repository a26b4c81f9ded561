//! Multipart upload records.

use serde::{Deserialize, Serialize};

/// Response to `POST ?multipart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultipartUpload {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Object key.
    #[serde(default)]
    pub key: String,
    /// Upload identifier addressing the session.
    pub upload_id: String,
}

/// One uploaded part.
///
/// The complete-upload request body is a JSON array of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// 1-based part number.
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
    /// Opaque digest returned by the service.
    #[serde(rename = "ETag", default)]
    pub etag: String,
    /// Part size in bytes.
    #[serde(rename = "Size", default)]
    pub size: u64,
    /// Set by the service in part listings only.
    #[serde(
        rename = "Last-Modified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
}

/// Response to `GET ?uploadId=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListParts {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Object key.
    #[serde(default)]
    pub key: String,
    /// Upload identifier.
    #[serde(default)]
    pub upload_id: String,
    /// Whether more parts follow.
    #[serde(default)]
    pub is_truncated: bool,
    /// Parts recorded by the service, ordered by part number.
    #[serde(default, alias = "Part")]
    pub parts: Vec<Part>,
}

impl ListParts {
    /// Part numbers recorded by the service.
    pub fn part_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.parts.iter().map(|p| p.part_number)
    }
}
