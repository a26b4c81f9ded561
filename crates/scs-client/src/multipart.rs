//! Multipart upload sessions.
//!
//! A [`MultipartSession`] is an upload that has been initiated and not yet
//! completed. It remembers every part the service acknowledged, can compare
//! that list with the service's own view, and is consumed by
//! [`complete`](MultipartSession::complete) so a finished upload cannot be
//! used again.

use std::collections::BTreeMap;
use std::io::Read;

use scs_model::{ListParts, Part};
use tracing::{debug, warn};

use crate::bucket::Bucket;
use crate::digest::LengthAware;
use crate::error::Result;

/// An active multipart upload.
///
/// Part numbers are chosen by the caller. Uploading the same number twice
/// replaces the earlier part, as it does on the service.
#[derive(Debug)]
pub struct MultipartSession {
    bucket: Bucket,
    key: String,
    upload_id: String,
    parts: BTreeMap<u32, Part>,
}

impl MultipartSession {
    /// Track an upload, e.g. one initiated by another process.
    pub fn new(bucket: Bucket, key: impl Into<String>, upload_id: impl Into<String>) -> Self {
        Self {
            bucket,
            key: key.into(),
            upload_id: upload_id.into(),
            parts: BTreeMap::new(),
        }
    }

    /// Object key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upload identifier.
    #[must_use]
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Acknowledged parts, ordered by part number.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Upload one part and record it.
    pub async fn upload_part<R>(&mut self, part_number: u32, body: R) -> Result<&Part>
    where
        R: Read + LengthAware + Send + 'static,
    {
        let part = self
            .bucket
            .upload_part(&self.key, &self.upload_id, part_number, body)
            .await?;
        Ok(self.record_part(part))
    }

    /// Record a part uploaded outside this session, e.g. from another task.
    pub fn record_part(&mut self, part: Part) -> &Part {
        let number = part.part_number;
        if self.parts.insert(number, part).is_some() {
            debug!(upload_id = %self.upload_id, part_number = number, "replaced part");
        }
        &self.parts[&number]
    }

    /// The parts the service has recorded.
    pub async fn list_parts(&self) -> Result<ListParts> {
        self.bucket.list_parts(&self.key, &self.upload_id).await
    }

    /// Part numbers acknowledged locally but missing from the service's
    /// listing.
    pub async fn missing_parts(&self) -> Result<Vec<u32>> {
        let remote = self.list_parts().await?;
        let missing = missing_part_numbers(&self.parts, &remote);
        if !missing.is_empty() {
            warn!(
                upload_id = %self.upload_id,
                missing = ?missing,
                "service is missing acknowledged parts"
            );
        }
        Ok(missing)
    }

    /// Complete the upload with every recorded part, in part-number order.
    pub async fn complete(self) -> Result<()> {
        let parts: Vec<Part> = self.parts.into_values().collect();
        self.bucket
            .complete_multipart_upload(&self.key, &self.upload_id, &parts)
            .await
    }
}

fn missing_part_numbers(local: &BTreeMap<u32, Part>, remote: &ListParts) -> Vec<u32> {
    local
        .keys()
        .copied()
        .filter(|n| !remote.part_numbers().any(|r| r == *n))
        .collect()
}
