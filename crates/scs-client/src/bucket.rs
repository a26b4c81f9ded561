//! Object operations on one bucket.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HeaderMap, HeaderValue, LAST_MODIFIED, RANGE};
use http::Method;
use scs_model::headers::{CONTENT_MD5, X_AMZ_META_PREFIX, X_FILESIZE};
use scs_model::{ListObjects, ListParts, MultipartUpload, ObjectMeta, Part};
use tracing::debug;

use crate::body::{ObjectStream, RequestBody};
use crate::digest::{DigestAlgorithm, LengthAware, digest};
use crate::error::{Result, ScsError};
use crate::multipart::MultipartSession;
use crate::request::Request;
use crate::transport::Client;

/// Custom object metadata: `x-amz-meta-*` header name to value.
pub type Metadata = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// ByteRange
// ---------------------------------------------------------------------------

/// Inclusive byte range for object reads.
///
/// # Examples
///
/// ```
/// use scs_client::ByteRange;
///
/// assert_eq!(ByteRange::new(5, Some(10)).header_value().as_deref(), Some("bytes=5-10"));
/// assert_eq!(ByteRange::new(5, None).header_value().as_deref(), Some("bytes=5-"));
/// assert_eq!(ByteRange::new(0, Some(0)).header_value(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    /// First byte.
    pub start: u64,
    /// Last byte, inclusive; `None` reads to the end.
    pub end: Option<u64>,
}

impl ByteRange {
    /// Create a range.
    #[must_use]
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// `len` bytes starting at `offset`; a zero `len` reads to the end.
    ///
    /// Returns `None` when the last byte would lie past `u64::MAX`.
    #[must_use]
    pub fn with_length(offset: u64, len: u64) -> Option<Self> {
        if len == 0 {
            return Some(Self::new(offset, None));
        }
        let end = offset.checked_add(len - 1)?;
        Some(Self::new(offset, Some(end)))
    }

    /// Whether this range covers the whole object, so no header is sent.
    #[must_use]
    pub fn is_whole(&self) -> bool {
        self.start == 0 && self.end.unwrap_or_default() == 0
    }

    /// `Range` header value, or `None` for a whole-object read.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.is_whole() {
            None
        } else {
            Some(format!("bytes={self}"))
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{end}", self.start),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// Error returned when parsing a [`ByteRange`] fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid byte range: {0}")]
pub struct ParseByteRangeError(String);

impl FromStr for ByteRange {
    type Err = ParseByteRangeError;

    /// Parse `start-end` or `start-`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseByteRangeError(s.to_owned());
        let (start, end) = s.split_once('-').ok_or_else(err)?;
        let start = start.trim().parse::<u64>().map_err(|_| err())?;
        let end = match end.trim() {
            "" => None,
            end => Some(end.parse::<u64>().map_err(|_| err())?),
        };
        Ok(Self { start, end })
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// Handle to one bucket.
#[derive(Debug, Clone)]
pub struct Bucket {
    client: Client,
    name: String,
}

impl Bucket {
    /// Create a handle without checking that the bucket exists.
    pub fn new(client: Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    /// Bucket name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client this handle sends through.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn request(&self, method: Method, key: &str) -> Request {
        Request::new(method, self.name.as_str(), format!("/{key}")).param("formatter", "json")
    }

    /// Fetch object metadata.
    pub async fn head(&self, key: &str) -> Result<ObjectMeta> {
        let response = self.client.execute(self.request(Method::HEAD, key)).await?;
        object_meta_from_headers(response.headers())
    }

    /// Read an object, optionally a byte range of it.
    pub async fn get(&self, key: &str, range: Option<ByteRange>) -> Result<ObjectStream> {
        let mut request = self.request(Method::GET, key);
        if let Some(value) = range.and_then(|r| r.header_value()) {
            request.headers.insert(RANGE, header_value(RANGE.as_str(), &value)?);
        }
        let (_, body) = self.client.execute(request).await?.into_parts();
        Ok(body)
    }

    /// Upload an object.
    ///
    /// The body passes through the digest pipeline first; its MD5 is sent as
    /// `Content-MD5` for the service to verify.
    pub async fn put<R>(&self, key: &str, metadata: &Metadata, body: R) -> Result<()>
    where
        R: Read + LengthAware + Send + 'static,
    {
        let mut request = with_metadata(self.request(Method::PUT, key), metadata)?;
        let body = self.digested_body(&mut request.headers, body).await?;

        debug!(bucket = %self.name, key, len = body.len(), "putting object");
        self.client.execute(request.body(body)).await?;
        Ok(())
    }

    /// Delete an object.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .execute(self.request(Method::DELETE, key))
            .await?;
        Ok(())
    }

    /// List objects. Empty `delimiter`, `prefix` and `marker` are omitted.
    pub async fn list(
        &self,
        delimiter: &str,
        prefix: &str,
        marker: &str,
        limit: u64,
    ) -> Result<ListObjects> {
        let mut request = self.request(Method::GET, "");
        for (key, value) in [("delimiter", delimiter), ("prefix", prefix), ("marker", marker)] {
            if !value.is_empty() {
                request.params.insert(key, value);
            }
        }
        request.params.insert("max-keys", limit.to_string());

        self.client.execute(request).await?.json().await
    }

    // -----------------------------------------------------------------------
    // Multipart
    // -----------------------------------------------------------------------

    /// Start a multipart upload and return a session tracking its parts.
    pub async fn start_multipart(&self, key: &str, metadata: &Metadata) -> Result<MultipartSession> {
        let upload = self.initiate_multipart_upload(key, metadata).await?;
        Ok(MultipartSession::new(self.clone(), key, upload.upload_id))
    }

    /// Declare a multipart upload.
    pub async fn initiate_multipart_upload(
        &self,
        key: &str,
        metadata: &Metadata,
    ) -> Result<MultipartUpload> {
        let request = with_metadata(self.request(Method::POST, key), metadata)?.param("multipart", "");
        let upload: MultipartUpload = self.client.execute(request).await?.json().await?;

        debug!(bucket = %self.name, key, upload_id = %upload.upload_id, "initiated multipart upload");
        Ok(upload)
    }

    /// Upload one part of a multipart upload.
    pub async fn upload_part<R>(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: R,
    ) -> Result<Part>
    where
        R: Read + LengthAware + Send + 'static,
    {
        let mut request = self
            .request(Method::PUT, key)
            .param("partNumber", part_number.to_string())
            .param("uploadId", upload_id);
        let body = self.digested_body(&mut request.headers, body).await?;
        let size = body.len();

        let response = self.client.execute(request.body(body)).await?;
        let etag = response
            .headers()
            .get(ETAG)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();

        debug!(key, upload_id, part_number, size, "uploaded part");
        Ok(Part {
            part_number,
            etag,
            size,
            last_modified: None,
        })
    }

    /// Finish a multipart upload with the given part list.
    ///
    /// Parts are sent in the order given; the service validates them.
    pub async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<()> {
        let body = serde_json::to_vec(parts)?;
        let request = self
            .request(Method::POST, key)
            .param("uploadId", upload_id)
            .body(body);
        self.client.execute(request).await?;

        debug!(key, upload_id, parts = parts.len(), "completed multipart upload");
        Ok(())
    }

    /// List the parts the service has recorded for an upload.
    pub async fn list_parts(&self, key: &str, upload_id: &str) -> Result<ListParts> {
        let request = self.request(Method::GET, key).param("uploadId", upload_id);
        self.client.execute(request).await?.json().await
    }

    /// Run `body` through the digest pipeline and set the length and
    /// `Content-MD5` headers.
    async fn digested_body<R>(&self, headers: &mut HeaderMap, body: R) -> Result<RequestBody>
    where
        R: Read + LengthAware + Send + 'static,
    {
        let digested = digest(body, DigestAlgorithm::Md5, self.client.spool_threshold()).await?;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(digested.len));
        headers.insert(CONTENT_MD5, header_value(CONTENT_MD5, &digested.digest)?);
        Ok(digested.body)
    }
}

fn with_metadata(mut request: Request, metadata: &Metadata) -> Result<Request> {
    for (name, value) in metadata {
        request = request.header(name, value)?;
    }
    Ok(request)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ScsError::InvalidHeader {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}

/// Collect object metadata from response headers.
///
/// # Errors
///
/// Returns [`ScsError::InvalidResponseHeader`] if neither `Content-Length`
/// nor `X-Filesize` holds a size.
pub fn object_meta_from_headers(headers: &HeaderMap) -> Result<ObjectMeta> {
    let text = |name: &str| {
        headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default()
    };

    let content_length = text(CONTENT_LENGTH.as_str())
        .parse::<u64>()
        .or_else(|_| text(X_FILESIZE).parse::<u64>())
        .map_err(|_| ScsError::InvalidResponseHeader {
            name: X_FILESIZE,
            value: text(X_FILESIZE),
        })?;

    let mut metadata = BTreeMap::new();
    for (name, value) in headers {
        if name.as_str().starts_with(X_AMZ_META_PREFIX) {
            metadata
                .entry(name.as_str().to_owned())
                .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
    }

    Ok(ObjectMeta {
        content_type: text(CONTENT_TYPE.as_str()),
        content_length,
        etag: text(ETAG.as_str()),
        last_modified: text(LAST_MODIFIED.as_str()),
        metadata,
    })
}
