//! Operation descriptors, preparation, and URL assembly.
//!
//! A [`Request`] describes one logical operation. [`Preparer::prepare`] turns
//! it into a [`PreparedRequest`]: the endpoint template is resolved, `Host`,
//! `Date` and `User-Agent` are set, and the headers are signed. Preparation
//! works on private copies of the caller's parameters and headers, so the
//! same `Request` can be prepared again for a retry without carrying over
//! anything from an earlier attempt.

use chrono::{DateTime, Utc};
use http::header::{DATE, HOST, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use http::uri::{Authority, Scheme};
use http::{Method, Uri};
use scs_auth::Signer;
use scs_auth::canonical::encode_path;
use tracing::debug;

use crate::body::RequestBody;
use crate::config::BUCKET_PLACEHOLDER;
use crate::error::{Result, ScsError};
use crate::query::QueryParams;

/// Client identifier sent as `User-Agent`.
pub const USER_AGENT_VALUE: &str = concat!("scs-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Characters that may not appear in a bucket name.
const BUCKET_FORBIDDEN: &[char] = &['/', ':', '@'];

/// `Date` header format (RFC 1123, always GMT).
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A logical operation against the service.
#[derive(Debug, Default)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Bucket name; empty for service-level operations.
    pub bucket: String,
    /// Object path; a leading `/` is added when missing.
    pub path: String,
    /// Query parameters.
    pub params: QueryParams,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl Request {
    /// Create a request with no parameters, headers or body.
    pub fn new(method: Method, bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            bucket: bucket.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Set a header from caller-supplied strings.
    ///
    /// # Errors
    ///
    /// Returns [`ScsError::InvalidHeader`] if the name or value is not legal
    /// in an HTTP header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ScsError::InvalidHeader {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ScsError::InvalidHeader {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Attach a body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }
}

/// A request that has been addressed and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    method: Method,
    bucket: String,
    path: String,
    sign_path: String,
    params: QueryParams,
    headers: HeaderMap,
    base_uri: Uri,
}

impl PreparedRequest {
    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Percent-encoded object path, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path covered by the signature: `/bucket/path`, or the path alone
    /// when no bucket is addressed.
    #[must_use]
    pub fn sign_path(&self) -> &str {
        &self.sign_path
    }

    /// Query parameters.
    #[must_use]
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Signed headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Endpoint after bucket substitution.
    #[must_use]
    pub fn base_uri(&self) -> &Uri {
        &self.base_uri
    }

    /// Assemble the full request URI.
    ///
    /// When the bucket name appears in the resolved host the deployment is
    /// virtual-host style and the path is sent as is; otherwise the bucket
    /// is prepended to the path.
    ///
    /// # Errors
    ///
    /// Returns [`ScsError::Http`] if the parts do not form a valid URI.
    pub fn assemble(&self) -> Result<Uri> {
        let authority = self
            .base_uri
            .authority()
            .map(Authority::as_str)
            .unwrap_or_default();

        let path = if authority.contains(self.bucket.as_str()) {
            self.path.clone()
        } else {
            format!("/{}{}", self.bucket, self.path)
        };

        let query = self.params.encode();
        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        };

        let uri = Uri::builder()
            .scheme(self.base_uri.scheme().cloned().unwrap_or(Scheme::HTTPS))
            .authority(authority)
            .path_and_query(path_and_query)
            .build()?;
        Ok(uri)
    }

    pub(crate) fn into_parts(self) -> (Method, HeaderMap) {
        (self.method, self.headers)
    }
}

/// Resolves endpoints and signs requests for one key pair.
#[derive(Debug, Clone)]
pub struct Preparer {
    endpoint: String,
    signer: Signer,
}

impl Preparer {
    /// Create a preparer for an endpoint template.
    pub fn new(endpoint: impl Into<String>, signer: Signer) -> Self {
        Self {
            endpoint: endpoint.into(),
            signer,
        }
    }

    /// The endpoint template.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Prepare a request, dated now.
    ///
    /// # Errors
    ///
    /// See [`prepare_at`](Self::prepare_at).
    pub fn prepare(&self, request: &Request) -> Result<PreparedRequest> {
        self.prepare_at(request, Utc::now())
    }

    /// Prepare a request with an explicit `Date`.
    ///
    /// The caller's request is not modified. Preparing the same request twice
    /// with the same `now` yields identical results.
    ///
    /// # Errors
    ///
    /// Returns [`ScsError::InvalidBucketName`] if the bucket contains `/`,
    /// `:` or `@`, and [`ScsError::InvalidEndpoint`] if the resolved endpoint
    /// is not an absolute URI.
    pub fn prepare_at(&self, request: &Request, now: DateTime<Utc>) -> Result<PreparedRequest> {
        let bucket = request.bucket.clone();
        if bucket.contains(BUCKET_FORBIDDEN) {
            return Err(ScsError::InvalidBucketName { name: bucket });
        }

        let path = if request.path.starts_with('/') {
            encode_path(&request.path)
        } else {
            encode_path(&format!("/{}", request.path))
        };
        let sign_path = if bucket.is_empty() {
            path.clone()
        } else {
            format!("/{bucket}{path}")
        };

        let base_uri = resolve_endpoint(&self.endpoint, &bucket)?;
        let host = base_uri
            .authority()
            .map(Authority::as_str)
            .unwrap_or_default();

        let mut headers = request.headers.clone();
        headers.insert(HOST, header_value(HOST.as_str(), host)?);
        headers.insert(
            DATE,
            header_value(DATE.as_str(), &now.format(DATE_FORMAT).to_string())?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let params = request.params.clone();
        self.signer
            .sign(&request.method, &sign_path, params.iter(), &mut headers);

        debug!(
            method = %request.method,
            bucket = %bucket,
            path = %path,
            "prepared request"
        );

        Ok(PreparedRequest {
            method: request.method.clone(),
            bucket,
            path,
            sign_path,
            params,
            headers,
            base_uri,
        })
    }
}

/// Substitute the bucket into the endpoint template and parse the result.
///
/// With an empty bucket the placeholder is dropped together with the `.`
/// that follows it, so `https://$.host` resolves to `https://host`.
fn resolve_endpoint(template: &str, bucket: &str) -> Result<Uri> {
    let resolved = if bucket.is_empty() {
        template
            .replace(&format!("{BUCKET_PLACEHOLDER}."), "")
            .replace(BUCKET_PLACEHOLDER, "")
    } else {
        template.replace(BUCKET_PLACEHOLDER, bucket)
    };

    let uri = resolved
        .parse::<Uri>()
        .map_err(|e| ScsError::InvalidEndpoint {
            endpoint: resolved.clone(),
            reason: e.to_string(),
        })?;

    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ScsError::InvalidEndpoint {
            endpoint: resolved,
            reason: "scheme and host are required".to_owned(),
        });
    }
    Ok(uri)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ScsError::InvalidHeader {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}
