//! Client error types.
//!
//! Every failure is returned to the caller as an [`ScsError`]; nothing is
//! retried. [`ScsError::kind`] classifies the variants into the five
//! [`ErrorKind`]s callers usually branch on.

use scs_model::ServiceError;

/// Coarse classification of an [`ScsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected locally before any network activity.
    Validation,
    /// The request could not be sent or the response could not be read.
    Transport,
    /// The service answered with a non-success status.
    Service,
    /// The upload body could not be read or spooled.
    Digest,
    /// A structured response could not be decoded.
    Decode,
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ScsError {
    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------
    /// Bucket names must not contain `/`, `:` or `@`.
    #[error("invalid bucket name: {name}")]
    InvalidBucketName {
        /// The rejected name.
        name: String,
    },

    /// The endpoint template does not resolve to a usable URI.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The endpoint after bucket substitution.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A caller-supplied header is not a legal HTTP header.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as supplied.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Unknown canned ACL.
    #[error("invalid acl: {0}")]
    InvalidAcl(String),

    /// No bucket with this name in the account's listing.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------
    /// The HTTP request could not be built.
    #[error("failed to build request: {0}")]
    Http(#[from] http::Error),

    /// The TLS backend could not be initialized.
    #[error("tls setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    /// Dial, timeout or connection failure.
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    /// Failure while reading a response body.
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    /// A non-success response without the headers an error record is built from.
    #[error("malformed error response: status {status} without {header}")]
    MalformedErrorResponse {
        /// Response status code.
        status: u16,
        /// The missing header.
        header: &'static str,
    },

    // -----------------------------------------------------------------------
    // Service
    // -----------------------------------------------------------------------
    /// The service rejected the request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    // -----------------------------------------------------------------------
    // Digest
    // -----------------------------------------------------------------------
    /// The body could not be read, spooled or rewound.
    #[error("digest error: {0}")]
    Digest(#[from] std::io::Error),

    /// The blocking digest task did not complete.
    #[error("digest task failed: {0}")]
    DigestTask(String),

    // -----------------------------------------------------------------------
    // Decode
    // -----------------------------------------------------------------------
    /// A JSON response body did not match the expected record.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A response header could not be interpreted.
    #[error("invalid response header {name}: {value}")]
    InvalidResponseHeader {
        /// Header name.
        name: &'static str,
        /// Raw value, lossily decoded.
        value: String,
    },
}

impl ScsError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBucketName { .. }
            | Self::InvalidEndpoint { .. }
            | Self::InvalidHeader { .. }
            | Self::InvalidAcl(_)
            | Self::BucketNotFound(_) => ErrorKind::Validation,
            Self::Http(_)
            | Self::Tls(_)
            | Self::Transport(_)
            | Self::Body(_)
            | Self::MalformedErrorResponse { .. } => ErrorKind::Transport,
            Self::Service(_) => ErrorKind::Service,
            Self::Digest(_) | Self::DigestTask(_) => ErrorKind::Digest,
            Self::Decode(_) | Self::InvalidResponseHeader { .. } => ErrorKind::Decode,
        }
    }

    /// The service error record, when the service rejected the request.
    #[must_use]
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience result alias.
pub type Result<T, E = ScsError> = std::result::Result<T, E>;
