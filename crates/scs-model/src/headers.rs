//! Header names used on the wire, in lowercase (the form `http::HeaderMap`
//! stores them in).

/// Request ID assigned by the service to every response.
pub const X_REQUEST_ID: &str = "x-requestid";

/// Service error code carried by non-success responses.
pub const X_ERROR_CODE: &str = "x-error-code";

/// Object size fallback when `Content-Length` is absent.
pub const X_FILESIZE: &str = "x-filesize";

/// Prefix of user-defined object metadata headers.
pub const X_AMZ_META_PREFIX: &str = "x-amz-meta-";

/// Canned ACL applied on bucket creation.
pub const X_AMZ_ACL: &str = "x-amz-acl";

/// Base64 MD5 of the request body.
pub const CONTENT_MD5: &str = "content-md5";
