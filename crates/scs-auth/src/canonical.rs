//! String-to-sign construction.
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! The resource is the signed path (`/bucket/key`, or the bare path when no
//! bucket is addressed) followed by any sub-resource query parameters, sorted
//! by name. The signed path is identical for path-style and virtual-host-style
//! addressing.

use std::collections::BTreeMap;

use http::header::{CONTENT_TYPE, DATE, HeaderMap};
use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters percent-encoded in resource paths. Unreserved characters and
/// `/` pass through unchanged.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Query parameters that take part in the canonicalized resource.
pub const SUB_RESOURCES: &[&str] = &[
    "acl",
    "cors",
    "delete",
    "lifecycle",
    "location",
    "logging",
    "meta",
    "multipart",
    "notification",
    "partNumber",
    "policy",
    "relax",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

/// Custom headers in this namespace are part of the string to sign.
pub const AMZ_HEADER_PREFIX: &str = "x-amz-";

/// Whether `key` is a sub-resource included in the canonicalized resource.
#[must_use]
pub fn is_sub_resource(key: &str) -> bool {
    SUB_RESOURCES.contains(&key)
}

/// Percent-encode a request path, preserving `/` separators.
///
/// # Examples
///
/// ```
/// use scs_auth::canonical::encode_path;
///
/// assert_eq!(encode_path("/dir/a b.txt"), "/dir/a%20b.txt");
/// assert_eq!(encode_path("/plain-key_1.bin"), "/plain-key_1.bin");
/// ```
#[must_use]
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Build the full string to sign.
///
/// When `x-amz-date` is present the `Date` line is left empty.
#[must_use]
pub fn build_string_to_sign(method: &Method, headers: &HeaderMap, resource: &str) -> String {
    let content_md5 = header_value(headers, "content-md5");
    let content_type = header_value(headers, CONTENT_TYPE.as_str());
    let date = if headers.contains_key("x-amz-date") {
        String::new()
    } else {
        header_value(headers, DATE.as_str())
    };
    let amz_headers = build_canonicalized_amz_headers(headers);

    format!("{method}\n{content_md5}\n{content_type}\n{date}\n{amz_headers}{resource}")
}

/// Build the CanonicalizedAmzHeaders string.
///
/// Every `x-amz-*` header is lowercased (the map already stores lowercase
/// names), values are trimmed, repeated headers are comma-joined, and entries
/// are sorted by name, each terminated by a newline.
#[must_use]
pub fn build_canonicalized_amz_headers(headers: &HeaderMap) -> String {
    let mut amz_headers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, value) in headers {
        let name_str = name.as_str();
        if name_str.starts_with(AMZ_HEADER_PREFIX) {
            let val = value.to_str().unwrap_or("").trim();
            amz_headers.entry(name_str).or_default().push(val);
        }
    }

    let mut result = String::new();
    for (name, values) in &amz_headers {
        result.push_str(name);
        result.push(':');
        result.push_str(&values.join(","));
        result.push('\n');
    }

    result
}

/// Build the CanonicalizedResource string from the signed path and the
/// request's query parameters.
///
/// Parameters that are not sub-resources are ignored. Empty values are
/// rendered as bare keys, so `multipart` and `multipart=` sign identically.
///
/// # Examples
///
/// ```
/// use scs_auth::canonical::build_canonicalized_resource;
///
/// let resource = build_canonicalized_resource(
///     "/bucket/key",
///     [("uploadId", "abc"), ("formatter", "json"), ("partNumber", "2")],
/// );
/// assert_eq!(resource, "/bucket/key?partNumber=2&uploadId=abc");
/// ```
#[must_use]
pub fn build_canonicalized_resource<'a>(
    sign_path: &str,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut sub_params: Vec<(&str, &str)> = params
        .into_iter()
        .filter(|(key, _)| is_sub_resource(key))
        .collect();

    if sub_params.is_empty() {
        return sign_path.to_owned();
    }

    sub_params.sort_by(|a, b| a.0.cmp(b.0));

    let params_str: Vec<String> = sub_params
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                (*k).to_owned()
            } else {
                format!("{k}={v}")
            }
        })
        .collect();
    format!("{sign_path}?{}", params_str.join("&"))
}

/// Extract a header value as a string, returning an empty string if missing.
fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_owned()
}
