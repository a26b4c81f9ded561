//! Request signing and verification.
//!
//! `Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))`, sent as
//! `Authorization: AWS <AccessKey>:<Signature>`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use http::Method;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};

use crate::canonical::{build_canonicalized_resource, build_string_to_sign};
use crate::credentials::{CredentialProvider, Credentials};
use crate::error::AuthError;

type HmacSha1 = Hmac<Sha1>;

/// Scheme token preceding the credentials in the `Authorization` header.
pub const AUTH_SCHEME: &str = "AWS";

/// Signs requests with a fixed key pair.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    /// Create a signer for the given key pair.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// The key pair this signer uses.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign a request, inserting (or replacing) its `Authorization` header.
    ///
    /// `sign_path` must already carry the bucket prefix and `headers` must
    /// already hold `Date`. No other header is touched. Signing never fails;
    /// a request signed over bad input is rejected by the service instead.
    pub fn sign<'a>(
        &self,
        method: &Method,
        sign_path: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
        headers: &mut HeaderMap,
    ) {
        let resource = build_canonicalized_resource(sign_path, params);
        let string_to_sign = build_string_to_sign(method, headers, &resource);

        trace!(string_to_sign = ?string_to_sign, "built string to sign");

        let signature = compute_signature(self.credentials.secret_key(), &string_to_sign);
        let authorization = format!(
            "{AUTH_SCHEME} {}:{signature}",
            self.credentials.access_key()
        );

        match HeaderValue::from_str(&authorization) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("access key contains characters not allowed in a header value"),
        }
    }
}

/// Verify a signed request against a credential store.
///
/// Returns the access key the request was signed with.
///
/// # Errors
///
/// Returns an [`AuthError`] if the header is malformed, the access key is not
/// found, or the signature does not match.
pub fn verify_request(
    parts: &http::request::Parts,
    credential_provider: &dyn CredentialProvider,
) -> Result<String, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (access_key, provided_signature) = parse_authorization(auth_header)?;

    debug!(access_key = %access_key, "verifying request signature");

    let secret_key = credential_provider.get_secret_key(&access_key)?;

    let query: Vec<(String, String)> = parts
        .uri
        .query()
        .map(form_pairs)
        .unwrap_or_default();
    let resource = build_canonicalized_resource(
        parts.uri.path(),
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    let string_to_sign = build_string_to_sign(&parts.method, &parts.headers, &resource);
    let expected_signature = compute_signature(&secret_key, &string_to_sign);

    if provided_signature
        .as_bytes()
        .ct_eq(expected_signature.as_bytes())
        .into()
    {
        Ok(access_key)
    } else {
        debug!(
            string_to_sign = ?string_to_sign,
            "signature mismatch"
        );
        Err(AuthError::SignatureDoesNotMatch)
    }
}

/// Parse an `Authorization` header: `AWS AccessKey:Signature`.
fn parse_authorization(header: &str) -> Result<(String, String), AuthError> {
    let rest = header
        .strip_prefix(AUTH_SCHEME)
        .and_then(|r| r.strip_prefix(' '))
        .ok_or(AuthError::InvalidAuthHeader)?;

    let (access_key, signature) = rest.split_once(':').ok_or(AuthError::InvalidAuthHeader)?;

    if access_key.is_empty() || signature.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok((access_key.to_owned(), signature.to_owned()))
}

/// Split a raw query string into decoded pairs; bare keys get empty values.
fn form_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| {
            let (k, v) = param.split_once('=').unwrap_or((param, ""));
            let decode = |s: &str| {
                percent_encoding::percent_decode_str(&s.replace('+', " "))
                    .decode_utf8_lossy()
                    .into_owned()
            };
            (decode(k), decode(v))
        })
        .collect()
}

/// Compute `Base64(HMAC-SHA1(secret, string_to_sign))`.
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    let result = mac.finalize().into_bytes();
    BASE64.encode(result)
}
