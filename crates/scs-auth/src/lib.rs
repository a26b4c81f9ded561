//! Canonical request signing for the SCS object storage client.
//!
//! SCS authenticates callers with an HMAC-SHA1 signature over a canonical
//! string built from the request method, a fixed subset of headers, and the
//! signed resource path. The `Authorization` header has the format:
//!
//! ```text
//! AWS <AccessKey>:<Base64(HMAC-SHA1(SecretKey, StringToSign))>
//! ```
//!
//! This crate provides the signing side used by the client ([`Signer`]) and
//! the matching verification side ([`verify_request`]) used by test servers.
//!
//! # Usage
//!
//! ```rust
//! use http::{HeaderMap, HeaderValue, Method};
//! use scs_auth::{Credentials, Signer};
//!
//! let signer = Signer::new(Credentials::new("access", "secret"));
//! let mut headers = HeaderMap::new();
//! headers.insert("date", HeaderValue::from_static("Sat, 28 Feb 2026 12:00:00 GMT"));
//! signer.sign(&Method::GET, "/bucket/key.txt", std::iter::empty(), &mut headers);
//! assert!(headers.contains_key(http::header::AUTHORIZATION));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - String-to-sign construction and resource path encoding
//! - [`credentials`] - Key pair type and credential provider trait
//! - [`error`] - Verification error types
//! - [`signer`] - Signing and verification

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod signer;

pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use signer::{AUTH_SCHEME, Signer, verify_request};
