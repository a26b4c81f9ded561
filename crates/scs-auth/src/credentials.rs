//! Access key pairs and credential lookup.
//!
//! [`Credentials`] is the pair held by a client for signing. The
//! [`CredentialProvider`] trait resolves secret keys by access key and is used
//! on the verification side, e.g. by in-process test servers.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// An access key / secret key pair.
///
/// The secret key is redacted from the `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    /// Create a new key pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The access key identifier sent in the `Authorization` header.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret key used as the HMAC key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Trait for looking up secret keys by access key.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the secret key for the given access key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the access key is not recognized.
    fn get_secret_key(&self, access_key: &str) -> Result<String, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use scs_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![
///     ("SINA000000000000ACCESS".to_owned(), "secret".to_owned()),
/// ]);
///
/// let secret = provider.get_secret_key("SINA000000000000ACCESS").unwrap();
/// assert_eq!(secret, "secret");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, String>,
}

impl StaticCredentialProvider {
    /// Create a new provider from an iterable of (access_key, secret_key) pairs.
    pub fn new(credentials: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }
}

impl From<&Credentials> for StaticCredentialProvider {
    fn from(credentials: &Credentials) -> Self {
        Self::new([(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
        )])
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_secret_key(&self, access_key: &str) -> Result<String, AuthError> {
        self.credentials
            .get(access_key)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key.to_owned()))
    }
}
