//! Query parameters.
//!
//! The service distinguishes two classes of parameters. *Flag* parameters
//! (`acl`, `meta`, `multipart`, `relax`) are sent as a bare name with no
//! `=value`; every other parameter is a form-encoded `key=value` pair. The
//! serialized query lists the flags first, then the value pairs.

use std::collections::BTreeMap;

/// Parameter names sent without a value.
pub const FLAG_PARAMS: &[&str] = &["acl", "meta", "multipart", "relax"];

/// Whether `key` is a flag parameter.
#[must_use]
pub fn is_flag_param(key: &str) -> bool {
    FLAG_PARAMS.contains(&key)
}

/// Query parameters of a request.
///
/// Flags keep insertion order and appear once each. Value parameters are
/// kept sorted by key and a repeated key keeps only its last value.
///
/// # Examples
///
/// ```
/// use scs_client::QueryParams;
///
/// let mut params = QueryParams::new();
/// params.insert("formatter", "json");
/// params.insert("multipart", "");
/// params.insert("uploadId", "a b");
/// assert_eq!(params.encode(), "multipart&formatter=json&uploadId=a+b");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    flags: Vec<String>,
    values: BTreeMap<String, String>,
}

impl QueryParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, classifying it by name.
    ///
    /// The value of a flag parameter is ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if is_flag_param(&key) {
            if !self.flags.contains(&key) {
                self.flags.push(key);
            }
        } else {
            self.values.insert(key, value.into());
        }
    }

    /// Chaining form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Value of `key`; flags report an empty value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.flags.iter().any(|f| f == key) {
            return Some("");
        }
        self.values.get(key).map(String::as_str)
    }

    /// Whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.values.is_empty()
    }

    /// All parameters as `(key, value)` pairs, flags first with empty values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flags
            .iter()
            .map(|f| (f.as_str(), ""))
            .chain(self.values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Serialize to a raw query string (without the leading `?`).
    ///
    /// Either half is omitted when empty, so the result never starts or ends
    /// with `&`.
    #[must_use]
    pub fn encode(&self) -> String {
        let flags = self.flags.join("&");
        let values = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.values)
            .finish();

        match (flags.is_empty(), values.is_empty()) {
            (false, false) => format!("{flags}&{values}"),
            (true, _) => values,
            (false, true) => flags,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
