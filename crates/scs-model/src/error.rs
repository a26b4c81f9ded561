//! Service error record.

use std::fmt;

/// A non-success response from the service.
///
/// Built only from response headers. `Display` renders the service error
/// code alone; mapping codes to prose is left to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status_code: u16,
    /// Value of `X-Requestid`.
    pub request_id: String,
    /// Value of `X-Error-Code`, or the status code when absent.
    pub error_code: String,
    /// Value of `Date`.
    pub date: String,
}

impl ServiceError {
    /// Whether the service reported the given error code.
    #[must_use]
    pub fn is(&self, code: &str) -> bool {
        self.error_code == code
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_code)
    }
}

impl std::error::Error for ServiceError {}
