//! Access control records and canned ACLs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grantee to permission-list mapping, e.g. `{"GRPS000000ANONYMOUSE": ["read"]}`.
pub type Acl = BTreeMap<String, Vec<String>>;

/// ACL of a bucket or object, as returned by `GET ?acl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclInfo {
    /// Owner user id.
    #[serde(rename = "Owner", default)]
    pub owner: String,
    /// Grants.
    #[serde(rename = "ACL", default)]
    pub acl: Acl,
}

// ---------------------------------------------------------------------------
// CannedAcl
// ---------------------------------------------------------------------------

/// Predefined ACLs accepted by `x-amz-acl` on bucket creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CannedAcl {
    /// Owner-only access.
    #[default]
    Private,
    /// Anyone may read.
    PublicRead,
    /// Anyone may read and write.
    PublicReadWrite,
    /// Authenticated users may read.
    AuthenticatedRead,
}

impl CannedAcl {
    /// All canned ACLs.
    pub const ALL: [Self; 4] = [
        Self::Private,
        Self::PublicRead,
        Self::PublicReadWrite,
        Self::AuthenticatedRead,
    ];

    /// Wire value of this ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CannedAcl`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown canned acl: {0}")]
pub struct ParseCannedAclError(pub String);

impl FromStr for CannedAcl {
    type Err = ParseCannedAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|acl| acl.as_str() == s)
            .ok_or_else(|| ParseCannedAclError(s.to_owned()))
    }
}
