//! Client configuration.
//!
//! Provides [`ClientConfig`] for constructing a [`Client`](crate::Client).
//! Values can be set through the builder, deserialized from JSON, or loaded
//! from environment variables with [`ClientConfig::from_env`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Bucket placeholder token in endpoint templates.
pub const BUCKET_PLACEHOLDER: &str = "$";

/// Default service endpoint (path-style).
pub const DEFAULT_ENDPOINT: &str = "https://sinacloud.net";

/// Bodies at or above this size (or of unknown size) are spooled to disk
/// while their digest is computed.
pub const DEFAULT_SPOOL_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Client configuration.
///
/// The `endpoint` is a URI template in which `$` is replaced by the bucket
/// name: `https://$.sinacloud.net` addresses buckets by host, while a
/// template without the placeholder addresses them by path.
///
/// # Examples
///
/// ```
/// use scs_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .access_key("SINA000000000000ACCESS".to_owned())
///     .secret_key("secret".to_owned())
///     .endpoint("https://$.sinacloud.net".to_owned())
///     .build();
/// assert_eq!(config.timeouts.connect_secs, 30);
/// assert_eq!(config.spool_threshold, 16 * 1024 * 1024);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Access key identifier.
    #[builder(default)]
    pub access_key: String,

    /// Secret key used to sign requests.
    #[builder(default)]
    pub secret_key: String,

    /// Endpoint template.
    #[builder(default = String::from(DEFAULT_ENDPOINT))]
    pub endpoint: String,

    /// Per-phase connection timeouts.
    #[builder(default)]
    pub timeouts: HttpTimeouts,

    /// Idle connections kept per host in the pool.
    #[builder(default = 100)]
    pub max_idle_conns_per_host: usize,

    /// Spool threshold in bytes for the upload digest pipeline.
    #[builder(default = DEFAULT_SPOOL_THRESHOLD)]
    pub spool_threshold: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            endpoint: String::from(DEFAULT_ENDPOINT),
            timeouts: HttpTimeouts::default(),
            max_idle_conns_per_host: 100,
            spool_threshold: DEFAULT_SPOOL_THRESHOLD,
            log_level: String::from("info"),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeouts", &self.timeouts)
            .field("max_idle_conns_per_host", &self.max_idle_conns_per_host)
            .field("spool_threshold", &self.spool_threshold)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SCS_ACCESS_KEY` | empty |
    /// | `SCS_SECRET_KEY` | empty |
    /// | `SCS_ENDPOINT` | `https://sinacloud.net` |
    /// | `SCS_CONNECT_TIMEOUT_SECS` | `30` |
    /// | `SCS_READ_WRITE_TIMEOUT_SECS` | `60` |
    /// | `SCS_HEADER_TIMEOUT_SECS` | `60` |
    /// | `SCS_LONG_TIMEOUT_SECS` | `300` |
    /// | `SCS_IDLE_CONN_TIMEOUT_SECS` | `50` |
    /// | `SCS_MAX_IDLE_CONNS_PER_HOST` | `100` |
    /// | `SCS_SPOOL_THRESHOLD` | `16777216` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Unparsable numeric values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SCS_ACCESS_KEY") {
            config.access_key = v;
        }
        if let Ok(v) = std::env::var("SCS_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Ok(v) = std::env::var("SCS_ENDPOINT") {
            config.endpoint = v;
        }
        set_from_env("SCS_CONNECT_TIMEOUT_SECS", &mut config.timeouts.connect_secs);
        set_from_env(
            "SCS_READ_WRITE_TIMEOUT_SECS",
            &mut config.timeouts.read_write_secs,
        );
        set_from_env("SCS_HEADER_TIMEOUT_SECS", &mut config.timeouts.header_secs);
        set_from_env("SCS_LONG_TIMEOUT_SECS", &mut config.timeouts.long_secs);
        set_from_env(
            "SCS_IDLE_CONN_TIMEOUT_SECS",
            &mut config.timeouts.idle_conn_secs,
        );
        set_from_env(
            "SCS_MAX_IDLE_CONNS_PER_HOST",
            &mut config.max_idle_conns_per_host,
        );
        set_from_env("SCS_SPOOL_THRESHOLD", &mut config.spool_threshold);
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

fn set_from_env<T: std::str::FromStr>(name: &str, target: &mut T) {
    if let Ok(v) = std::env::var(name) {
        if let Ok(n) = v.parse::<T>() {
            *target = n;
        }
    }
}

/// Connection timeouts, in seconds.
///
/// `read_write` bounds every read and write once a response is flowing,
/// `header` bounds the wait for response headers after the request is
/// written, and `long` bounds the first read on a fresh connection. A
/// successful I/O operation re-arms the deadline, so large transfers are
/// only cut off when a single operation stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpTimeouts {
    /// TCP dial timeout.
    pub connect_secs: u64,
    /// Per-operation read/write deadline.
    pub read_write_secs: u64,
    /// Deadline for response headers after a write.
    pub header_secs: u64,
    /// Deadline for the first read on a connection.
    pub long_secs: u64,
    /// How long an idle pooled connection is kept.
    pub idle_conn_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            read_write_secs: 60,
            header_secs: 60,
            long_secs: 300,
            idle_conn_secs: 50,
        }
    }
}

impl HttpTimeouts {
    /// TCP dial timeout.
    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Per-operation read/write deadline.
    #[must_use]
    pub fn read_write(&self) -> Duration {
        Duration::from_secs(self.read_write_secs)
    }

    /// Deadline for response headers after a write.
    #[must_use]
    pub fn header(&self) -> Duration {
        Duration::from_secs(self.header_secs)
    }

    /// Deadline for the first read on a connection.
    #[must_use]
    pub fn long(&self) -> Duration {
        Duration::from_secs(self.long_secs)
    }

    /// Idle pooled connection lifetime.
    #[must_use]
    pub fn idle_conn(&self) -> Duration {
        Duration::from_secs(self.idle_conn_secs)
    }
}
