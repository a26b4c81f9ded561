//! Account-level operations.

use http::Method;
use http::header::HeaderValue;
use scs_model::headers::X_AMZ_ACL;
use scs_model::{Acl, AclInfo, BucketInfo, BucketMeta, BucketList, CannedAcl};
use tracing::debug;

use crate::bucket::Bucket;
use crate::config::ClientConfig;
use crate::error::{Result, ScsError};
use crate::request::Request;
use crate::transport::Client;

/// Entry point for one account.
///
/// # Examples
///
/// ```no_run
/// use scs_client::{ClientConfig, Scs};
///
/// # async fn run() -> scs_client::Result<()> {
/// let scs = Scs::new(&ClientConfig::from_env())?;
/// for bucket in scs.list_buckets().await? {
///     println!("{}", bucket.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Scs {
    client: Client,
}

impl Scs {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_client(Client::new(config)?))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn request(method: Method, bucket: &str) -> Request {
        Request::new(method, bucket, "/").param("formatter", "json")
    }

    /// List the account's buckets.
    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let list: BucketList = self
            .client
            .execute(Self::request(Method::GET, ""))
            .await?
            .json()
            .await?;
        Ok(list.buckets)
    }

    /// Look a bucket up in the listing and return a handle to it.
    pub async fn get_bucket(&self, name: &str) -> Result<Bucket> {
        let buckets = self.list_buckets().await?;
        if buckets.iter().any(|b| b.name == name) {
            Ok(self.bucket(name))
        } else {
            Err(ScsError::BucketNotFound(name.to_owned()))
        }
    }

    /// Handle to a bucket, without checking that it exists.
    #[must_use]
    pub fn bucket(&self, name: &str) -> Bucket {
        Bucket::new(self.client.clone(), name)
    }

    /// Fetch bucket metadata.
    pub async fn get_bucket_meta(&self, name: &str) -> Result<BucketMeta> {
        let request = Self::request(Method::GET, name).param("meta", "");
        self.client.execute(request).await?.json().await
    }

    /// Create a bucket with a canned ACL.
    ///
    /// # Errors
    ///
    /// Returns [`ScsError::InvalidAcl`] without contacting the service if
    /// `acl` is not one of `private`, `public-read`, `public-read-write` or
    /// `authenticated-read`.
    pub async fn put_bucket(&self, name: &str, acl: &str) -> Result<()> {
        let acl = acl
            .parse::<CannedAcl>()
            .map_err(|e| ScsError::InvalidAcl(e.0))?;

        let mut request = Self::request(Method::PUT, name);
        request
            .headers
            .insert(X_AMZ_ACL, HeaderValue::from_static(acl.as_str()));
        self.client.execute(request).await?;

        debug!(bucket = name, acl = %acl, "created bucket");
        Ok(())
    }

    /// Delete an empty bucket.
    pub async fn delete_bucket(&self, name: &str) -> Result<()> {
        self.client
            .execute(Self::request(Method::DELETE, name))
            .await?;
        debug!(bucket = name, "deleted bucket");
        Ok(())
    }

    /// Fetch a bucket's ACL.
    pub async fn get_bucket_acl(&self, name: &str) -> Result<AclInfo> {
        let request = Self::request(Method::GET, name).param("acl", "");
        self.client.execute(request).await?.json().await
    }

    /// Replace a bucket's ACL.
    pub async fn put_bucket_acl(&self, name: &str, acl: &Acl) -> Result<()> {
        let body = serde_json::to_vec(acl)?;
        let request = Self::request(Method::PUT, name).param("acl", "").body(body);
        self.client.execute(request).await?;
        Ok(())
    }
}
