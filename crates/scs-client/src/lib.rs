//! Client for the SCS object storage service.
//!
//! The crate is layered the way a request flows:
//!
//! * [`Request`] describes an operation; [`Preparer`] addresses and signs it
//!   (see [`request`]).
//! * [`Client`] sends prepared requests over a pooled, timeout-guarded
//!   connection and turns error responses into [`ScsError::Service`].
//! * [`digest`](digest::digest) buffers or spools upload bodies while
//!   computing their `Content-MD5`.
//! * [`Bucket`], [`MultipartSession`] and [`Scs`] are the operation-level
//!   facades.
//!
//! # Examples
//!
//! ```no_run
//! use std::io::Cursor;
//!
//! use scs_client::{ByteRange, ClientConfig, Metadata, Scs};
//!
//! # async fn run() -> scs_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .access_key("SINA000000000000ACCESS".to_owned())
//!     .secret_key("secret".to_owned())
//!     .build();
//! let bucket = Scs::new(&config)?.bucket("photos");
//!
//! bucket.put("hello.txt", &Metadata::new(), Cursor::new(b"hello world".to_vec())).await?;
//! let head = bucket.get("hello.txt", Some(ByteRange::new(0, Some(4)))).await?.bytes().await?;
//! assert_eq!(&head[..], b"hello");
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod bucket;
pub mod config;
pub mod conn;
pub mod digest;
pub mod error;
pub mod multipart;
pub mod query;
pub mod request;
pub mod service;
pub mod transport;

pub use body::{ObjectStream, RequestBody};
pub use bucket::{Bucket, ByteRange, Metadata};
pub use config::{ClientConfig, HttpTimeouts};
pub use digest::{DigestAlgorithm, Digested, LengthAware, UnknownLength};
pub use error::{ErrorKind, Result, ScsError};
pub use multipart::MultipartSession;
pub use query::QueryParams;
pub use request::{PreparedRequest, Preparer, Request};
pub use scs_model::ServiceError;
pub use service::Scs;
pub use transport::{Client, Response};
