//! Request and response body types.
//!
//! [`RequestBody`] is what the transport sends: nothing, a buffer, or a file
//! spooled by the digest pipeline. A spooled body owns its temporary file and
//! deletes it when dropped, whether or not the request was ever sent.
//! [`ObjectStream`] is the raw body of a successful response.

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use http_body::{Body, Frame, SizeHint};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use serde::de::DeserializeOwned;
use tempfile::TempPath;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::error::Result;

/// Read size used when streaming a spooled file.
const SPOOL_CHUNK_SIZE: usize = 64 * 1024;

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Body held in memory.
    Buffered(Full<Bytes>),
    /// Body streamed from a temporary file.
    Spooled(SpooledBody),
}

impl RequestBody {
    /// Create a buffered body.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Exact body length.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Buffered(full) => full.size_hint().exact().unwrap_or_default(),
            Self::Spooled(spooled) => spooled.len,
        }
    }

    /// Whether the body has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the backing temporary file, for spooled bodies.
    #[must_use]
    pub fn spool_path(&self) -> Option<&Path> {
        match self {
            Self::Spooled(spooled) => Some(&spooled.path),
            _ => None,
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<String> for RequestBody {
    fn from(data: String) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&'static str> for RequestBody {
    fn from(data: &'static str) -> Self {
        Self::from_bytes(data)
    }
}

impl Body for RequestBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<std::result::Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Empty => Poll::Ready(None),
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Spooled(spooled) => Pin::new(&mut spooled.stream)
                .poll_next(cx)
                .map(|chunk| chunk.map(|res| res.map(Frame::data))),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Buffered(full) => full.is_end_stream(),
            Self::Spooled(spooled) => spooled.len == 0,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Empty => SizeHint::with_exact(0),
            Self::Buffered(full) => full.size_hint(),
            Self::Spooled(spooled) => SizeHint::with_exact(spooled.len),
        }
    }
}

/// A temporary file streamed as a request body.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct SpooledBody {
    stream: ReaderStream<tokio::fs::File>,
    len: u64,
    path: TempPath,
}

impl SpooledBody {
    /// Wrap a spooled file positioned at the start of its content.
    #[must_use]
    pub fn new(file: std::fs::File, path: TempPath, len: u64) -> Self {
        let file = tokio::fs::File::from_std(file);
        Self {
            stream: ReaderStream::with_capacity(file, SPOOL_CHUNK_SIZE),
            len,
            path,
        }
    }
}

/// Raw body of a successful response.
#[derive(Debug)]
pub struct ObjectStream {
    body: Incoming,
}

impl ObjectStream {
    pub(crate) fn new(body: Incoming) -> Self {
        Self { body }
    }

    /// Next chunk of data, or `None` at the end of the body.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        while let Some(frame) = self.body.frame().await {
            if let Ok(data) = frame?.into_data() {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.body.collect().await?.to_bytes())
    }

    /// Read the whole body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Stream the body into `writer`, returning the number of bytes written.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> io::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.chunk().await.map_err(io::Error::other)? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    /// The underlying hyper body.
    #[must_use]
    pub fn into_inner(self) -> Incoming {
        self.body
    }
}
