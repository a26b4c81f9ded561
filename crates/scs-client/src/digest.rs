//! Streaming digest pipeline for upload bodies.
//!
//! [`digest`] reads an upload body once, computes its content digest, and
//! hands back a replayable [`RequestBody`] positioned at the start. Small
//! bodies are buffered in memory. Bodies at or above the spool threshold, and
//! bodies whose length is unknown, are spooled to a temporary file instead so
//! memory stays bounded; the file is deleted when the body is dropped.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Take};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use bytes::Bytes;
use md5::Digest;
use tracing::trace;

use crate::body::{RequestBody, SpooledBody};
use crate::error::{Result, ScsError};

/// File name prefix of spooled bodies.
pub const SPOOL_PREFIX: &str = "scs-temp-";

const READ_BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// DigestAlgorithm
// ---------------------------------------------------------------------------

/// Digest computed over an upload body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    /// MD5, base64-encoded, as sent in `Content-MD5`.
    #[default]
    Md5,
    /// CRC-32 (IEEE), upper-case hex without padding.
    Crc32,
}

impl DigestAlgorithm {
    /// Return the canonical name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Crc32 => "CRC32",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`DigestAlgorithm`] from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown digest algorithm: {0}")]
pub struct ParseDigestAlgorithmError(String);

impl FromStr for DigestAlgorithm {
    type Err = ParseDigestAlgorithmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "CRC32" => Ok(Self::Crc32),
            _ => Err(ParseDigestAlgorithmError(s.to_owned())),
        }
    }
}

#[derive(Debug)]
enum Hasher {
    Md5(md5::Md5),
    Crc32(crc32fast::Hasher),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => Self::Md5(md5::Md5::new()),
            DigestAlgorithm::Crc32 => Self::Crc32(crc32fast::Hasher::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Crc32(h) => h.update(data),
        }
    }

    fn finish(self) -> String {
        match self {
            Self::Md5(h) => BASE64_STANDARD.encode(h.finalize()),
            Self::Crc32(h) => format!("{:X}", h.finalize()),
        }
    }
}

/// Compute the digest of an in-memory buffer.
///
/// # Examples
///
/// ```
/// use scs_client::digest::{DigestAlgorithm, compute_digest};
///
/// assert_eq!(compute_digest(DigestAlgorithm::Md5, b"hello world"), "XrY7u+Ae7tCTyyK7j1rNww==");
/// assert_eq!(compute_digest(DigestAlgorithm::Crc32, b"hello world"), "D4A1185");
/// ```
#[must_use]
pub fn compute_digest(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// LengthAware
// ---------------------------------------------------------------------------

/// A body source that may know how many bytes it will yield.
///
/// `None` means the length is unknown; such sources always take the spool
/// path. Wrap a reader in [`UnknownLength`] to opt out of length detection.
pub trait LengthAware {
    /// Remaining length in bytes, if known.
    fn content_length(&self) -> Option<u64>;
}

impl<T: AsRef<[u8]>> LengthAware for Cursor<T> {
    fn content_length(&self) -> Option<u64> {
        let total = self.get_ref().as_ref().len() as u64;
        Some(total.saturating_sub(self.position()))
    }
}

impl LengthAware for &[u8] {
    fn content_length(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

impl LengthAware for File {
    fn content_length(&self) -> Option<u64> {
        let len = self.metadata().ok()?.len();
        let mut file: &File = self;
        let position = file.stream_position().ok()?;
        Some(len.saturating_sub(position))
    }
}

impl<R> LengthAware for Take<R> {
    fn content_length(&self) -> Option<u64> {
        Some(self.limit())
    }
}

impl<T: LengthAware + ?Sized> LengthAware for Box<T> {
    fn content_length(&self) -> Option<u64> {
        (**self).content_length()
    }
}

/// A reader whose length is not known up front.
#[derive(Debug)]
pub struct UnknownLength<R>(pub R);

impl<R: Read> Read for UnknownLength<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R> LengthAware for UnknownLength<R> {
    fn content_length(&self) -> Option<u64> {
        None
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A body that has been read once and is ready to send.
#[derive(Debug)]
pub struct Digested {
    /// Replayable body positioned at its first byte.
    pub body: RequestBody,
    /// Digest of the whole body.
    pub digest: String,
    /// Number of bytes actually read.
    pub len: u64,
}

impl Digested {
    /// Whether the body was spooled to disk.
    #[must_use]
    pub fn is_spooled(&self) -> bool {
        self.body.spool_path().is_some()
    }
}

/// Read `reader` to the end, computing its digest.
///
/// The blocking reads run on tokio's blocking pool.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use scs_client::digest::{DigestAlgorithm, digest};
///
/// # tokio_test::block_on(async {
/// let digested = digest(Cursor::new(b"hello world".to_vec()), DigestAlgorithm::Md5, 1024)
///     .await
///     .unwrap();
/// assert_eq!(digested.digest, "XrY7u+Ae7tCTyyK7j1rNww==");
/// assert!(!digested.is_spooled());
/// # });
/// ```
///
/// # Errors
///
/// Returns [`ScsError::Digest`] if the body cannot be read or the spool file
/// cannot be created, written or rewound.
pub async fn digest<R>(reader: R, algorithm: DigestAlgorithm, spool_threshold: u64) -> Result<Digested>
where
    R: Read + LengthAware + Send + 'static,
{
    tokio::task::spawn_blocking(move || digest_blocking(reader, algorithm, spool_threshold))
        .await
        .map_err(|e| ScsError::DigestTask(e.to_string()))?
        .map_err(ScsError::from)
}

/// Blocking form of [`digest`].
///
/// # Errors
///
/// Returns an I/O error if the body cannot be read or the spool file cannot
/// be created, written or rewound.
pub fn digest_blocking<R>(
    mut reader: R,
    algorithm: DigestAlgorithm,
    spool_threshold: u64,
) -> io::Result<Digested>
where
    R: Read + LengthAware,
{
    match reader.content_length() {
        Some(declared) if declared > 0 && declared < spool_threshold => {
            let mut buf = Vec::with_capacity(usize::try_from(declared).unwrap_or_default());
            reader.read_to_end(&mut buf)?;
            let digest = compute_digest(algorithm, &buf);
            let len = buf.len() as u64;

            trace!(len, algorithm = %algorithm, "digested body in memory");
            Ok(Digested {
                body: RequestBody::from_bytes(Bytes::from(buf)),
                digest,
                len,
            })
        }
        declared => {
            let mut spool = tempfile::Builder::new().prefix(SPOOL_PREFIX).tempfile()?;
            let file = spool.as_file_mut();
            let len = io::copy(&mut reader, file)?;

            file.seek(SeekFrom::Start(0))?;
            let digest = hash_reader(file, algorithm)?;
            file.seek(SeekFrom::Start(0))?;

            let (file, path) = spool.into_parts();
            trace!(
                path = %path.display(),
                declared = ?declared,
                len,
                algorithm = %algorithm,
                "spooled body to disk"
            );
            Ok(Digested {
                body: RequestBody::Spooled(SpooledBody::new(file, path, len)),
                digest,
                len,
            })
        }
    }
}

fn hash_reader(reader: &mut impl Read, algorithm: DigestAlgorithm) -> io::Result<String> {
    let mut hasher = Hasher::new(algorithm);
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}
