//! Connections with per-operation I/O deadlines.
//!
//! [`TimeoutConnector`] wraps the HTTPS connector and hands out
//! [`TimeoutStream`]s. Every read and write on such a stream must make
//! progress within its own budget; the budget restarts after each completed
//! operation, so long transfers are fine as long as no single operation
//! stalls:
//!
//! * the first read on a fresh connection may wait up to `long`;
//! * after a write, the next read (the response headers) may wait up to
//!   `header`;
//! * once the response is flowing, every read and write gets `read_write`.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use http::Uri;
use hyper::rt::{Read, ReadBufCursor, Write};
use hyper_util::client::legacy::connect::{Connected, Connection};
use tokio::time::{Instant, Sleep};
use tower::Service;
use tracing::debug;

use crate::config::HttpTimeouts;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Connector wrapper applying [`HttpTimeouts`] to every connection.
#[derive(Debug, Clone)]
pub struct TimeoutConnector<C> {
    inner: C,
    timeouts: HttpTimeouts,
}

impl<C> TimeoutConnector<C> {
    /// Wrap `inner`.
    pub fn new(inner: C, timeouts: HttpTimeouts) -> Self {
        Self { inner, timeouts }
    }
}

impl<C> Service<Uri> for TimeoutConnector<C>
where
    C: Service<Uri>,
    C::Response: Read + Write + Connection + Unpin + Send + 'static,
    C::Error: Into<BoxError>,
    C::Future: Send + 'static,
{
    type Response = TimeoutStream<C::Response>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let timeouts = self.timeouts;
        let connecting = self.inner.call(uri);
        Box::pin(async move {
            let io = connecting.await.map_err(Into::into)?;
            Ok(TimeoutStream::new(io, &timeouts))
        })
    }
}

/// A stream whose reads and writes fail with [`io::ErrorKind::TimedOut`]
/// when they stall longer than their budget.
#[derive(Debug)]
pub struct TimeoutStream<S> {
    inner: S,
    read_write: Duration,
    header: Duration,
    read_budget: Duration,
    read_deadline: Option<Pin<Box<Sleep>>>,
    write_deadline: Option<Pin<Box<Sleep>>>,
}

impl<S> TimeoutStream<S> {
    /// Wrap a freshly connected stream.
    pub fn new(inner: S, timeouts: &HttpTimeouts) -> Self {
        Self {
            inner,
            read_write: timeouts.read_write(),
            header: timeouts.header(),
            read_budget: timeouts.long(),
            read_deadline: None,
            write_deadline: None,
        }
    }

    /// The wrapped stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

/// Arm `slot` if needed and report whether its deadline has passed.
fn poll_deadline(
    slot: &mut Option<Pin<Box<Sleep>>>,
    budget: Duration,
    cx: &mut Context<'_>,
) -> bool {
    let sleep = slot.get_or_insert_with(|| Box::pin(tokio::time::sleep_until(Instant::now() + budget)));
    sleep.as_mut().poll(cx).is_ready()
}

fn timed_out(op: &str, budget: Duration) -> io::Error {
    debug!(op, budget = ?budget, "connection operation timed out");
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{op} timed out after {budget:?}"),
    )
}

impl<S> Read for TimeoutStream<S>
where
    S: Read + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(res) => {
                this.read_deadline = None;
                this.read_budget = this.read_write;
                Poll::Ready(res)
            }
            Poll::Pending => {
                if poll_deadline(&mut this.read_deadline, this.read_budget, cx) {
                    this.read_deadline = None;
                    Poll::Ready(Err(timed_out("read", this.read_budget)))
                } else {
                    Poll::Pending
                }
            }
        }
    }
}

impl<S> TimeoutStream<S> {
    /// A read may already be parked with its deadline armed (hyper polls the
    /// read side before writing), so the deadline is reset in place to keep
    /// its registered waker.
    fn on_write_progress(&mut self) {
        self.write_deadline = None;
        self.read_budget = self.header;
        if let Some(sleep) = self.read_deadline.as_mut() {
            sleep.as_mut().reset(Instant::now() + self.header);
        }
    }
}

impl<S> Write for TimeoutStream<S>
where
    S: Write + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(res) => {
                this.on_write_progress();
                Poll::Ready(res)
            }
            Poll::Pending => {
                if poll_deadline(&mut this.write_deadline, this.read_write, cx) {
                    this.write_deadline = None;
                    Poll::Ready(Err(timed_out("write", this.read_write)))
                } else {
                    Poll::Pending
                }
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_write_vectored(cx, bufs) {
            Poll::Ready(res) => {
                this.on_write_progress();
                Poll::Ready(res)
            }
            Poll::Pending => {
                if poll_deadline(&mut this.write_deadline, this.read_write, cx) {
                    this.write_deadline = None;
                    Poll::Ready(Err(timed_out("write", this.read_write)))
                } else {
                    Poll::Pending
                }
            }
        }
    }
}

impl<S: Connection> Connection for TimeoutStream<S> {
    fn connected(&self) -> Connected {
        self.inner.connected()
    }
}
