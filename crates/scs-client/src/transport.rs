//! Transport executor.
//!
//! [`Client`] owns the connection pool and a [`Preparer`]. Each call to
//! [`Client::execute`] prepares one request, sends it once, and either
//! returns the response or converts a non-success status into a
//! [`ServiceError`]. Nothing is retried.

use std::time::Duration;

use http::header::{CONTENT_LENGTH, DATE, HeaderMap};
use http::StatusCode;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use native_tls::TlsConnector;
use scs_auth::{Credentials, Signer};
use scs_model::ServiceError;
use scs_model::headers::{X_ERROR_CODE, X_REQUEST_ID};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::body::{ObjectStream, RequestBody};
use crate::config::ClientConfig;
use crate::conn::TimeoutConnector;
use crate::error::{Result, ScsError};
use crate::request::{PreparedRequest, Preparer, Request};

const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

type Connector = TimeoutConnector<HttpsConnector<HttpConnector>>;

/// Client for one account and endpoint.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: HyperClient<Connector, RequestBody>,
    preparer: Preparer,
    spool_threshold: u64,
}

impl Client {
    /// Create a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ScsError::Tls`] if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let timeouts = config.timeouts;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(timeouts.connect()));
        http.set_keepalive(Some(TCP_KEEPALIVE));

        let tls = TlsConnector::new()?;
        let https = HttpsConnector::from((http, tls.into()));

        let http = HyperClient::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(timeouts.idle_conn())
            .pool_max_idle_per_host(config.max_idle_conns_per_host)
            .retry_canceled_requests(false)
            .build(TimeoutConnector::new(https, timeouts));

        let signer = Signer::new(Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
        ));

        debug!(endpoint = %config.endpoint, "created client");

        Ok(Self {
            http,
            preparer: Preparer::new(config.endpoint.clone(), signer),
            spool_threshold: config.spool_threshold,
        })
    }

    /// The preparer used to address and sign requests.
    #[must_use]
    pub fn preparer(&self) -> &Preparer {
        &self.preparer
    }

    /// Spool threshold for upload bodies.
    #[must_use]
    pub fn spool_threshold(&self) -> u64 {
        self.spool_threshold
    }

    /// Prepare and send a request.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the request cannot be prepared, a
    /// transport error if it cannot be sent, and [`ScsError::Service`] if the
    /// service answers with anything other than 200, 204 or 206.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let prepared = self.preparer.prepare(&request)?;
        self.send(prepared, request.body).await
    }

    /// Send an already prepared request with `body`.
    ///
    /// An explicit `Content-Length` header is removed; the length always
    /// comes from the body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn send(&self, prepared: PreparedRequest, body: RequestBody) -> Result<Response> {
        let uri = prepared.assemble()?;
        let (method, mut headers) = prepared.into_parts();

        if let Some(declared) = headers.remove(CONTENT_LENGTH) {
            let declared = declared.to_str().ok().and_then(|v| v.parse::<u64>().ok());
            if declared != Some(body.len()) {
                warn!(
                    declared = ?declared,
                    actual = body.len(),
                    "ignoring Content-Length that does not match the body"
                );
            }
        }

        debug!(method = %method, uri = %uri, len = body.len(), "sending request");

        let mut req = http::Request::new(body);
        *req.method_mut() = method;
        *req.uri_mut() = uri;
        *req.headers_mut() = headers;

        let resp = self.http.request(req).await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "received response");

        if !is_success(status) {
            return Err(build_error(status, resp.headers()));
        }

        let (parts, body) = resp.into_parts();
        Ok(Response {
            status,
            headers: parts.headers,
            body: ObjectStream::new(body),
        })
    }
}

/// A successful response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ObjectStream,
}

impl Response {
    /// Status code: 200, 204 or 206.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Split into headers and body.
    #[must_use]
    pub fn into_parts(self) -> (HeaderMap, ObjectStream) {
        (self.headers, self.body)
    }

    /// Read the body and decode it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.body.json().await
    }
}

fn is_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::PARTIAL_CONTENT
    )
}

/// Build the error for a non-success response from its headers.
///
/// The error code falls back to the numeric status. A response without
/// `X-Requestid` or `Date` yields [`ScsError::MalformedErrorResponse`].
fn build_error(status: StatusCode, headers: &HeaderMap) -> ScsError {
    let header = |name: &str| {
        headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    };

    let Some(request_id) = header(X_REQUEST_ID) else {
        return ScsError::MalformedErrorResponse {
            status: status.as_u16(),
            header: X_REQUEST_ID,
        };
    };
    let Some(date) = header(DATE.as_str()) else {
        return ScsError::MalformedErrorResponse {
            status: status.as_u16(),
            header: "date",
        };
    };
    let error_code = header(X_ERROR_CODE).unwrap_or_else(|| status.as_u16().to_string());

    debug!(
        status = status.as_u16(),
        request_id = %request_id,
        error_code = %error_code,
        "service returned an error"
    );

    ScsError::Service(ServiceError {
        status_code: status.as_u16(),
        request_id,
        error_code,
        date,
    })
}
