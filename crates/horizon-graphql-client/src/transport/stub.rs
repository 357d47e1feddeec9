//! Programmable in-memory transport.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use super::Transport;
use crate::error::TransportError;

type Handler =
    dyn Fn(&RecordedRequest) -> Result<http::Response<Bytes>, TransportError> + Send + Sync;

enum Mode {
    Respond(Box<Handler>),
    Pending,
}

/// A request as seen by a [`StubTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The HTTP method.
    pub method: http::Method,
    /// The full request URI, including the query string.
    pub uri: http::Uri,
    /// The request headers.
    pub headers: http::HeaderMap,
    /// The request body.
    pub body: Bytes,
}

impl RecordedRequest {
    /// Decode a query-string parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body as JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// A transport that answers from a closure instead of the network.
///
/// Every request is recorded before the handler runs, so tests can assert on
/// exactly what the client put on the wire.
///
/// # Example
///
/// ```
/// use horizon_graphql_client::{GraphQLClient, StubTransport};
/// use std::sync::Arc;
///
/// # tokio_test_block(async {
/// let stub = Arc::new(StubTransport::json(200, r#"{"data": {"hero": {"name": "R2-D2"}}}"#));
/// let client = GraphQLClient::builder("https://swapi.example/graphql")
///     .transport(stub.clone())
///     .build()?;
///
/// let response = client.post_query("{ hero { name } }").await?;
/// assert!(response.is_success());
/// assert_eq!(stub.requests().len(), 1);
/// # Ok::<(), horizon_graphql_client::ClientError>(())
/// # }).unwrap();
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct StubTransport {
    mode: Mode,
    requests: Mutex<Vec<RecordedRequest>>,
    closed: AtomicBool,
}

impl StubTransport {
    /// Create a stub that answers every request through `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Result<http::Response<Bytes>, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self::with_mode(Mode::Respond(Box::new(handler)))
    }

    /// Create a stub that answers every request with the same status and
    /// JSON body.
    pub fn json(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(json_response(status, body.clone())))
    }

    /// Create a stub whose requests never complete.
    ///
    /// Useful for exercising cancellation.
    pub fn pending() -> Self {
        Self::with_mode(Mode::Pending)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            requests: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Whether [`Transport::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Build a response with the given status and a JSON content type.
///
/// Unknown status codes become 500.
pub fn json_response(status: u16, body: impl Into<Bytes>) -> http::Response<Bytes> {
    let mut response = http::Response::new(body.into());
    *response.status_mut() =
        http::StatusCode::from_u16(status).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Other("stub transport is closed".into()));
        }

        let (parts, body) = request.into_parts();
        let recorded = RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        };
        self.requests.lock().push(recorded.clone());

        match &self.mode {
            Mode::Respond(handler) => handler(&recorded),
            Mode::Pending => std::future::pending().await,
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Respond(_) => "respond",
            Mode::Pending => "pending",
        };
        f.debug_struct("StubTransport")
            .field("mode", &mode)
            .field("requests", &self.requests.lock().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
