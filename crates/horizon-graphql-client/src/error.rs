//! Error types for the GraphQL client.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

/// Failures raised by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Request timed out.
    Timeout,
    /// Connection refused or failed.
    Connect(String),
    /// The request could not be built or sent.
    Request(String),
    /// The response body could not be read.
    Body(String),
    /// Any other transport failure.
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "Request timed out"),
            Self::Connect(msg) => write!(f, "Connection error: {msg}"),
            Self::Request(msg) => write!(f, "HTTP request error: {msg}"),
            Self::Body(msg) => write!(f, "Failed to read response body: {msg}"),
            Self::Other(msg) => write!(f, "Transport error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// The endpoint answered with a failure status and a body that is not JSON.
///
/// Carries the original HTTP response so callers can tell a transport-level
/// rejection (proxy error page, gateway timeout) apart from GraphQL errors
/// reported inside a well-formed response.
#[derive(Debug, thiserror::Error)]
#[error(
    "GraphQL endpoint returned HTTP {} {}",
    .response.status().as_u16(),
    .response.status().canonical_reason().unwrap_or("")
)]
pub struct GraphQLHttpError {
    response: http::Response<Bytes>,
    #[source]
    parse_error: serde_json::Error,
}

impl GraphQLHttpError {
    pub(crate) fn new(response: http::Response<Bytes>, parse_error: serde_json::Error) -> Self {
        Self {
            response,
            parse_error,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> http::StatusCode {
        self.response.status()
    }

    /// The canonical reason phrase for the status, if known.
    pub fn reason(&self) -> Option<&'static str> {
        self.response.status().canonical_reason()
    }

    /// The response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.response.headers()
    }

    /// The raw response body.
    pub fn body(&self) -> &Bytes {
        self.response.body()
    }

    /// The response body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.response.body())
    }

    /// The error the body produced when decoded as JSON.
    pub fn parse_error(&self) -> &serde_json::Error {
        &self.parse_error
    }

    /// The original HTTP response.
    pub fn response(&self) -> &http::Response<Bytes> {
        &self.response
    }

    /// Take the original HTTP response.
    pub fn into_response(self) -> http::Response<Bytes> {
        self.response
    }
}

/// Errors returned by [`GraphQLClient`](crate::GraphQLClient).
///
/// GraphQL-level errors are not represented here: they arrive as data on
/// [`GraphQLResponse`](horizon_graphql::GraphQLResponse).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required value was missing or malformed. Raised before any I/O.
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument or option.
        argument: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The request could not be encoded.
    #[error("Failed to encode request: {0}")]
    Request(#[source] horizon_graphql::Error),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-success status with a body that is not JSON.
    #[error(transparent)]
    Http(Box<GraphQLHttpError>),

    /// The body could not be decoded as a GraphQL response.
    ///
    /// The `serde_json` error is passed through unchanged.
    #[error(transparent)]
    Parse(serde_json::Error),

    /// The call was cancelled through its token.
    #[error("Request was cancelled")]
    Cancelled,

    /// The client has been closed.
    #[error("Client has been closed")]
    Closed,
}

impl ClientError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The HTTP status, when the endpoint answered with a non-JSON failure.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Http(err) => Some(err.status()),
            _ => None,
        }
    }
}

impl From<horizon_graphql::Error> for ClientError {
    fn from(err: horizon_graphql::Error) -> Self {
        match err {
            horizon_graphql::Error::InvalidArgument { argument, message } => {
                Self::InvalidArgument { argument, message }
            }
            other => Self::Request(other),
        }
    }
}

impl From<GraphQLHttpError> for ClientError {
    fn from(err: GraphQLHttpError) -> Self {
        Self::Http(Box::new(err))
    }
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
