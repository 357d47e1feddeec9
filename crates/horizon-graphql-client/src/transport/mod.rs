//! The transport seam between the client and the network.
//!
//! A [`Transport`] takes a fully built `http::Request` and returns the
//! response with its body already read. The client never touches the network
//! directly, so a [`StubTransport`] can stand in for a real endpoint in tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

mod reqwest_transport;
mod stub;

pub use self::reqwest_transport::{ReqwestTransport, ReqwestTransportConfig};
pub use self::stub::{json_response, RecordedRequest, StubTransport};

/// Sends one HTTP request and returns the fully read response.
///
/// Implementations must be safe to call concurrently from many tasks.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send a request and read the whole response body.
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError>;

    /// Release any resources held by the transport.
    ///
    /// Called once by the owning client when it is closed.
    fn close(&self) {}
}

/// A shareable, type-erased transport.
pub type SharedTransport = Arc<dyn Transport>;
