//! GraphQL over HTTP client for Horizon.
//!
//! This crate sends [`GraphQLRequest`]s to a GraphQL endpoint and parses the
//! replies into [`GraphQLResponse`]s:
//!
//! - **Verbs**: `send_get` places the request in the query string, `send_post`
//!   sends it as a JSON body. Both have `_cancellable` forms and
//!   query-string-only shorthands (`get_query`, `post_query`).
//! - **Cancellation**: a [`CancellationToken`] aborts the pending HTTP call
//!   and drops any partially read body.
//! - **Transport seam**: the network sits behind the [`Transport`] trait.
//!   [`ReqwestTransport`] is the default; [`StubTransport`] answers from a
//!   closure and records what was sent.
//!
//! # Example
//!
//! ```no_run
//! use horizon_graphql_client::{CancellationToken, GraphQLClient, GraphQLRequest};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Hero {
//!     name: String,
//!     appears_in: Vec<String>,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GraphQLClient::new("https://swapi.example/graphql")?;
//!
//! // Shorthand: GET with only a query string
//! let response = client.get_query("{ hero { name appearsIn } }").await?;
//! let hero: Hero = response.data_field_as("hero")?;
//!
//! // Full request over POST, cancellable from elsewhere
//! let token = CancellationToken::new();
//! let request = GraphQLRequest::new(
//!     "query HeroForEpisode($ep: Episode!) { hero(episode: $ep) { name appearsIn } }",
//! )?
//! .variable("ep", "JEDI")?;
//! let response = client.send_post_cancellable(&request, &token).await?;
//!
//! if response.has_errors() {
//!     eprintln!("partial result: {:?}", response.error_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! GraphQL errors reported by the endpoint are data on the response. A
//! [`ClientError`] means the call itself failed: bad arguments, a transport
//! failure, a non-JSON error page ([`ClientError::Http`]), a malformed body
//! on a success status ([`ClientError::Parse`]), cancellation, or use after
//! [`GraphQLClient::close`].

mod cancel;
mod client;
mod error;
mod options;
pub mod transport;

pub use cancel::CancellationToken;
pub use client::{GraphQLClient, GraphQLClientBuilder};
pub use error::{ClientError, GraphQLHttpError, Result, TransportError};
pub use options::{GraphQLClientOptions, DEFAULT_MEDIA_TYPE};
pub use transport::{
    json_response, RecordedRequest, ReqwestTransport, ReqwestTransportConfig, SharedTransport,
    StubTransport, Transport,
};

pub use horizon_graphql::{
    CamelCaseNaming, Document, DocumentKind, ExactNaming, GraphQLError, GraphQLLocation,
    GraphQLRequest, GraphQLResponse, JsonSettings, NamingPolicy, PathSegment,
};

/// Tracing target names used by this crate.
pub mod targets {
    /// Client dispatch, completion and lifecycle.
    pub const CLIENT: &str = "horizon_graphql_client::client";
    /// Transport-level request tracing.
    pub const TRANSPORT: &str = "horizon_graphql_client::transport";
}
