//! GraphQL request/response model for Horizon.
//!
//! This crate holds everything about a GraphQL exchange that does not touch
//! the network:
//!
//! - [`GraphQLRequest`]: a validated query document with optional operation
//!   name, variables and extensions, encodable as a POST body or as GET
//!   query parameters.
//! - [`GraphQLResponse`]: the parsed `data`/`errors`/`extensions` envelope,
//!   with typed projection of fields into caller types.
//! - [`Document`]: the untyped, order-preserving JSON tree behind `data`.
//! - [`NamingPolicy`] and [`JsonSettings`]: how Rust field names map to
//!   wire keys, shared by encoding, parsing and projection.
//!
//! The HTTP client lives in `horizon-graphql-client`.
//!
//! # Example
//!
//! ```
//! use horizon_graphql::{GraphQLRequest, GraphQLResponse, JsonSettings};
//! use serde::Deserialize;
//!
//! let request = GraphQLRequest::new("query HeroName { hero { name friends { name } } }")?
//!     .operation_name("HeroName");
//! let body = request.encode_body(&JsonSettings::default())?;
//! assert!(!body.is_empty());
//!
//! #[derive(Deserialize)]
//! struct Friend { name: String }
//! #[derive(Deserialize)]
//! struct Hero { name: String, friends: Vec<Friend> }
//!
//! let response = GraphQLResponse::from_slice(br#"{
//!     "data": {"hero": {"name": "R2-D2", "friends": [{"name": "Luke Skywalker"}]}}
//! }"#)?;
//! let hero: Hero = response.data_field_as("hero")?;
//! assert_eq!(hero.name, "R2-D2");
//! assert_eq!(hero.friends[0].name, "Luke Skywalker");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;
mod error;
pub mod naming;
mod projection;
mod request;
mod response;
mod settings;

pub use document::{Document, DocumentKind, DocumentMap};
pub use error::{Error, Result};
pub use naming::{CamelCaseNaming, ExactNaming, NamingPolicy, SharedNaming};
pub use request::GraphQLRequest;
pub use response::{GraphQLError, GraphQLLocation, GraphQLResponse, PathSegment};
pub use settings::JsonSettings;

/// Tracing target names used by this crate.
pub mod targets {
    /// Response parsing and projection.
    pub const RESPONSE: &str = "horizon_graphql::response";
}
