//! Client construction options.

use std::sync::Arc;

use horizon_graphql::JsonSettings;

use crate::transport::{ReqwestTransport, SharedTransport};

/// Media type used for POST bodies unless configured otherwise.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Everything a [`GraphQLClient`](crate::GraphQLClient) is built from.
///
/// `endpoint`, `json_settings`, `media_type` and `transport` are required;
/// construction fails with [`ClientError::InvalidArgument`] naming the first
/// one that is `None`. [`Default`] fills in everything except the endpoint.
///
/// [`ClientError::InvalidArgument`]: crate::ClientError::InvalidArgument
#[derive(Debug, Clone)]
pub struct GraphQLClientOptions {
    /// The endpoint URL.
    pub endpoint: Option<String>,
    /// Headers sent with every request.
    pub headers: http::HeaderMap,
    /// JSON codec settings.
    pub json_settings: Option<JsonSettings>,
    /// Content type of POST bodies.
    pub media_type: Option<String>,
    /// The transport requests are sent through.
    pub transport: Option<SharedTransport>,
}

impl Default for GraphQLClientOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            headers: http::HeaderMap::new(),
            json_settings: Some(JsonSettings::default()),
            media_type: Some(DEFAULT_MEDIA_TYPE.to_string()),
            transport: Some(Arc::new(ReqwestTransport::default())),
        }
    }
}

impl GraphQLClientOptions {
    /// Default options for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }
}
