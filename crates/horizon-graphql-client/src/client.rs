//! GraphQL client implementation.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use parking_lot::RwLock;
use url::Url;

use horizon_graphql::{GraphQLRequest, GraphQLResponse, JsonSettings, NamingPolicy};

use crate::cancel::CancellationToken;
use crate::error::{ClientError, GraphQLHttpError, Result};
use crate::options::{GraphQLClientOptions, DEFAULT_MEDIA_TYPE};
use crate::targets;
use crate::transport::SharedTransport;

/// Builder for creating a GraphQL client.
pub struct GraphQLClientBuilder {
    endpoint: String,
    default_headers: Vec<(String, String)>,
    media_type: String,
    json_settings: JsonSettings,
    transport: Option<SharedTransport>,
}

impl GraphQLClientBuilder {
    /// Create a new builder with the specified GraphQL endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            default_headers: Vec::new(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            json_settings: JsonSettings::default(),
            transport: None,
        }
    }

    /// Add a default header to all requests.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add multiple headers.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Set bearer token authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        let value = format!("Bearer {}", token.into());
        self.header(AUTHORIZATION.as_str(), value)
    }

    /// Set the content type of POST bodies.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Replace the JSON codec settings.
    pub fn json_settings(mut self, settings: JsonSettings) -> Self {
        self.json_settings = settings;
        self
    }

    /// Replace only the naming policy of the JSON settings.
    pub fn naming(mut self, naming: impl NamingPolicy + 'static) -> Self {
        self.json_settings = self.json_settings.naming(naming);
        self
    }

    /// Send requests through `transport` instead of a default
    /// [`ReqwestTransport`](crate::ReqwestTransport).
    ///
    /// The transport may be shared with other clients. Dropping the client
    /// only closes it when no other handle to it remains, but an explicit
    /// [`GraphQLClient::close`] always closes it.
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the GraphQL client.
    pub fn build(self) -> Result<GraphQLClient> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.default_headers {
            let (name, value) = parse_header(&name, &value)?;
            headers.append(name, value);
        }

        let mut options = GraphQLClientOptions::new(self.endpoint);
        options.headers = headers;
        options.media_type = Some(self.media_type);
        options.json_settings = Some(self.json_settings);
        if let Some(transport) = self.transport {
            options.transport = Some(transport);
        }
        GraphQLClient::from_options(options)
    }
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Get,
    Post,
}

impl Verb {
    fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
        }
    }
}

struct ClientInner {
    endpoint: RwLock<Url>,
    default_headers: RwLock<HeaderMap>,
    media_type: HeaderValue,
    json_settings: JsonSettings,
    transport: RwLock<Option<SharedTransport>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        // Leave transports that are still shared with other owners open.
        if let Some(transport) = self.transport.get_mut().take() {
            if Arc::strong_count(&transport) == 1 {
                transport.close();
            }
        }
    }
}

/// A GraphQL client for queries and mutations over HTTP.
///
/// Cheap to clone; clones share configuration and the transport. Requests
/// are borrowed, never modified, and each call is independent of the
/// others, so one client can serve many tasks at once.
///
/// # Example
///
/// ```no_run
/// use horizon_graphql_client::{GraphQLClient, GraphQLRequest};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
/// }
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GraphQLClient::builder("https://swapi.example/graphql")
///     .bearer_auth("my-token")
///     .build()?;
///
/// let request = GraphQLRequest::new(
///     "query Person($personId: ID!) { person(personID: $personId) { name } }",
/// )?
/// .variable("personId", "1")?;
///
/// let response = client.send_post(&request).await?;
/// let person: Person = response.data_field_as("person")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GraphQLClient {
    inner: Arc<ClientInner>,
}

impl GraphQLClient {
    /// Create a client for `endpoint` with default options.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::from_options(GraphQLClientOptions::new(endpoint))
    }

    /// Create a new builder for configuring a GraphQL client.
    pub fn builder(endpoint: impl Into<String>) -> GraphQLClientBuilder {
        GraphQLClientBuilder::new(endpoint)
    }

    /// Create a client from `options`, with `endpoint` taking precedence
    /// over `options.endpoint`.
    pub fn with_options(endpoint: &str, mut options: GraphQLClientOptions) -> Result<Self> {
        options.endpoint = Some(endpoint.to_string());
        Self::from_options(options)
    }

    /// Create a client from `options`.
    ///
    /// Fails with [`ClientError::InvalidArgument`] naming the first missing or
    /// malformed option.
    pub fn from_options(options: GraphQLClientOptions) -> Result<Self> {
        let endpoint = options
            .endpoint
            .as_deref()
            .ok_or_else(|| ClientError::invalid_argument("endpoint", "is required"))
            .and_then(parse_endpoint)?;
        let json_settings = options
            .json_settings
            .ok_or_else(|| ClientError::invalid_argument("json_settings", "is required"))?;
        let media_type = options
            .media_type
            .ok_or_else(|| ClientError::invalid_argument("media_type", "is required"))
            .and_then(|m| parse_media_type(&m))?;
        let transport = options
            .transport
            .ok_or_else(|| ClientError::invalid_argument("transport", "is required"))?;

        tracing::debug!(
            target: targets::CLIENT,
            endpoint = %endpoint,
            transport = ?transport,
            "Created GraphQL client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                endpoint: RwLock::new(endpoint),
                default_headers: RwLock::new(options.headers),
                media_type,
                json_settings,
                transport: RwLock::new(Some(transport)),
            }),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> Url {
        self.inner.endpoint.read().clone()
    }

    /// Point the client at a different endpoint.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<()> {
        *self.inner.endpoint.write() = parse_endpoint(endpoint)?;
        Ok(())
    }

    /// A snapshot of the headers sent with every request.
    pub fn default_headers(&self) -> HeaderMap {
        self.inner.default_headers.read().clone()
    }

    /// Add or replace a header sent with every request.
    ///
    /// Returns the previous value, if any.
    pub fn insert_default_header(&self, name: &str, value: &str) -> Result<Option<HeaderValue>> {
        let (name, value) = parse_header(name, value)?;
        Ok(self.inner.default_headers.write().insert(name, value))
    }

    /// Stop sending a default header. Returns the removed value, if any.
    pub fn remove_default_header(&self, name: &str) -> Option<HeaderValue> {
        self.inner.default_headers.write().remove(name)
    }

    /// The content type of POST bodies.
    pub fn media_type(&self) -> &str {
        // Validated as visible ASCII at construction.
        self.inner.media_type.to_str().unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    /// The JSON codec settings.
    pub fn json_settings(&self) -> &JsonSettings {
        &self.inner.json_settings
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.transport.read().is_none()
    }

    /// Release the transport.
    ///
    /// Returns `true` the first time; later calls do nothing and return
    /// `false`. Every send after this fails with [`ClientError::Closed`].
    ///
    /// [`Transport::close`](crate::Transport::close) is called even when the
    /// transport is shared with another client.
    pub fn close(&self) -> bool {
        let transport = self.inner.transport.write().take();
        match transport {
            Some(transport) => {
                transport.close();
                tracing::debug!(target: targets::CLIENT, "Closed GraphQL client");
                true
            }
            None => false,
        }
    }

    /// Send `request` as an HTTP GET.
    ///
    /// `query`, `operationName` and `variables` are form-urlencoded into the
    /// query string of the endpoint; any query parameters already on the
    /// endpoint are kept.
    pub async fn send_get(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        self.execute(Verb::Get, request, None).await
    }

    /// Send `request` as an HTTP GET, abandoning it if `cancel` fires.
    pub async fn send_get_cancellable(
        &self,
        request: &GraphQLRequest,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        self.execute(Verb::Get, request, Some(cancel)).await
    }

    /// Send `request` as an HTTP POST with a JSON body.
    pub async fn send_post(&self, request: &GraphQLRequest) -> Result<GraphQLResponse> {
        self.execute(Verb::Post, request, None).await
    }

    /// Send `request` as an HTTP POST, abandoning it if `cancel` fires.
    pub async fn send_post_cancellable(
        &self,
        request: &GraphQLRequest,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        self.execute(Verb::Post, request, Some(cancel)).await
    }

    /// GET a query that has no variables or operation name.
    pub async fn get_query(&self, query: &str) -> Result<GraphQLResponse> {
        self.send_get(&GraphQLRequest::new(query)?).await
    }

    /// Cancellable form of [`get_query`](Self::get_query).
    pub async fn get_query_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        self.send_get_cancellable(&GraphQLRequest::new(query)?, cancel)
            .await
    }

    /// POST a query that has no variables or operation name.
    pub async fn post_query(&self, query: &str) -> Result<GraphQLResponse> {
        self.send_post(&GraphQLRequest::new(query)?).await
    }

    /// Cancellable form of [`post_query`](Self::post_query).
    pub async fn post_query_cancellable(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<GraphQLResponse> {
        self.send_post_cancellable(&GraphQLRequest::new(query)?, cancel)
            .await
    }

    async fn execute(
        &self,
        verb: Verb,
        request: &GraphQLRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQLResponse> {
        let http_request = self.build_http_request(verb, request)?;
        let transport = self
            .inner
            .transport
            .read()
            .clone()
            .ok_or(ClientError::Closed)?;

        tracing::debug!(
            target: targets::CLIENT,
            method = %http_request.method(),
            uri = %http_request.uri(),
            operation = request.operation_name_ref(),
            "Sending GraphQL request"
        );

        let response = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!(target: targets::CLIENT, "GraphQL request cancelled");
                        return Err(ClientError::Cancelled);
                    }
                    result = transport.send(http_request) => result?,
                }
            }
            None => transport.send(http_request).await?,
        };

        self.decode(response)
    }

    fn build_http_request(
        &self,
        verb: Verb,
        request: &GraphQLRequest,
    ) -> Result<http::Request<Bytes>> {
        let settings = &self.inner.json_settings;
        let mut url = self.inner.endpoint.read().clone();

        let body = match verb {
            Verb::Get => {
                let params = request.query_pairs(settings)?;
                url.query_pairs_mut()
                    .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
                Bytes::new()
            }
            Verb::Post => Bytes::from(request.encode_body(settings)?),
        };

        let mut headers = self.inner.default_headers.read().clone();
        headers
            .entry(ACCEPT)
            .or_insert_with(|| HeaderValue::from_static("application/json"));
        if let Verb::Post = verb {
            headers.insert(CONTENT_TYPE, self.inner.media_type.clone());
        }

        let uri = url
            .as_str()
            .parse::<http::Uri>()
            .map_err(|e| ClientError::invalid_argument("endpoint", e.to_string()))?;

        let mut http_request = http::Request::new(body);
        *http_request.method_mut() = verb.method();
        *http_request.uri_mut() = uri;
        *http_request.headers_mut() = headers;
        Ok(http_request)
    }

    fn decode(&self, response: http::Response<Bytes>) -> Result<GraphQLResponse> {
        let status = response.status();
        tracing::debug!(
            target: targets::CLIENT,
            status = status.as_u16(),
            bytes = response.body().len(),
            "Received GraphQL response"
        );

        let naming = self.inner.json_settings.naming_policy().clone();
        match GraphQLResponse::from_slice_with(response.body(), naming) {
            Ok(parsed) => Ok(parsed),
            Err(err) if !status.is_success() && (err.is_syntax() || err.is_eof()) => {
                tracing::warn!(
                    target: targets::CLIENT,
                    status = status.as_u16(),
                    error = %err,
                    "GraphQL endpoint returned a non-JSON error response"
                );
                Err(GraphQLHttpError::new(response, err).into())
            }
            Err(err) => Err(ClientError::Parse(err)),
        }
    }
}

impl std::fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("endpoint", &self.inner.endpoint.read().as_str())
            .field("media_type", &self.inner.media_type)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url =
        Url::parse(endpoint).map_err(|e| ClientError::invalid_argument("endpoint", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::invalid_argument(
            "endpoint",
            format!("unsupported scheme `{other}`"),
        )),
    }
}

fn parse_media_type(media_type: &str) -> Result<HeaderValue> {
    let trimmed = media_type.trim();
    if !trimmed.contains('/') {
        return Err(ClientError::invalid_argument(
            "media_type",
            format!("`{media_type}` is not a media type"),
        ));
    }
    HeaderValue::from_str(trimmed)
        .map_err(|e| ClientError::invalid_argument("media_type", e.to_string()))
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::invalid_argument("headers", format!("{name}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ClientError::invalid_argument("headers", format!("{name}: {e}")))?;
    Ok((name, value))
}
