//! Transport backed by a `reqwest` client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;

use super::Transport;
use crate::error::TransportError;
use crate::targets;

/// Configuration for [`ReqwestTransport`].
#[derive(Clone, Debug)]
pub struct ReqwestTransportConfig {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: Some(format!(
                "HorizonGraphQL/{} (Rust)",
                env!("CARGO_PKG_VERSION")
            )),
            proxy: None,
        }
    }
}

/// The production transport: HTTP over a pooled `reqwest::Client`.
///
/// Connection pooling, TLS and redirects are handled by reqwest. Clones of
/// the underlying client share one pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new().unwrap_or_else(|err| {
            tracing::warn!(
                target: targets::TRANSPORT,
                error = %err,
                "Falling back to an unconfigured HTTP client"
            );
            Self::from_client(reqwest::Client::new())
        })
    }
}

impl ReqwestTransport {
    /// Create a transport with the default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(ReqwestTransportConfig::default())
    }

    /// Create a transport from explicit configuration.
    pub fn with_config(config: ReqwestTransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if config.follow_redirects {
            builder = builder.redirect(Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(Policy::none());
        }

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| TransportError::Other(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self::from_client(builder.build()?))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The underlying reqwest client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, TransportError> {
        let request = reqwest::Request::try_from(request)?;
        tracing::trace!(
            target: targets::TRANSPORT,
            method = %request.method(),
            url = %request.url(),
            "Dispatching HTTP request"
        );

        let response = self.client.execute(request).await?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReqwestTransportConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.follow_redirects);
        assert!(config.user_agent.unwrap().starts_with("HorizonGraphQL/"));
    }

    #[test]
    fn test_build_with_config() {
        let transport = ReqwestTransport::with_config(ReqwestTransportConfig {
            follow_redirects: false,
            user_agent: None,
            ..Default::default()
        });
        assert!(transport.is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_rejected() {
        let result = ReqwestTransport::with_config(ReqwestTransportConfig {
            proxy: Some("not a url".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(TransportError::Other(_))));
    }
}
