//! Tests for the reqwest-backed transport.

use std::sync::Arc;
use std::time::Duration;

use horizon_graphql_client::{
    GraphQLClient, ReqwestTransport, ReqwestTransportConfig, SharedTransport,
};

#[test]
fn test_transport_config_defaults() {
    let config = ReqwestTransportConfig::default();
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
    assert!(config.follow_redirects);
    assert_eq!(config.max_redirects, 10);
    assert!(config.user_agent.unwrap().starts_with("HorizonGraphQL/"));
    assert!(config.proxy.is_none());
}

#[test]
fn test_transport_rejects_bad_proxy() {
    let config = ReqwestTransportConfig {
        proxy: Some("not a proxy url".into()),
        ..Default::default()
    };
    assert!(ReqwestTransport::with_config(config).is_err());
}

#[test]
fn test_client_over_reqwest_transport() {
    let transport: SharedTransport = Arc::new(ReqwestTransport::new().unwrap());
    let client = GraphQLClient::builder("http://localhost:4000/graphql")
        .transport(transport)
        .build()
        .unwrap();
    assert_eq!(client.endpoint().as_str(), "http://localhost:4000/graphql");
}

// Note: We use wiremock for mocked HTTP tests
#[cfg(feature = "integration-tests")]
mod integration_tests {
    use super::*;
    use horizon_graphql_client::{
        CancellationToken, ClientError, GraphQLRequest, TransportError,
    };
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HERO: &str = "{ hero { name } }";

    #[derive(Deserialize)]
    struct Hero {
        name: String,
    }

    fn client_for(server: &MockServer) -> GraphQLClient {
        GraphQLClient::new(&format!("{}/graphql", server.uri())).expect("valid endpoint")
    }

    #[tokio::test]
    async fn test_post_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(body_json(json!({
                "query": "query HeroForEpisode($ep: Episode!) { hero(episode: $ep) { name } }",
                "operationName": "HeroForEpisode",
                "variables": {"ep": "JEDI"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"hero": {"name": "R2-D2"}}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = GraphQLRequest::new(
            "query HeroForEpisode($ep: Episode!) { hero(episode: $ep) { name } }",
        )
        .unwrap()
        .operation_name("HeroForEpisode")
        .variable("ep", "JEDI")
        .unwrap();

        let response = client_for(&mock_server)
            .send_post(&request)
            .await
            .expect("Request failed");
        let hero: Hero = response.data_field_as("hero").unwrap();
        assert_eq!(hero.name, "R2-D2");
    }

    #[tokio::test]
    async fn test_default_transport_uses_configured_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header_regex("user-agent", r"^HorizonGraphQL/\S+ \(Rust\)$"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"hero": {"name": "R2-D2"}}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server)
            .post_query(HERO)
            .await
            .expect("Request failed");
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_get_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/graphql"))
            .and(query_param("query", HERO))
            .and(query_param("operationName", "Hero"))
            .and(query_param("variables", r#"{"episode":"EMPIRE"}"#))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"hero": {"name": "Luke Skywalker"}}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = GraphQLRequest::new(HERO)
            .unwrap()
            .operation_name("Hero")
            .variable("episode", "EMPIRE")
            .unwrap();

        let response = client_for(&mock_server)
            .send_get(&request)
            .await
            .expect("Request failed");
        let hero: Hero = response.data_field_as("hero").unwrap();
        assert_eq!(hero.name, "Luke Skywalker");
    }

    #[tokio::test]
    async fn test_error_page_becomes_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(502)
                    .insert_header("x-upstream", "swapi")
                    .set_body_string("<html>Bad Gateway</html>"),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).post_query(HERO).await.unwrap_err();
        let ClientError::Http(http_error) = err else {
            panic!("expected HTTP error");
        };
        assert_eq!(http_error.status(), http::StatusCode::BAD_GATEWAY);
        assert_eq!(http_error.headers()["x-upstream"], "swapi");
        assert_eq!(http_error.body_text(), "<html>Bad Gateway</html>");
    }

    #[tokio::test]
    async fn test_graphql_errors_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errors": [{"message": "Unknown operation named \"Villain\"."}]
            })))
            .mount(&mock_server)
            .await;

        let response = client_for(&mock_server).get_query(HERO).await.unwrap();
        assert!(!response.is_success());
        assert_eq!(
            response.error_message().as_deref(),
            Some("Unknown operation named \"Villain\".")
        );
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::with_config(ReqwestTransportConfig {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        })
        .expect("Failed to build transport");
        let client = GraphQLClient::builder(format!("{}/graphql", mock_server.uri()))
            .transport(Arc::new(transport))
            .build()
            .unwrap();

        let err = client.post_query(HERO).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Timeout)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GraphQLClient::new(&format!("http://{addr}/graphql")).unwrap();
        let err = client.post_query(HERO).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Connect(_))));
    }

    #[tokio::test]
    async fn test_cancel_slow_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"hero": {"name": "R2-D2"}}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let token = CancellationToken::new();
        let started = std::time::Instant::now();

        let (result, ()) = tokio::join!(client.post_query_cancellable(HERO, &token), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
