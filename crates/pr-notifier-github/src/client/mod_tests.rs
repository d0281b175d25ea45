//! Tests for the GitHub client core: configuration, URL building and error mapping.

use super::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    let config = ClientConfig::default().with_github_api_url(server.uri());
    GitHubClient::new("test-token", config).expect("client must build")
}

mod configuration {
    use super::*;

    /// Verify defaults match the legacy deployment (5 second timeout, public API).
    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert!(config.path_prefix.is_none());
        assert!(config.user_agent.starts_with("pr-notifier/"));
    }

    /// Verify the path prefix is joined to the host with exactly one slash.
    #[test]
    fn test_base_url_with_prefix() {
        let config = ClientConfig::default()
            .with_github_api_url("https://github.example.com/")
            .with_path_prefix("/api/v3/");

        assert_eq!(config.base_url(), "https://github.example.com/api/v3");
    }

    /// Verify a blank path prefix is treated as absent.
    #[test]
    fn test_blank_prefix_ignored() {
        let config = ClientConfig::default().with_path_prefix("  ");

        assert!(config.path_prefix.is_none());
        assert_eq!(config.base_url(), "https://api.github.com");
    }

    /// Verify an unparseable base URL is rejected at construction time.
    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ClientConfig::default().with_github_api_url("not a url");

        let result = GitHubClient::new("token", config);

        assert!(matches!(result, Err(ApiError::InvalidRequest { .. })));
    }

    /// Verify the token never appears in debug output.
    #[test]
    fn test_debug_redacts_token() {
        let client = GitHubClient::new("super-secret", ClientConfig::default()).unwrap();

        let rendered = format!("{:?}", client);

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<REDACTED>"));
    }
}

mod endpoints {
    use super::*;

    /// Verify segments are appended below the path prefix.
    #[test]
    fn test_endpoint_with_prefix() {
        let config = ClientConfig::default()
            .with_github_api_url("https://github.example.com")
            .with_path_prefix("/api/v3");
        let client = GitHubClient::new("token", config).unwrap();

        let url = client.endpoint(&["repos", "octo", "repo", "pulls"]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://github.example.com/api/v3/repos/octo/repo/pulls"
        );
    }

    /// Verify path segments are percent-encoded rather than split.
    #[test]
    fn test_endpoint_encodes_segments() {
        let client = GitHubClient::new("token", ClientConfig::default()).unwrap();

        let url = client
            .endpoint(&["repos", "octo", "repo", "commits", "feature/x", "status"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/repo/commits/feature%2Fx/status"
        );
    }
}

mod error_mapping {
    use super::*;

    /// Verify requests carry the bearer token and GitHub media type.
    #[tokio::test]
    async fn test_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint(&["ping"]).unwrap();

        let response = client.get(url).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Verify 401 maps to AuthenticationFailed.
    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
    }

    /// Verify 403 with an exhausted quota maps to RateLimitExceeded with the reset time.
    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        match result {
            Err(ApiError::RateLimitExceeded { reset_at }) => {
                assert_eq!(reset_at.timestamp(), 1_700_000_000);
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    /// Verify a plain 403 maps to AuthorizationFailed.
    #[tokio::test]
    async fn test_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "42"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        assert!(matches!(result, Err(ApiError::AuthorizationFailed)));
    }

    /// Verify 404 maps to NotFound.
    #[tokio::test]
    async fn test_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    /// Verify other failures keep the status code and response body.
    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        match result {
            Err(ApiError::HttpError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    /// Verify a slow response surfaces as Timeout.
    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_github_api_url(server.uri())
            .with_timeout(Duration::from_millis(50));
        let client = GitHubClient::new("token", config).unwrap();

        let result = client.get(client.endpoint(&["x"]).unwrap()).await;

        assert!(matches!(result, Err(ApiError::Timeout)));
    }
}
