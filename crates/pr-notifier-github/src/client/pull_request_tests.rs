//! Tests for pull request listing.

use super::*;
use crate::client::ClientConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    let config = ClientConfig::default().with_github_api_url(server.uri());
    GitHubClient::new("test-token", config).unwrap()
}

fn pull_request_json(number: u64, sha: &str) -> Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": format!("PR {}", number),
        "body": null,
        "state": "open",
        "user": { "login": "octocat", "id": 1 },
        "head": { "ref": format!("branch-{}", number), "sha": sha, "label": "octo:branch" },
        "base": { "ref": "main", "sha": "base" },
        "html_url": format!("https://github.com/octo/widgets/pull/{}", number)
    })
}

mod deserialization {
    use super::*;

    /// Verify the subset of fields the notifier needs is decoded.
    #[test]
    fn test_pull_request_fields() {
        let pr: PullRequest = serde_json::from_value(pull_request_json(7, "deadbeef")).unwrap();

        assert_eq!(pr.number, 7);
        assert_eq!(pr.title, "PR 7");
        assert!(pr.body.is_none());
        assert_eq!(pr.user.login, "octocat");
        assert_eq!(pr.head.sha, "deadbeef");
        assert_eq!(pr.head.branch_ref, "branch-7");
        assert_eq!(pr.html_url, "https://github.com/octo/widgets/pull/7");
    }
}

mod listing {
    use super::*;

    /// Verify open pull requests are requested with state and page size.
    #[tokio::test]
    async fn test_list_open_pull_requests_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls"))
            .and(query_param("state", "open"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                pull_request_json(2, "bbb"),
                pull_request_json(1, "aaa")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let prs = client
            .list_open_pull_requests("octo", "widgets")
            .await
            .unwrap();

        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].number, 2);
        assert_eq!(prs[1].head.sha, "aaa");
    }

    /// Verify `Link: rel="next"` is followed and pages are concatenated in order.
    #[tokio::test]
    async fn test_list_follows_next_link() {
        let server = MockServer::start().await;
        let next = format!(
            "{}/repos/octo/widgets/pulls?state=open&per_page=100&page=2",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([pull_request_json(1, "aaa")])),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str())
                    .set_body_json(json!([pull_request_json(2, "bbb")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let prs = client
            .list_open_pull_requests("octo", "widgets")
            .await
            .unwrap();

        let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    /// Verify pagination stops after ten pages even when GitHub offers more.
    #[tokio::test]
    async fn test_list_stops_at_page_limit() {
        let server = MockServer::start().await;
        let next = format!("{}/repos/octo/widgets/pulls?page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/pulls"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str())
                    .set_body_json(json!([pull_request_json(2, "bbb")])),
            )
            .expect(10)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let prs = client
            .list_open_pull_requests("octo", "widgets")
            .await
            .unwrap();

        assert_eq!(prs.len(), 10);
    }

    /// Verify a failing page fails the whole listing.
    #[tokio::test]
    async fn test_list_propagates_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let result = client.list_open_pull_requests("octo", "widgets").await;

        assert!(matches!(
            result,
            Err(ApiError::HttpError { status: 500, .. })
        ));
    }
}
