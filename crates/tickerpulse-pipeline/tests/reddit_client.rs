//! Integration tests for `RedditClient` using wiremock HTTP mocks.

use tickerpulse_core::RedditCredentials;
use tickerpulse_pipeline::{PostSource, RedditClient, SearchOptions, SourceError};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        user_agent: "tickerpulse-test/0.1".to_string(),
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .mount(server)
        .await;
}

async fn test_client(server: &MockServer, limit: u32) -> RedditClient {
    let mut options = SearchOptions::new("wallstreetbets");
    options.limit = limit;
    RedditClient::connect_with_base_urls(&credentials(), options, &server.uri(), &server.uri())
        .await
        .expect("token exchange should succeed")
}

fn listing(ids: &[&str], after: Option<&str>) -> serde_json::Value {
    let children: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": format!("GME post {id}"),
                    "selftext": "",
                    "author": "poster",
                    "score": 10,
                    "num_comments": 2,
                    "created_utc": 1_700_000_000.0
                }
            })
        })
        .collect();
    serde_json::json!({ "kind": "Listing", "data": { "after": after, "children": children } })
}

#[tokio::test]
async fn search_returns_posts_with_expected_query() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("q", "GME OR AMC"))
        .and(query_param("sort", "top"))
        .and(query_param("t", "month"))
        .and(query_param("limit", "100"))
        .and(query_param("restrict_sr", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["a1", "a2"], None)))
        .mount(&server)
        .await;

    let client = test_client(&server, 100).await;
    let posts = client.search("GME OR AMC").await.expect("search should succeed");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "a1");
    assert_eq!(posts[0].title, "GME post a1");
    assert_eq!(posts[0].permalink, "https://redd.it/a1");
    assert_eq!(posts[1].id, "a2");
}

#[tokio::test]
async fn search_follows_after_cursor_up_to_limit() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .and(query_param("after", "t3_page2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&["c", "d"], Some("t3_page3"))),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(&["a", "b"], Some("t3_page2"))),
        )
        .with_priority(5)
        .mount(&server)
        .await;

    let client = test_client(&server, 3).await;
    let posts = client.search("TSLA").await.expect("search should succeed");

    let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "42"))
        .mount(&server)
        .await;

    let client = test_client(&server, 100).await;
    let err = client.search("GME").await.unwrap_err();
    assert!(
        matches!(err, SourceError::RateLimited { retry_after_secs: Some(42) }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn server_error_maps_to_unexpected_status() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server, 100).await;
    let err = client.search("GME").await.unwrap_err();
    assert!(
        matches!(err, SourceError::UnexpectedStatus { status: 503, .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn malformed_listing_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/wallstreetbets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server, 100).await;
    let err = client.search("GME").await.unwrap_err();
    assert!(matches!(err, SourceError::Deserialize { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn rejected_credentials_fail_to_connect() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = RedditClient::connect_with_base_urls(
        &credentials(),
        SearchOptions::new("wallstreetbets"),
        &server.uri(),
        &server.uri(),
    )
    .await;
    assert!(matches!(result, Err(SourceError::Auth(_))));
}
